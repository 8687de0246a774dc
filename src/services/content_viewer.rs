//! Content viewer: published documents from the document store, through a
//! result cache, with uniform random selection.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::managers::document_store::DocumentStore;
use crate::services::content_cache::QueryCache;
use crate::types::content::{ContentDocument, ContentFilter};
use crate::types::errors::ContentError;

/// Trait defining the viewer interface.
pub trait ContentViewerTrait {
    fn fetch_published(
        &self,
        filter: Option<&ContentFilter>,
    ) -> Result<Arc<Vec<ContentDocument>>, ContentError>;
    fn fetch_random(&self) -> Result<Option<ContentDocument>, ContentError>;
}

pub struct ContentViewer<S: DocumentStore> {
    store: S,
    cache: QueryCache,
}

impl<S: DocumentStore> ContentViewer<S> {
    pub fn new(store: S, cache: QueryCache) -> Self {
        Self { store, cache }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Picks one eligible document uniformly with the caller's RNG.
    ///
    /// `Ok(None)` means nothing is published (for this filter); it is not an error.
    pub fn fetch_random_with<R: Rng + ?Sized>(
        &self,
        filter: Option<&ContentFilter>,
        rng: &mut R,
    ) -> Result<Option<ContentDocument>, ContentError> {
        let documents = self.fetch_published(filter)?;
        Ok(documents.choose(rng).cloned())
    }
}

impl<S: DocumentStore> ContentViewerTrait for ContentViewer<S> {
    fn fetch_published(
        &self,
        filter: Option<&ContentFilter>,
    ) -> Result<Arc<Vec<ContentDocument>>, ContentError> {
        let key = filter.map(ContentFilter::normalized).unwrap_or_default();
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let mut documents = self.store.find_published(&key).inspect_err(|e| {
            warn!(error = %e, "content query failed");
        })?;
        documents.retain(|d| d.published);
        debug!(?key, count = documents.len(), "content fetched from store");

        let documents = Arc::new(documents);
        self.cache.insert(key, Arc::clone(&documents));
        Ok(documents)
    }

    fn fetch_random(&self) -> Result<Option<ContentDocument>, ContentError> {
        self.fetch_random_with(None, &mut rand::thread_rng())
    }
}
