//! Explicit caches for the content viewer.
//!
//! [`ConnectionCache`] opens the document store once and hands out the same
//! handle afterwards. [`QueryCache`] keeps published-document query results
//! for a bounded time, keyed by the filter that produced them. Both are
//! owned by whoever constructs the viewer; nothing here is process-global.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use once_cell::unsync::OnceCell;
use tracing::{debug, info};

use crate::database::Database;
use crate::types::content::{ContentDocument, ContentFilter};
use crate::types::errors::ContentError;

/// Where the document store lives.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreTarget {
    File(PathBuf),
    InMemory,
}

/// Lazily opened, reused store connection.
pub struct ConnectionCache {
    target: StoreTarget,
    handle: OnceCell<Database>,
}

impl ConnectionCache {
    pub fn new(target: StoreTarget) -> Self {
        Self {
            target,
            handle: OnceCell::new(),
        }
    }

    pub fn target(&self) -> &StoreTarget {
        &self.target
    }

    pub fn is_connected(&self) -> bool {
        self.handle.get().is_some()
    }

    /// Returns the cached connection, opening it on first use.
    ///
    /// File stores are opened read-only and never migrated. A failed open is
    /// not cached, so the next call tries again.
    pub fn get(&self) -> Result<&Database, ContentError> {
        self.handle.get_or_try_init(|| {
            let db = match &self.target {
                StoreTarget::File(path) => Database::open_read_only(path),
                StoreTarget::InMemory => Database::open_in_memory(),
            }
            .map_err(|e| ContentError::ExternalStore(e.to_string()))?;
            info!(target = ?self.target, "document store connected");
            Ok(db)
        })
    }
}

/// Published-document results keyed by filter, expiring after a fixed TTL.
pub struct QueryCache {
    inner: Cache<ContentFilter, Arc<Vec<ContentDocument>>>,
    ttl: Duration,
}

impl QueryCache {
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self { inner, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &ContentFilter) -> Option<Arc<Vec<ContentDocument>>> {
        let hit = self.inner.get(key);
        debug!(?key, hit = hit.is_some(), "query cache lookup");
        hit
    }

    pub fn insert(&self, key: ContentFilter, documents: Arc<Vec<ContentDocument>>) {
        self.inner.insert(key, documents);
    }
}
