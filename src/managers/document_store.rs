//! Read-only access to the content document store.
//!
//! Implements `DocumentStore` over the `content_documents` SQLite table,
//! reaching the database through a [`ConnectionCache`].

use rusqlite::Row;

use crate::services::content_cache::ConnectionCache;
use crate::types::content::{ContentDocument, ContentFilter};
use crate::types::errors::ContentError;

/// Query interface the content viewer depends on.
pub trait DocumentStore {
    /// Returns every published document matching `filter`, in insertion order.
    fn find_published(&self, filter: &ContentFilter) -> Result<Vec<ContentDocument>, ContentError>;
}

/// Document store backed by SQLite.
pub struct SqliteDocumentStore {
    connection: ConnectionCache,
}

impl SqliteDocumentStore {
    pub fn new(connection: ConnectionCache) -> Self {
        Self { connection }
    }

    pub fn connection_cache(&self) -> &ConnectionCache {
        &self.connection
    }

    fn row_to_document(row: &Row) -> rusqlite::Result<(ContentDocument, String)> {
        Ok((
            ContentDocument {
                id: row.get(0)?,
                title: row.get(1)?,
                author: row.get(2)?,
                body: row.get(3)?,
                published: row.get(4)?,
                category: row.get(5)?,
                tags: Vec::new(),
            },
            row.get(6)?,
        ))
    }
}

/// Case-insensitive match of a document against a normalized filter.
pub fn matches_filter(doc: &ContentDocument, filter: &ContentFilter) -> bool {
    let category_ok = match &filter.category {
        Some(wanted) => doc
            .category
            .as_deref()
            .is_some_and(|c| c.trim().to_lowercase() == *wanted),
        None => true,
    };
    let tag_ok = match &filter.tag {
        Some(wanted) => doc.tags.iter().any(|t| t.trim().to_lowercase() == *wanted),
        None => true,
    };
    category_ok && tag_ok
}

impl DocumentStore for SqliteDocumentStore {
    fn find_published(&self, filter: &ContentFilter) -> Result<Vec<ContentDocument>, ContentError> {
        let filter = filter.normalized();
        let db = self.connection.get()?;
        let mut stmt = db
            .connection()
            .prepare(
                "SELECT id, title, author, body, published, category, tags
                 FROM content_documents
                 WHERE published = 1
                 ORDER BY created_at, id",
            )
            .map_err(|e| ContentError::Query(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_document)
            .map_err(|e| ContentError::Query(e.to_string()))?;

        let mut documents = Vec::new();
        for row in rows {
            let (mut doc, tags) = row.map_err(|e| ContentError::Query(e.to_string()))?;
            doc.tags = serde_json::from_str(&tags).map_err(|e| {
                ContentError::Query(format!("malformed tags for document {}: {}", doc.id, e))
            })?;
            if matches_filter(&doc, &filter) {
                documents.push(doc);
            }
        }
        Ok(documents)
    }
}
