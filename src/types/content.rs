use serde::{Deserialize, Serialize};

/// A curated literary item owned by the document store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentDocument {
    pub id: String,
    pub title: String,
    pub author: String,
    pub body: String,
    pub published: bool,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Optional narrowing applied on top of `published = true`.
///
/// Also serves as the result-cache key, so two equal filters always hit the
/// same cache entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ContentFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
}

impl ContentFilter {
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            tag: None,
        }
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            category: None,
            tag: Some(tag.into()),
        }
    }

    /// Trims and lowercases both fields, dropping empty ones.
    pub fn normalized(&self) -> Self {
        fn norm(v: &Option<String>) -> Option<String> {
            v.as_deref()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
        }
        Self {
            category: norm(&self.category),
            tag: norm(&self.tag),
        }
    }
}
