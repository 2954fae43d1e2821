use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A backend document snapshot.
///
/// Only `id` and `url` are interpreted; every other field the backend sends is
/// kept verbatim in `extra` so it can be displayed or round-tripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    pub fn new(id: i64, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            extra: Map::new(),
        }
    }

    /// Composite key used to present and select a document: `"{id} - {url}"`.
    pub fn key(&self) -> String {
        format!("{} - {}", self.id, self.url)
    }
}
