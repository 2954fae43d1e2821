use std::sync::{Arc, PoisonError, RwLock};

use docchat_core::config::normalize_base_url;
use docchat_core::error::Result;

/// Runtime-mutable backend base URL shared by the picker and the conversation.
///
/// Every operation calls [`SharedBaseUrl::endpoint`] at request time, so a
/// change made through any clone is seen by the next request.
#[derive(Debug, Clone)]
pub struct SharedBaseUrl(Arc<RwLock<String>>);

impl SharedBaseUrl {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self(Arc::new(RwLock::new(normalize_base_url(base_url)?))))
    }

    pub fn get(&self) -> String {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Validates and replaces the URL. On error the previous value is kept.
    pub fn set(&self, base_url: &str) -> Result<()> {
        let normalized = normalize_base_url(base_url)?;
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = normalized;
        Ok(())
    }

    /// Joins `path` (which starts with `/`) onto the current URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.get(), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_see_updates() {
        let base_url = SharedBaseUrl::new("http://localhost:8000").unwrap();
        let held_elsewhere = base_url.clone();

        base_url.set("https://docs.example.com/").unwrap();

        assert_eq!(
            held_elsewhere.endpoint("/api/document/"),
            "https://docs.example.com/api/document/"
        );
    }

    #[test]
    fn test_invalid_update_keeps_previous() {
        let base_url = SharedBaseUrl::new("http://localhost:8000").unwrap();
        assert!(base_url.set("nonsense").is_err());
        assert_eq!(base_url.get(), "http://localhost:8000");
    }
}
