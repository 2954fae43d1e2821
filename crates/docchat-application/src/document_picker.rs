//! Document browsing and selection.

use std::sync::Arc;

use docchat_core::api::ApiClient;
use docchat_core::config::DEFAULT_SAMPLE_SIZE;
use docchat_core::document::Document;
use docchat_core::error::{DocchatError, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::base_url::SharedBaseUrl;

/// Fetches a random sample of backend documents and tracks which ones the
/// user selected during the session.
///
/// `documents` stays `None` until a fetch succeeds; a failed fetch leaves the
/// previous sample in place. `selected_documents` only ever grows.
pub struct DocumentPicker {
    client: Arc<dyn ApiClient>,
    base_url: SharedBaseUrl,
    sample_size: usize,
    rng: StdRng,
    documents: Option<Vec<Document>>,
    selected_documents: Vec<Document>,
}

impl DocumentPicker {
    pub fn new(client: Arc<dyn ApiClient>, base_url: SharedBaseUrl) -> Self {
        Self {
            client,
            base_url,
            sample_size: DEFAULT_SAMPLE_SIZE,
            rng: StdRng::from_entropy(),
            documents: None,
            selected_documents: Vec::new(),
        }
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Makes sampling reproducible.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn documents(&self) -> Option<&[Document]> {
        self.documents.as_deref()
    }

    pub fn selected_documents(&self) -> &[Document] {
        &self.selected_documents
    }

    /// Composite keys (`"{id} - {url}"`) of the fetched documents, in order.
    pub fn options(&self) -> Vec<String> {
        self.documents
            .iter()
            .flatten()
            .map(Document::key)
            .collect()
    }

    /// Fetches all documents and keeps a sample drawn without replacement.
    ///
    /// When the backend has fewer documents than the sample size, all of them
    /// are kept in random order.
    pub async fn fetch(&mut self) -> Result<&[Document]> {
        const OPERATION: &str = "fetch documents";

        let response = self
            .client
            .get(&self.base_url.endpoint("/api/document/"))
            .await?;
        if response.status != 200 {
            tracing::warn!(status = response.status, "document fetch rejected");
            return Err(response.into_error(OPERATION));
        }

        let all: Vec<Document> = response.json()?;
        if all.len() < self.sample_size {
            tracing::warn!(
                available = all.len(),
                sample_size = self.sample_size,
                "backend has fewer documents than the sample size, keeping all"
            );
        }

        let amount = self.sample_size.min(all.len());
        let sample: Vec<Document> = all
            .choose_multiple(&mut self.rng, amount)
            .cloned()
            .collect();
        tracing::debug!(count = sample.len(), "documents fetched");

        let documents = self.documents.insert(sample);
        Ok(documents.as_slice())
    }

    /// Selects the fetched document whose composite key equals `key`.
    pub fn select_by_key(&mut self, key: &str) -> Result<Document> {
        let documents = self.fetched()?;
        let doc = documents
            .iter()
            .find(|doc| doc.key() == key)
            .cloned()
            .ok_or_else(|| DocchatError::not_found("Document", key))?;
        self.selected_documents.push(doc.clone());
        Ok(doc)
    }

    /// Selects the fetched document at `index`.
    pub fn select_by_index(&mut self, index: usize) -> Result<Document> {
        let documents = self.fetched()?;
        let doc = documents
            .get(index)
            .cloned()
            .ok_or_else(|| DocchatError::not_found("Document", format!("#{}", index)))?;
        self.selected_documents.push(doc.clone());
        Ok(doc)
    }

    /// Looks a document up on the backend by id.
    ///
    /// Returns `Ok(None)` when the backend does not accept the id.
    pub async fn select_by_id(&mut self, id: i64) -> Result<Option<Document>> {
        let response = self
            .client
            .get(&self.base_url.endpoint(&format!("/api/document/{}", id)))
            .await?;
        if response.status != 200 {
            tracing::warn!(id, status = response.status, "invalid document id");
            return Ok(None);
        }

        let doc: Document = response.json()?;
        self.selected_documents.push(doc.clone());
        Ok(Some(doc))
    }

    fn fetched(&self) -> Result<&[Document]> {
        self.documents.as_deref().ok_or_else(|| {
            DocchatError::precondition("No documents fetched. Use /fetch to load documents.")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockApiClient, documents_json};
    use std::collections::HashSet;

    fn picker(client: MockApiClient) -> (Arc<MockApiClient>, DocumentPicker) {
        let client = Arc::new(client);
        let base_url = SharedBaseUrl::new("http://localhost:8000").unwrap();
        let picker = DocumentPicker::new(client.clone(), base_url).with_rng_seed(7);
        (client, picker)
    }

    #[tokio::test]
    async fn test_fetch_samples_five_distinct_members() {
        let (client, mut picker) = picker(MockApiClient::new().respond(200, documents_json(7)));

        let fetched = picker.fetch().await.unwrap().to_vec();

        assert_eq!(fetched.len(), 5);
        let ids: HashSet<i64> = fetched.iter().map(|d| d.id).collect();
        assert_eq!(ids.len(), 5);
        assert!(ids.iter().all(|id| (1..=7).contains(id)));
        assert_eq!(picker.documents().unwrap(), fetched.as_slice());
        assert_eq!(client.calls()[0].url, "http://localhost:8000/api/document/");
    }

    #[tokio::test]
    async fn test_fetch_short_backend_keeps_all() {
        let (_, mut picker) = picker(MockApiClient::new().respond(200, documents_json(3)));

        let fetched = picker.fetch().await.unwrap();

        let mut ids: Vec<i64> = fetched.iter().map(|d| d.id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_error_leaves_documents_unchanged() {
        let (_, mut picker) = picker(
            MockApiClient::new()
                .respond(200, documents_json(6))
                .respond(500, "database down"),
        );
        let first = picker.fetch().await.unwrap().to_vec();

        let err = picker.fetch().await.unwrap_err();

        assert!(err.is_backend());
        assert!(err.to_string().contains("database down"));
        assert_eq!(picker.documents().unwrap(), first.as_slice());
    }

    #[tokio::test]
    async fn test_fetch_error_before_any_success_leaves_none() {
        let (_, mut picker) = picker(MockApiClient::new().respond(503, "unavailable"));
        assert!(picker.fetch().await.is_err());
        assert!(picker.documents().is_none());
        assert!(picker.options().is_empty());
    }

    #[tokio::test]
    async fn test_select_by_key() {
        let (_, mut picker) = picker(MockApiClient::new().respond(200, documents_json(5)));
        picker.fetch().await.unwrap();
        let key = picker.options()[2].clone();

        let doc = picker.select_by_key(&key).unwrap();

        assert_eq!(doc.key(), key);
        assert_eq!(picker.selected_documents(), &[doc]);
    }

    #[tokio::test]
    async fn test_select_by_key_without_match_is_not_found() {
        let (_, mut picker) = picker(MockApiClient::new().respond(200, documents_json(5)));
        picker.fetch().await.unwrap();

        let err = picker.select_by_key("99 - https://nowhere").unwrap_err();

        assert!(err.is_not_found());
        assert!(picker.selected_documents().is_empty());
    }

    #[test]
    fn test_select_before_fetch_is_precondition() {
        let (_, mut picker) = picker(MockApiClient::new());
        assert!(picker.select_by_key("1 - x").unwrap_err().is_precondition());
        assert!(picker.select_by_index(0).unwrap_err().is_precondition());
    }

    #[tokio::test]
    async fn test_select_by_index_out_of_range() {
        let (_, mut picker) = picker(MockApiClient::new().respond(200, documents_json(5)));
        picker.fetch().await.unwrap();

        assert!(picker.select_by_index(5).unwrap_err().is_not_found());
        let doc = picker.select_by_index(0).unwrap();
        assert_eq!(&doc, &picker.documents().unwrap()[0]);
    }

    #[tokio::test]
    async fn test_select_by_id_accumulates() {
        let (client, mut picker) = picker(
            MockApiClient::new()
                .respond(200, r#"{"id": 3, "url": "https://example.com/3.pdf"}"#)
                .respond(200, r#"{"id": 4, "url": "https://example.com/4.pdf"}"#),
        );

        let first = picker.select_by_id(3).await.unwrap().unwrap();
        let second = picker.select_by_id(4).await.unwrap().unwrap();

        assert_eq!(first.id, 3);
        assert_eq!(second.id, 4);
        assert_eq!(picker.selected_documents().len(), 2);
        assert_eq!(client.calls()[0].url, "http://localhost:8000/api/document/3");
    }

    #[tokio::test]
    async fn test_select_by_invalid_id_returns_none() {
        let (_, mut picker) = picker(MockApiClient::new().respond(404, "not found"));

        assert_eq!(picker.select_by_id(12).await.unwrap(), None);
        assert!(picker.selected_documents().is_empty());
    }

    #[tokio::test]
    async fn test_base_url_is_read_per_request() {
        let client = Arc::new(
            MockApiClient::new()
                .respond(200, documents_json(5))
                .respond(200, documents_json(5)),
        );
        let base_url = SharedBaseUrl::new("http://localhost:8000").unwrap();
        let mut picker = DocumentPicker::new(client.clone(), base_url.clone());

        picker.fetch().await.unwrap();
        base_url.set("http://backend:9000").unwrap();
        picker.fetch().await.unwrap();

        let urls: Vec<String> = client.calls().into_iter().map(|c| c.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://localhost:8000/api/document/",
                "http://backend:9000/api/document/"
            ]
        );
    }
}
