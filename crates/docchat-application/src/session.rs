//! Session context: the one picker and one conversation of an interactive run.

use std::sync::Arc;

use docchat_core::api::ApiClient;
use docchat_core::config::ClientConfig;
use docchat_core::document::Document;
use docchat_core::error::Result;

use crate::base_url::SharedBaseUrl;
use crate::conversation::Conversation;
use crate::document_picker::DocumentPicker;

/// Holds the base URL, the document picker, and the conversation for the
/// lifetime of one interactive run. The UI shell constructs it once and
/// drives it by reference.
pub struct Session {
    base_url: SharedBaseUrl,
    picker: DocumentPicker,
    conversation: Conversation,
    selected_document: Option<Document>,
}

impl Session {
    pub fn new(config: &ClientConfig, client: Arc<dyn ApiClient>) -> Result<Self> {
        let base_url = SharedBaseUrl::new(&config.base_url)?;
        let picker = DocumentPicker::new(client.clone(), base_url.clone())
            .with_sample_size(config.sample_size);
        let conversation = Conversation::new(client, base_url.clone());

        Ok(Self {
            base_url,
            picker,
            conversation,
            selected_document: None,
        })
    }

    pub fn base_url(&self) -> String {
        self.base_url.get()
    }

    /// Points every later operation at a different backend.
    pub fn set_base_url(&self, base_url: &str) -> Result<()> {
        self.base_url.set(base_url)?;
        tracing::info!(base_url = %self.base_url.get(), "base URL changed");
        Ok(())
    }

    pub fn picker(&self) -> &DocumentPicker {
        &self.picker
    }

    pub fn picker_mut(&mut self) -> &mut DocumentPicker {
        &mut self.picker
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    pub fn selected_document(&self) -> Option<&Document> {
        self.selected_document.as_ref()
    }

    /// Selects a document by backend id and binds it to the next conversation.
    ///
    /// Returns `Ok(None)` for an id the backend rejects; nothing is bound then.
    pub async fn pick_document_by_id(&mut self, id: i64) -> Result<Option<Document>> {
        let Some(doc) = self.picker.select_by_id(id).await? else {
            return Ok(None);
        };
        self.bind(&doc);
        Ok(Some(doc))
    }

    /// Selects a fetched document by its `"{id} - {url}"` key and binds it.
    pub fn pick_document_by_key(&mut self, key: &str) -> Result<Document> {
        let doc = self.picker.select_by_key(key)?;
        self.bind(&doc);
        Ok(doc)
    }

    /// Selects the fetched document at `index` and binds it, fetching first
    /// when nothing has been fetched yet.
    pub async fn pick_document(&mut self, index: usize) -> Result<Document> {
        if self.picker.documents().is_none() {
            self.picker.fetch().await?;
        }
        let doc = self.picker.select_by_index(index)?;
        self.bind(&doc);
        Ok(doc)
    }

    fn bind(&mut self, doc: &Document) {
        self.conversation.bind_documents(vec![doc.id]);
        self.selected_document = Some(doc.clone());
    }
}
