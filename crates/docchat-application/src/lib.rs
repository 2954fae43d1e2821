pub mod base_url;
pub mod conversation;
pub mod document_picker;
pub mod session;

#[cfg(test)]
mod test_support;

pub use base_url::SharedBaseUrl;
pub use conversation::{Conversation, MessageStream};
pub use document_picker::DocumentPicker;
pub use session::Session;
