pub mod api;
pub mod config;
pub mod conversation;
pub mod document;
pub mod error;
pub mod sse;
pub mod stream;

// Re-export common types
pub use api::{ApiClient, ApiResponse, EVENT_STREAM_MEDIA_TYPE};
pub use config::ClientConfig;
pub use conversation::ChatEvent;
pub use document::Document;
pub use error::{DocchatError, Result};
pub use stream::{EventSender, EventStream};
