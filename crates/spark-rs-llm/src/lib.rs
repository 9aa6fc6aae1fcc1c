//! Chat dispatch over hosted chat-completion providers.
//!
//! `ProviderRegistry` describes each provider's endpoint, auth scheme and
//! wire format; `HttpChatClient` turns a `ChatRequest` into one HTTP call and
//! returns the raw text of the top completion.

mod client;
mod error;
mod provider;
mod request;

pub use client::{ChatClient, HttpChatClient, extract_content};
pub use error::LlmError;
pub use provider::{AuthScheme, ProviderRegistry, ProviderSpec, WireFormat};
pub use request::{ChatMessage, ChatRequest};
