//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod file_session_store;
mod http_field_api_client;
mod in_memory_session_store;

pub use file_session_store::FileSessionStore;
pub use http_field_api_client::HttpFieldApiClient;
pub use in_memory_session_store::InMemorySessionStore;
