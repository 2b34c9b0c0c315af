//! Outbound ports - Interfaces that the application requires from external systems

mod ai_provider_port;
mod repository_port;

pub use ai_provider_port::{AiError, AiProviderPort, CompletionRequest, CompletionResponse};
pub use repository_port::{Record, RecordStore, RepoError, Repository, Store};
