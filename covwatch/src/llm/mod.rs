mod api;
pub mod prompts;
mod provider;
pub mod schema;
mod structured;

pub use api::LlmApiClient;
pub use provider::{CompletionOptions, LlmBackend, LlmCapability, LlmProvider};
pub use structured::StructuredCaller;
