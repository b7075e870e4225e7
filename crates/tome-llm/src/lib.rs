//! LLM provider abstraction: text completion and embeddings.

pub mod error;
#[cfg(feature = "mock")]
pub mod mock;
pub mod ollama;
pub mod provider;
pub mod timeout;

pub use error::LlmError;
pub use provider::LlmProvider;
pub use timeout::TimedProvider;
