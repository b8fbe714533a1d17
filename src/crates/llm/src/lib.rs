//! Language-model collaborators for nuop.
//!
//! The nuop pipeline talks to a language model in exactly two places: turning
//! an operator question into SQL, and narrating a reconstructed operation
//! timeline. Both are single, stateless prompt-in/text-out calls, so this
//! crate exposes them through one small capability, [`TextCompletion`], and
//! ships a local provider implementation for it.
//!
//! # Local Providers
//!
//! - **Ollama** - local LLM runner (the deployment default, `llama3`)
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use llm::local::OllamaClient;
//! use llm::{LocalLlmConfig, TextCompletion};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LocalLlmConfig::new("http://localhost:11434", "llama3");
//!     let client = OllamaClient::new(config)?;
//!
//!     let text = client.complete("Return only SQL: ...").await?;
//!     println!("{}", text);
//!
//!     Ok(())
//! }
//! ```

pub mod completion;
pub mod config;
pub mod error;
pub mod provider_utils;

#[cfg(feature = "local")]
pub mod local;

// Re-export commonly used types
pub use completion::{CannedCompletion, TextCompletion};
pub use config::LocalLlmConfig;
pub use error::{LlmError, Result};
pub use provider_utils::{ModelInfo, ProviderUtils};
