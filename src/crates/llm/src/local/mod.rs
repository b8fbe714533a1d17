//! Local LLM provider implementations.
//!
//! Providers running on localhost or the local network. They need no API key
//! and keep settlement data on the operator's machine.

pub mod ollama;

pub use ollama::OllamaClient;
