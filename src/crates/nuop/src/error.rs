//! Error types for nuop
//!
//! Provides a unified error type for the question and tracing pipeline.

use std::fmt;

/// Result type alias for nuop operations
pub type Result<T> = std::result::Result<T, NuopError>;

/// Main error type for nuop operations
#[derive(Debug)]
pub enum NuopError {
    /// Configuration error
    Config(String),

    /// Database connection or pool error
    Database(String),

    /// The language model was unreachable or failed while generating SQL or
    /// a narrative. Aborts the current request only.
    Generation(String),

    /// The model output contained no query-start keyword
    NoQueryFound,

    /// The store rejected a generated query
    QueryExecution(String),

    /// One storage tier could not be read
    TierUnavailable { tier: String, reason: String },

    /// Report rendering or writing failed
    Report(String),

    /// IO error
    Io(std::io::Error),

    /// Generic error with message
    Other(String),
}

impl NuopError {
    /// Errors that the pipeline degrades to "no data" instead of aborting.
    pub fn is_absorbed(&self) -> bool {
        matches!(
            self,
            Self::NoQueryFound | Self::QueryExecution(_) | Self::TierUnavailable { .. }
        )
    }
}

impl fmt::Display for NuopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Database(msg) => write!(f, "Database error: {}", msg),
            Self::Generation(msg) => write!(f, "Generation failed: {}", msg),
            Self::NoQueryFound => write!(f, "No SELECT statement found in model output"),
            Self::QueryExecution(msg) => write!(f, "Query execution failed: {}", msg),
            Self::TierUnavailable { tier, reason } => {
                write!(f, "Tier {} unavailable: {}", tier, reason)
            }
            Self::Report(msg) => write!(f, "Report error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for NuopError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

// Conversions from common error types
impl From<std::io::Error> for NuopError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<llm::LlmError> for NuopError {
    fn from(err: llm::LlmError) -> Self {
        Self::Generation(err.to_string())
    }
}

impl From<toml::de::Error> for NuopError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<String> for NuopError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}

impl From<&str> for NuopError {
    fn from(msg: &str) -> Self {
        Self::Other(msg.to_string())
    }
}
