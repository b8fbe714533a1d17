//! Natural-language to SQL translation
//!
//! The generator asks the language model for a query under a fixed rule set;
//! the sanitizer then bounds whatever came back to a single statement before
//! it reaches the store.

pub mod generator;
pub mod policy;
pub mod sanitizer;

pub use generator::SqlGenerator;
pub use policy::{FilterIntent, QueryPolicy, StatusCategory, TierRoute};
pub use sanitizer::{sanitize, GeneratedQuery};
