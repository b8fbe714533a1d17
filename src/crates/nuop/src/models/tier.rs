//! Storage tier model

use crate::error::{NuopError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Retention window a tier represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Retention {
    /// Current business day
    Today,
    /// Previous business day
    Yesterday,
    /// Historical archive
    Archive,
}

impl Retention {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::Archive => "archive",
        }
    }
}

impl std::fmt::Display for Retention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A read-only relation holding operation records for one retention window.
///
/// The table name is interpolated into SQL, so it is restricted to a plain
/// (optionally schema-qualified) identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageTier {
    /// Schema-qualified table name, e.g. `spb.operacao`
    pub table: String,
    /// Retention window
    pub retention: Retention,
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
            .expect("static identifier regex")
    })
}

impl StorageTier {
    /// Create a tier, validating the table identifier
    pub fn new(table: impl Into<String>, retention: Retention) -> Result<Self> {
        let tier = Self {
            table: table.into(),
            retention,
        };
        tier.validate()?;
        Ok(tier)
    }

    /// Check that the table name is a safe identifier
    pub fn validate(&self) -> Result<()> {
        if identifier_pattern().is_match(&self.table) {
            Ok(())
        } else {
            Err(NuopError::Config(format!(
                "Invalid tier table name: '{}'",
                self.table
            )))
        }
    }

    /// The three tiers of the SPB deployment, in lookup order
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                table: "spb.operacao".to_string(),
                retention: Retention::Today,
            },
            Self {
                table: "consolid.operacao".to_string(),
                retention: Retention::Yesterday,
            },
            Self {
                table: "consolid02.operacao".to_string(),
                retention: Retention::Archive,
            },
        ]
    }
}

impl std::fmt::Display for StorageTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.table, self.retention)
    }
}
