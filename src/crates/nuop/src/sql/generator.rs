//! Prompted SQL generation.

use super::policy::QueryPolicy;
use super::sanitizer::{sanitize, GeneratedQuery};
use crate::error::{NuopError, Result};
use crate::models::{Retention, StorageTier};
use llm::TextCompletion;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Columns every generated query must project
pub const REQUIRED_PROJECTION: &str =
    "SELECT msgid, TRIM(nuop) AS nuop, statusop, statusmsg, ts_inclusao, codmsg";

const SQL_TEMPLATE: &str = r#"You are a PostgreSQL generator. Return ONLY the SQL statement, nothing else.

TABLE MAP:
{tables}

FILTER RULES (follow exactly):
1. If the question names ONE SPECIFIC status number (e.g. "status 313"), filter on that number only.
   - number >= 300 -> WHERE statusmsg = N
   - number < 300  -> WHERE statusop = N
2. Only when the question gives NO number (e.g. "show me the errors") use the category lists:
   - Errors -> statusmsg IN (303, 308, 320) OR statusop IN (205, 107)

REQUIRED COLUMNS:
   {projection}

QUESTION: {question}
{hint}SQL:
"#;

/// Turns operator questions into SQL through a language model
pub struct SqlGenerator {
    llm: Arc<dyn TextCompletion>,
    tiers: Vec<StorageTier>,
}

impl SqlGenerator {
    /// Create a generator routing over `tiers`
    pub fn new(llm: Arc<dyn TextCompletion>, tiers: Vec<StorageTier>) -> Self {
        Self { llm, tiers }
    }

    fn table_map(&self) -> String {
        self.tiers
            .iter()
            .enumerate()
            .map(|(i, tier)| {
                let cue = match tier.retention {
                    Retention::Today => "TODAY, \"latest\", \"now\"",
                    Retention::Yesterday => "YESTERDAY, \"history\"",
                    Retention::Archive => "older archive",
                };
                format!("{}. '{}' -> {}.", i + 1, tier.table, cue)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render the full prompt for a question
    pub fn render_prompt(&self, question: &str) -> String {
        let hint = QueryPolicy::analyze(question).hint(&self.tiers);
        let hint = if hint.is_empty() {
            hint
        } else {
            format!("HINTS:\n{}\n", hint)
        };

        SQL_TEMPLATE
            .replace("{tables}", &self.table_map())
            .replace("{projection}", REQUIRED_PROJECTION)
            .replace("{hint}", &hint)
            .replace("{question}", question.trim())
    }

    /// Ask the model for SQL. Returns its raw, unsanitized text.
    pub async fn generate(&self, question: &str) -> Result<String> {
        info!(question = %question.trim(), "Generating SQL");
        let prompt = self.render_prompt(question);
        let raw = self.llm.complete(&prompt).await.map_err(NuopError::from)?;
        debug!(raw = %raw, "Model returned SQL candidate");
        Ok(raw)
    }

    /// Generate and sanitize a query.
    ///
    /// Queries that name none of the configured tiers are logged but still
    /// returned; the store is the final judge.
    pub async fn generate_query(&self, question: &str) -> Result<GeneratedQuery> {
        let raw = self.generate(question).await?;
        let query = sanitize(&raw)?;

        if !self.tiers.iter().any(|t| query.references(&t.table)) {
            warn!(sql = %query, "Generated SQL references no configured tier");
        }

        Ok(query)
    }
}
