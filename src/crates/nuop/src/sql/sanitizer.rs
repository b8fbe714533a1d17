//! Deterministic cleanup of model output into one SQL statement.

use crate::error::{NuopError, Result};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Keyword every accepted statement starts with
pub const QUERY_START: &str = "SELECT";

/// Statement terminator
pub const TERMINATOR: char = ';';

fn fence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)```sql|```").expect("static fence regex"))
}

/// A single statement extracted from model output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQuery {
    sql: String,
    terminated: bool,
}

impl GeneratedQuery {
    /// The statement text
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Whether a terminator was found
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Whether the statement mentions `name`, case-insensitive
    pub fn references(&self, name: &str) -> bool {
        self.sql
            .to_ascii_lowercase()
            .contains(&name.to_ascii_lowercase())
    }
}

impl std::fmt::Display for GeneratedQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql)
    }
}

/// Extract the statement from raw model output.
///
/// Strips code fences, drops everything before the first case-insensitive
/// `SELECT` and everything after the first `;` that follows it. Output with no
/// `SELECT` at all fails with [`NuopError::NoQueryFound`]. A missing `;` is
/// tolerated and reported through [`GeneratedQuery::is_terminated`].
pub fn sanitize(raw: &str) -> Result<GeneratedQuery> {
    let unfenced = fence_pattern().replace_all(raw, "");
    let text = unfenced.trim();

    // ASCII uppercasing keeps byte offsets aligned with `text`.
    let start = text
        .to_ascii_uppercase()
        .find(QUERY_START)
        .ok_or(NuopError::NoQueryFound)?;
    let statement = &text[start..];

    let query = match statement.find(TERMINATOR) {
        Some(end) => GeneratedQuery {
            sql: statement[..=end].to_string(),
            terminated: true,
        },
        None => {
            warn!("Generated SQL has no terminator; executing as-is");
            GeneratedQuery {
                sql: statement.trim_end().to_string(),
                terminated: false,
            }
        }
    };

    debug!(sql = %query.sql, terminated = query.terminated, "Sanitized generated SQL");
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_statement() {
        let q = sanitize("SELECT msgid FROM spb.operacao;").unwrap();
        assert_eq!(q.sql(), "SELECT msgid FROM spb.operacao;");
        assert!(q.is_terminated());
    }

    #[test]
    fn test_strips_fences_and_commentary() {
        let raw = "Here is your query:\n```sql\nSELECT msgid, TRIM(nuop) as nuop FROM spb.operacao WHERE statusmsg = 313;\n```\nThis returns the pending ones.";
        let q = sanitize(raw).unwrap();
        assert_eq!(
            q.sql(),
            "SELECT msgid, TRIM(nuop) as nuop FROM spb.operacao WHERE statusmsg = 313;"
        );
    }

    #[test]
    fn test_case_insensitive_keyword() {
        let q = sanitize("sql: select * from spb.operacao limit 5; extra").unwrap();
        assert!(q.sql().starts_with("select"));
        assert!(q.sql().ends_with(';'));
    }

    #[test]
    fn test_only_first_statement_kept() {
        let q = sanitize("SELECT 1; DELETE FROM spb.operacao;").unwrap();
        assert_eq!(q.sql(), "SELECT 1;");
        assert_eq!(q.sql().matches(';').count(), 1);
    }

    #[test]
    fn test_unterminated_is_kept() {
        let q = sanitize("```\nSELECT * FROM consolid.operacao WHERE statusop = 205\n```").unwrap();
        assert_eq!(q.sql(), "SELECT * FROM consolid.operacao WHERE statusop = 205");
        assert!(!q.is_terminated());
    }

    #[test]
    fn test_semicolon_before_keyword_ignored() {
        let q = sanitize("note; SELECT 2;").unwrap();
        assert_eq!(q.sql(), "SELECT 2;");
    }

    #[test]
    fn test_no_keyword_fails() {
        assert!(matches!(sanitize("I cannot help with that."), Err(NuopError::NoQueryFound)));
        assert!(matches!(sanitize(""), Err(NuopError::NoQueryFound)));
        assert!(matches!(sanitize("```sql\n```"), Err(NuopError::NoQueryFound)));
    }

    #[test]
    fn test_non_ascii_prefix_keeps_offsets() {
        let q = sanitize("Consulta válida para ß: SELECT nuop FROM spb.operacao;").unwrap();
        assert_eq!(q.sql(), "SELECT nuop FROM spb.operacao;");
    }

    #[test]
    fn test_output_starts_with_keyword_for_varied_inputs() {
        let inputs = [
            "SELECT 1;",
            "  \n```sql SeLeCt 2 ;```",
            "prefix text select x from y",
            "A; B; selectable; SELECT z;",
        ];
        for raw in inputs {
            let q = sanitize(raw).unwrap();
            assert!(q.sql().to_ascii_uppercase().starts_with(QUERY_START), "{raw}");
            if q.is_terminated() {
                assert!(q.sql().ends_with(TERMINATOR));
            }
        }
    }

    #[test]
    fn test_references() {
        let q = sanitize("SELECT * FROM SPB.OPERACAO;").unwrap();
        assert!(q.references("spb.operacao"));
        assert!(!q.references("consolid.operacao"));
    }
}
