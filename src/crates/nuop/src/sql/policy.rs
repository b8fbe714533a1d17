//! Routing and filter rules applied to operator questions.
//!
//! The rules are ultimately enforced by the prompt, but they are also
//! evaluated here so the generator can hand the model an explicit hint for
//! the question at hand.

use crate::models::{Retention, StorageTier};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Codes at or above this value filter the secondary-status column
pub const SECONDARY_THRESHOLD: i32 = 300;

/// Primary status column
pub const PRIMARY_COLUMN: &str = "statusop";

/// Secondary status column
pub const SECONDARY_COLUMN: &str = "statusmsg";

const RECENT_TERMS: &[&str] = &["hoje", "agora", "últimas", "ultimas", "today", "now", "latest"];
const PAST_TERMS: &[&str] = &["ontem", "histórico", "historico", "yesterday", "history"];
const ERROR_TERMS: &[&str] = &["erro", "erros", "error", "errors", "falha", "falhas", "failed", "failures"];

/// Which retention window a question points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierRoute {
    /// "now", "latest", "today"
    Recent,
    /// "yesterday", "history"
    Past,
    /// No temporal hint
    Unspecified,
}

impl TierRoute {
    /// Pick the tier this route points at from the configured list
    pub fn select<'a>(&self, tiers: &'a [StorageTier]) -> Option<&'a StorageTier> {
        let wanted = match self {
            Self::Recent => Retention::Today,
            Self::Past => Retention::Yesterday,
            Self::Unspecified => return None,
        };
        tiers.iter().find(|t| t.retention == wanted)
    }
}

/// Status category with a fixed membership list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    Errors,
}

impl StatusCategory {
    /// Secondary-status members
    pub fn secondary_codes(&self) -> &'static [i32] {
        match self {
            Self::Errors => &[303, 308, 320],
        }
    }

    /// Primary-status members
    pub fn primary_codes(&self) -> &'static [i32] {
        match self {
            Self::Errors => &[205, 107],
        }
    }

    /// WHERE predicate for the category
    pub fn predicate(&self) -> String {
        format!(
            "{} IN ({}) OR {} IN ({})",
            SECONDARY_COLUMN,
            join_codes(self.secondary_codes()),
            PRIMARY_COLUMN,
            join_codes(self.primary_codes())
        )
    }
}

fn join_codes(codes: &[i32]) -> String {
    codes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// How a question filters on status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterIntent {
    /// Exactly one specific code
    Code(i32),
    /// A named category without a code
    Category(StatusCategory),
    /// Nothing status-related
    Unfiltered,
}

impl FilterIntent {
    /// Column a specific code filters on
    pub fn column_for(code: i32) -> &'static str {
        if code >= SECONDARY_THRESHOLD {
            SECONDARY_COLUMN
        } else {
            PRIMARY_COLUMN
        }
    }

    /// WHERE predicate for this intent, if any
    pub fn predicate(&self) -> Option<String> {
        match self {
            Self::Code(code) => Some(format!("{} = {}", Self::column_for(*code), code)),
            Self::Category(category) => Some(category.predicate()),
            Self::Unfiltered => None,
        }
    }
}

/// Rules evaluated for one question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    pub route: TierRoute,
    pub filter: FilterIntent,
}

fn status_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\d{3}\b").expect("static status regex"))
}

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w+").expect("static word regex"))
}

impl QueryPolicy {
    /// Evaluate the routing and filter rules for a question
    pub fn analyze(question: &str) -> Self {
        let lowered = question.to_lowercase();
        let words: Vec<&str> = word_pattern()
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .collect();
        let mentions = |terms: &[&str]| words.iter().any(|w| terms.contains(w));

        let route = if mentions(PAST_TERMS) {
            TierRoute::Past
        } else if mentions(RECENT_TERMS) {
            TierRoute::Recent
        } else {
            TierRoute::Unspecified
        };

        let codes: BTreeSet<i32> = status_code_pattern()
            .find_iter(&lowered)
            .filter_map(|m| m.as_str().parse().ok())
            .collect();

        let filter = if codes.len() == 1 {
            codes
                .iter()
                .next()
                .map(|c| FilterIntent::Code(*c))
                .unwrap_or(FilterIntent::Unfiltered)
        } else if codes.is_empty() && mentions(ERROR_TERMS) {
            FilterIntent::Category(StatusCategory::Errors)
        } else {
            FilterIntent::Unfiltered
        };

        Self { route, filter }
    }

    /// Prompt hint lines for this question, empty when no rule applies
    pub fn hint(&self, tiers: &[StorageTier]) -> String {
        let mut lines = Vec::new();
        if let Some(tier) = self.route.select(tiers) {
            lines.push(format!("-- table: {}", tier.table));
        }
        if let Some(predicate) = self.filter.predicate() {
            lines.push(format!("-- where: {}", predicate));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specific_secondary_code() {
        let policy = QueryPolicy::analyze("show me status 313");
        assert_eq!(policy.filter, FilterIntent::Code(313));
        assert_eq!(policy.filter.predicate().unwrap(), "statusmsg = 313");
    }

    #[test]
    fn test_specific_primary_code() {
        let policy = QueryPolicy::analyze("quais operações com status 205 hoje?");
        assert_eq!(policy.filter.predicate().unwrap(), "statusop = 205");
        assert_eq!(policy.route, TierRoute::Recent);
    }

    #[test]
    fn test_threshold_boundary() {
        assert_eq!(FilterIntent::column_for(300), SECONDARY_COLUMN);
        assert_eq!(FilterIntent::column_for(299), PRIMARY_COLUMN);
    }

    #[test]
    fn test_specific_code_never_uses_list() {
        let policy = QueryPolicy::analyze("errors with status 320");
        let predicate = policy.filter.predicate().unwrap();
        assert_eq!(predicate, "statusmsg = 320");
        assert!(!predicate.contains(" IN "));
    }

    #[test]
    fn test_error_category_fallback() {
        let policy = QueryPolicy::analyze("mostre os erros de ontem");
        assert_eq!(policy.filter, FilterIntent::Category(StatusCategory::Errors));
        assert_eq!(
            policy.filter.predicate().unwrap(),
            "statusmsg IN (303, 308, 320) OR statusop IN (205, 107)"
        );
        assert_eq!(policy.route, TierRoute::Past);
    }

    #[test]
    fn test_english_error_category() {
        let policy = QueryPolicy::analyze("show me the errors");
        assert_eq!(policy.filter, FilterIntent::Category(StatusCategory::Errors));
    }

    #[test]
    fn test_long_numbers_are_not_codes() {
        let policy = QueryPolicy::analyze("what happened to 20240502000123 today");
        assert_eq!(policy.filter, FilterIntent::Unfiltered);
        assert_eq!(policy.route, TierRoute::Recent);
    }

    #[test]
    fn test_several_codes_are_left_to_the_model() {
        let policy = QueryPolicy::analyze("status 302 or 313");
        assert_eq!(policy.filter, FilterIntent::Unfiltered);
    }

    #[test]
    fn test_route_words_are_whole_words() {
        // "know" contains "now" but is not a recency marker
        let policy = QueryPolicy::analyze("I want to know the operations");
        assert_eq!(policy.route, TierRoute::Unspecified);
    }

    #[test]
    fn test_hint_lines() {
        let tiers = StorageTier::defaults();
        let hint = QueryPolicy::analyze("latest status 313").hint(&tiers);
        assert_eq!(hint, "-- table: spb.operacao\n-- where: statusmsg = 313");

        let hint = QueryPolicy::analyze("history of errors").hint(&tiers);
        assert!(hint.starts_with("-- table: consolid.operacao"));

        assert!(QueryPolicy::analyze("list operations").hint(&tiers).is_empty());
    }
}
