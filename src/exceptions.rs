//! Exception rules: patterns that exempt a whole unit of text from
//! transformation.

use crate::cache;
use serde::{Deserialize, Serialize};

/// One exception rule. Owned by the store; read-only during a
/// transformation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionRule {
    pub id: u64,
    pub pattern: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// True iff any enabled rule's pattern matches anywhere in `text`.
///
/// Search semantics, not full-match. An empty rule list never exempts.
/// A rule whose pattern does not compile is skipped with a warning; it
/// neither exempts nor aborts the check.
pub fn is_exempt(text: &str, rules: &[ExceptionRule]) -> bool {
    rules
        .iter()
        .filter(|rule| rule.enabled)
        .any(|rule| match cache::get_or_compile(&rule.pattern) {
            Ok(regex) => regex.is_match(text),
            Err(error) => {
                log::warn!("skipping exception rule {}: {error}", rule.id);
                false
            }
        })
}
