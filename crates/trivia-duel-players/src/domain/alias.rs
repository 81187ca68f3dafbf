//! Alias rules.

use std::sync::LazyLock;

use regex::Regex;
use trivia_duel_core::error::Rejection;

// 5-20 characters, Latin letters, digits, dashes and underscores, leading letter.
static ALIAS_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9\-_]{4,19}$").expect("valid regex"));

static REPEATED_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\-_]{2}").expect("valid regex"));

/// Checks the shape of a requested alias. Uniqueness is checked against
/// the player store separately.
///
/// # Errors
///
/// Returns `Rejection::AliasInvalid` if the alias breaks a rule.
pub fn validate_alias(alias: &str) -> Result<(), Rejection> {
    if ALIAS_SHAPE.is_match(alias) && !REPEATED_SEPARATOR.is_match(alias) {
        Ok(())
    } else {
        Err(Rejection::AliasInvalid)
    }
}
