use std::sync::Arc;

use crate::constants::{EXTRA_NAME_CHARS, MAX_NAME_LENGTH, MIN_NAME_LENGTH};
use crate::error::NameRejection;
use crate::moderation::ModerationPolicy;

/// Collapses whitespace runs into single spaces and trims both ends.
pub fn normalize_name(raw: Option<&str>) -> String {
    raw.unwrap_or_default()
        .split(is_name_whitespace)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The browser's whitespace set: Unicode White_Space without NEL, plus the
/// byte order mark.
fn is_name_whitespace(ch: char) -> bool {
    (ch.is_whitespace() && ch != '\u{85}') || ch == '\u{feff}'
}

fn is_allowed_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, ' ' | '-' | '_') || EXTRA_NAME_CHARS.contains(&ch)
}

#[derive(Clone, Debug)]
pub struct NameValidator {
    policy: Arc<ModerationPolicy>,
}

impl NameValidator {
    pub fn new(policy: Arc<ModerationPolicy>) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ModerationPolicy {
        &self.policy
    }

    /// Checks length, then character set, then the moderation blocklist.
    pub fn validate(&self, name: &str) -> Result<(), NameRejection> {
        let length = name.chars().count();
        if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&length) {
            return Err(NameRejection::Length);
        }
        if !name.chars().all(is_allowed_name_char) {
            return Err(NameRejection::Charset);
        }
        if self.policy.contains_blocked_term(name) {
            return Err(NameRejection::BlockedTerm);
        }
        Ok(())
    }
}

impl Default for NameValidator {
    fn default() -> Self {
        Self::new(Arc::new(ModerationPolicy::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_and_trims() {
        assert_eq!(normalize_name(None), "");
        assert_eq!(normalize_name(Some("")), "");
        assert_eq!(normalize_name(Some("   ")), "");
        assert_eq!(normalize_name(Some("  a ")), "a");
        assert_eq!(normalize_name(Some(" Ann \t  Lee\n")), "Ann Lee");
    }

    #[test]
    fn whitespace_set_includes_bom_but_not_nel() {
        assert_eq!(normalize_name(Some("\u{feff}Ann\u{feff}")), "Ann");
        assert_eq!(normalize_name(Some("Ann\u{a0}\u{3000}Lee")), "Ann Lee");
        assert_eq!(normalize_name(Some("Ann\u{85}Lee")), "Ann\u{85}Lee");

        let validator = NameValidator::default();
        assert_eq!(
            validator.validate(&normalize_name(Some("Ann\u{85}Lee"))),
            Err(NameRejection::Charset)
        );
    }

    #[test]
    fn length_bounds_are_inclusive() {
        let validator = NameValidator::default();
        assert_eq!(validator.validate("a"), Err(NameRejection::Length));
        assert_eq!(validator.validate(""), Err(NameRejection::Length));
        assert_eq!(validator.validate("Al"), Ok(()));
        assert_eq!(validator.validate(&"b".repeat(16)), Ok(()));
        assert_eq!(
            validator.validate(&"b".repeat(17)),
            Err(NameRejection::Length)
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let validator = NameValidator::default();
        assert_eq!(validator.validate(&"ö".repeat(16)), Ok(()));
    }

    #[test]
    fn charset_allows_listed_symbols_and_accents() {
        let validator = NameValidator::default();
        assert_eq!(validator.validate("Åsa-Lo_9 Ö"), Ok(()));
        assert_eq!(validator.validate("ann!"), Err(NameRejection::Charset));
        assert_eq!(validator.validate("José"), Err(NameRejection::Charset));
        assert_eq!(validator.validate("a.b"), Err(NameRejection::Charset));
    }

    #[test]
    fn blocked_terms_match_in_any_casing_and_position() {
        let validator = NameValidator::default();
        assert_eq!(validator.validate("xShItx"), Err(NameRejection::BlockedTerm));
        assert_eq!(validator.validate("IDIOT 2"), Err(NameRejection::BlockedTerm));
        assert_eq!(validator.validate("Stefan"), Err(NameRejection::BlockedTerm));
    }

    #[test]
    fn length_is_reported_before_charset_and_moderation() {
        let validator = NameValidator::default();
        assert_eq!(
            validator.validate("!!fuck!!!!!!!!!!!!"),
            Err(NameRejection::Length)
        );
        assert_eq!(validator.validate("fuck!"), Err(NameRejection::Charset));
    }
}
