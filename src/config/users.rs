//! Reviewer configuration loaded from environment variables.
//!
//! Premium requests are reviewed by the identities listed in `ADMIN_USER_IDS`
//! (comma-separated Discord user IDs). Membership in this list is what grants the
//! `admin` role on a profile; being premium does not.

use std::collections::HashSet;

/// Parses a comma-separated list of user IDs, ignoring blanks and surrounding whitespace.
#[must_use]
pub fn parse_user_ids(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Gets the set of reviewer identities from `ADMIN_USER_IDS`.
///
/// Returns an empty set when the variable is not configured, in which case nobody
/// can review premium requests.
#[must_use]
pub fn get_admin_user_ids() -> HashSet<String> {
    std::env::var("ADMIN_USER_IDS")
        .map(|raw| parse_user_ids(&raw))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_ids_trims_and_skips_blanks() {
        let ids = parse_user_ids(" 123 , ,456,");
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("123"));
        assert!(ids.contains("456"));
    }

    #[test]
    fn test_parse_user_ids_empty() {
        assert!(parse_user_ids("").is_empty());
    }
}
