//! Key and pattern builders for consistent key naming.

use stash_store::escape_glob;

/// Separator between a key prefix and its generated suffix.
const SUFFIX_SEPARATOR: &str = ":";

/// Key of the counter backing auto-suffixed writes under `prefix`.
///
/// The counter shares the prefix key itself, so `prefix` holds the next
/// sequence number and `prefix:0`, `prefix:1`, ... hold the values.
#[must_use]
pub fn counter_key(prefix: &str) -> String {
    prefix.to_string()
}

/// Generate the key for sequence number `n` under `prefix`.
#[must_use]
pub fn auto_key(prefix: &str, n: i64) -> String {
    format!("{}{}{}", prefix, SUFFIX_SEPARATOR, n)
}

/// Pattern matching every key that starts with `prefix`.
///
/// Glob metacharacters in the prefix are escaped, so `a*` matches only
/// keys beginning with the two characters `a*`.
#[must_use]
pub fn prefix_pattern(prefix: &str) -> String {
    format!("{}*", escape_glob(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stash_store::glob_match;

    #[test]
    fn test_auto_key() {
        assert_eq!(auto_key("order", 0), "order:0");
        assert_eq!(auto_key("order:eu", 42), "order:eu:42");
    }

    #[test]
    fn test_counter_key_is_prefix() {
        assert_eq!(counter_key("order"), "order");
    }

    #[test]
    fn test_prefix_pattern() {
        assert_eq!(prefix_pattern("user:"), "user:*");
        assert_eq!(prefix_pattern("a*"), r"a\**");
        assert!(glob_match(&prefix_pattern("a*"), "a*1"));
        assert!(!glob_match(&prefix_pattern("a*"), "ab"));
    }
}
