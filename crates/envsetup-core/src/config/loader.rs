//! Environment variable loading.
//!
//! Keeps the fallback chains in one place so callers never repeat `or_else`.

use std::env;

fn lookup(primary: &str, aliases: &[&str]) -> Option<String> {
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
}

/// Read from the primary key or the alias chain, falling back to `default`.
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    env_optional(primary, aliases).unwrap_or_else(default)
}

/// Read from the primary key or the alias chain. Empty values count as unset.
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    lookup(primary, aliases).and_then(|s| {
        let s = s.trim().to_string();
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    })
}

/// Boolean variable: `0`/`false`/`no`/`off` are false, anything else is true.
/// Empty values count as unset.
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    match env_optional(primary, aliases) {
        Some(s) => !matches!(s.to_lowercase().as_str(), "0" | "false" | "no" | "off"),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test owns its keys; the harness runs tests on parallel threads.

    #[test]
    fn test_env_or_prefers_primary_then_alias() {
        env::set_var("ENVSETUP_TEST_OR_ALIAS", "from-alias");
        assert_eq!(
            env_or("ENVSETUP_TEST_OR_PRIMARY", &["ENVSETUP_TEST_OR_ALIAS"], || "d".into()),
            "from-alias"
        );
        env::set_var("ENVSETUP_TEST_OR_PRIMARY", "from-primary");
        assert_eq!(
            env_or("ENVSETUP_TEST_OR_PRIMARY", &["ENVSETUP_TEST_OR_ALIAS"], || "d".into()),
            "from-primary"
        );
    }

    #[test]
    fn test_env_optional_treats_blank_as_unset() {
        env::set_var("ENVSETUP_TEST_BLANK", "   ");
        assert_eq!(env_optional("ENVSETUP_TEST_BLANK", &[]), None);
        assert_eq!(
            env_or("ENVSETUP_TEST_BLANK", &[], || "venv".into()),
            "venv"
        );
    }

    #[test]
    fn test_env_optional_trims() {
        env::set_var("ENVSETUP_TEST_TRIM", "  .venv \n");
        assert_eq!(
            env_optional("ENVSETUP_TEST_TRIM", &[]).as_deref(),
            Some(".venv")
        );
    }

    #[test]
    fn test_env_bool() {
        assert!(env_bool("ENVSETUP_TEST_BOOL_UNSET", &[], true));
        assert!(!env_bool("ENVSETUP_TEST_BOOL_UNSET", &[], false));
        env::set_var("ENVSETUP_TEST_BOOL_OFF", "Off");
        assert!(!env_bool("ENVSETUP_TEST_BOOL_OFF", &[], true));
        env::set_var("ENVSETUP_TEST_BOOL_ON", "1");
        assert!(env_bool("ENVSETUP_TEST_BOOL_ON", &[], false));
    }

    #[test]
    fn test_env_bool_blank_uses_default() {
        env::set_var("ENVSETUP_TEST_BOOL_BLANK", "");
        assert!(!env_bool("ENVSETUP_TEST_BOOL_BLANK", &[], false));
        env::set_var("ENVSETUP_TEST_BOOL_SPACES", "  ");
        assert!(!env_bool("ENVSETUP_TEST_BOOL_SPACES", &[], false));
        assert!(env_bool("ENVSETUP_TEST_BOOL_SPACES", &[], true));
    }
}
