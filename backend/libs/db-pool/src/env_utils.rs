//! Environment variable parsing helpers
//!
//! Missing or malformed values fall back to defaults instead of panicking.

use std::str::FromStr;

/// Parse an environment variable, falling back to `default` when it is
/// missing or does not parse.
pub fn parse_env_with_default<T: FromStr>(key: &str, default: T) -> T {
    parse_env_optional(key).unwrap_or(default)
}

/// Parse an environment variable, `None` when missing, blank or invalid.
pub fn parse_env_optional<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| v.trim().parse().ok())
}

/// Read a required string variable.
pub fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("{} environment variable not set", key))
}

/// Split a comma separated variable into trimmed, non-empty entries.
pub fn parse_env_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[serial_test::serial]
    fn test_parse_env_with_default() {
        let result: u32 = parse_env_with_default("DB_POOL_TEST_MISSING", 42);
        assert_eq!(result, 42);

        std::env::set_var("DB_POOL_TEST_PORT", " 8080 ");
        let result: u16 = parse_env_with_default("DB_POOL_TEST_PORT", 3000);
        assert_eq!(result, 8080);
        std::env::remove_var("DB_POOL_TEST_PORT");
    }

    #[test]
    #[serial_test::serial]
    fn test_parse_env_optional_rejects_garbage() {
        std::env::set_var("DB_POOL_TEST_OPT", "not-a-number");
        assert_eq!(parse_env_optional::<u32>("DB_POOL_TEST_OPT"), None);

        std::env::set_var("DB_POOL_TEST_OPT", "");
        assert_eq!(parse_env_optional::<u32>("DB_POOL_TEST_OPT"), None);
        std::env::remove_var("DB_POOL_TEST_OPT");
    }

    #[test]
    #[serial_test::serial]
    fn test_env_required() {
        assert!(env_required("DB_POOL_TEST_MISSING").is_err());

        std::env::set_var("DB_POOL_TEST_REQ", "value");
        assert_eq!(env_required("DB_POOL_TEST_REQ"), Ok("value".to_string()));
        std::env::remove_var("DB_POOL_TEST_REQ");
    }

    #[test]
    #[serial_test::serial]
    fn test_parse_env_list() {
        std::env::set_var("DB_POOL_TEST_LIST", "a, b,,c ");
        assert_eq!(parse_env_list("DB_POOL_TEST_LIST"), vec!["a", "b", "c"]);
        std::env::remove_var("DB_POOL_TEST_LIST");

        assert!(parse_env_list("DB_POOL_TEST_LIST").is_empty());
    }
}
