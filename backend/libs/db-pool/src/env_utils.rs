//! Environment variable parsing helpers
//!
//! Missing or unparsable values fall back to defaults instead of panicking.

use std::str::FromStr;

/// Parse an environment variable with a default fallback
///
/// # Example
/// ```ignore
/// let acquire_timeout: u64 = parse_env_with_default("DB_ACQUIRE_TIMEOUT_SECS", 10);
/// ```
pub fn parse_env_with_default<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parse a boolean flag, accepting `true/false`, `1/0`, `yes/no`, `on/off`
pub fn parse_env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

/// Read a required environment variable
pub fn require_env(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("{} environment variable not set", key))
}
