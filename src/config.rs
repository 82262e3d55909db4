use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LmqError;

/// Server configuration, loaded from a single JSON file.
///
/// Every field has a default so a minimal (even empty) config file works.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log at debug level when true.
    pub debug: bool,
    /// Addresses the HTTP server listens on. The same routes are served on
    /// all of them.
    pub bind_addresses: Vec<String>,
    /// Client IPs allowed to talk to the server. Empty disables the check.
    pub ip_whitelist: Vec<String>,
    /// Base directory for `file:` message payloads.
    pub file_base_path: String,
    /// MySQL connection URL for `mysql:` message payloads. Empty disables
    /// MySQL-backed payloads.
    pub mysql_url: String,
    /// Initial capacity of a new queue; also the chunk size queues grow by.
    pub queue_init_capacity: usize,
    /// Directory the recovery journal files live in.
    pub recovery_dir: String,
    /// Number of records after which the journal rotates to a new file.
    pub recovery_file_lines: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            bind_addresses: vec!["0.0.0.0:8080".to_string()],
            ip_whitelist: Vec::new(),
            file_base_path: String::new(),
            mysql_url: String::new(),
            queue_init_capacity: 1000,
            recovery_dir: "recovery".to_string(),
            recovery_file_lines: 10_000,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LmqError> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: Config = serde_json::from_str(r#"{"debug": true}"#).unwrap();

        assert!(config.debug);
        assert_eq!(config.bind_addresses, vec!["0.0.0.0:8080".to_string()]);
        assert_eq!(config.queue_init_capacity, 1000);
        assert_eq!(config.recovery_file_lines, 10_000);
        assert!(config.ip_whitelist.is_empty());
    }

    #[test]
    fn empty_object_is_a_valid_config() {
        let config: Config = serde_json::from_str("{}").unwrap();

        assert!(!config.debug);
        assert_eq!(config.recovery_dir, "recovery");
    }
}
