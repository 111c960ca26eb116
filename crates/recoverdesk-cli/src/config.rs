//! Runtime configuration loaded from environment variables.
//!
//! Every setting has a default so the binary runs with no configuration.

use std::path::PathBuf;

use recoverdesk_store::MockConfig;

#[derive(Debug, Clone)]
pub struct DeskConfig {
    /// SQLite file backing the key-value namespace.
    /// Env: `RECOVERDESK_DB`
    /// Default: `recoverdesk.db` in the platform data directory.
    pub db_path: Option<PathBuf>,

    /// Keep everything in process memory; nothing survives the run.
    /// Env: `RECOVERDESK_IN_MEMORY` (true/false)
    /// Default: `false`
    pub in_memory: bool,

    /// Mock data set parameters.
    /// Env: `RECOVERDESK_SEED`, `RECOVERDESK_CASES`
    /// Default: seed 42, 25 cases.
    pub mock: MockConfig,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            in_memory: false,
            mock: MockConfig::default(),
        }
    }
}

impl DeskConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("RECOVERDESK_DB") {
            if !path.trim().is_empty() {
                config.db_path = Some(PathBuf::from(path));
            }
        }

        if let Some(val) = lookup("RECOVERDESK_IN_MEMORY") {
            match parse_bool(&val) {
                Some(flag) => config.in_memory = flag,
                None => tracing::warn!(value = %val, "Invalid RECOVERDESK_IN_MEMORY, using default"),
            }
        }

        if let Some(val) = lookup("RECOVERDESK_SEED") {
            match val.trim().parse::<u64>() {
                Ok(seed) => config.mock.seed = seed,
                Err(e) => tracing::warn!(value = %val, error = %e, "Invalid RECOVERDESK_SEED, using default"),
            }
        }

        if let Some(val) = lookup("RECOVERDESK_CASES") {
            match val.trim().parse::<usize>() {
                Ok(n) => config.mock.case_count = n,
                Err(e) => tracing::warn!(value = %val, error = %e, "Invalid RECOVERDESK_CASES, using default"),
            }
        }

        config
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> DeskConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DeskConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = load(&[]);
        assert!(config.db_path.is_none());
        assert!(!config.in_memory);
        assert_eq!(config.mock.seed, 42);
        assert_eq!(config.mock.case_count, 25);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("RECOVERDESK_DB", "/tmp/desk.db"),
            ("RECOVERDESK_IN_MEMORY", "yes"),
            ("RECOVERDESK_SEED", "7"),
            ("RECOVERDESK_CASES", "40"),
        ]);
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/desk.db")));
        assert!(config.in_memory);
        assert_eq!(config.mock.seed, 7);
        assert_eq!(config.mock.case_count, 40);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = load(&[
            ("RECOVERDESK_IN_MEMORY", "maybe"),
            ("RECOVERDESK_SEED", "-1"),
            ("RECOVERDESK_CASES", "lots"),
            ("RECOVERDESK_DB", "  "),
        ]);
        assert!(config.db_path.is_none());
        assert!(!config.in_memory);
        assert_eq!(config.mock.seed, 42);
        assert_eq!(config.mock.case_count, 25);
    }
}
