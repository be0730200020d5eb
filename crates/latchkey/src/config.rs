//! Application-level configuration.
//!
//! Every field has a default, so an empty JSON object (or no config file
//! at all) is a valid configuration. Environment variables override the
//! file:
//!
//! | variable             | field       |
//! |----------------------|-------------|
//! | `LATCHKEY_STORE_DIR` | `store_dir` |
//! | `LATCHKEY_LOG`       | `log_filter`|

use std::path::{Path, PathBuf};

use latchkey_session::SessionConfig;
use serde::{Deserialize, Serialize};

use crate::LatchkeyError;

/// Environment variable overriding [`LatchkeyConfig::store_dir`].
pub const STORE_DIR_ENV: &str = "LATCHKEY_STORE_DIR";

/// Environment variable overriding [`LatchkeyConfig::log_filter`].
pub const LOG_ENV: &str = "LATCHKEY_LOG";

/// Top-level configuration for a Latchkey session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatchkeyConfig {
    /// Directory of the secure session store. `None` keeps the session in
    /// memory only.
    ///
    /// Default: `None`
    pub store_dir: Option<PathBuf>,

    /// File of the durable credential registry. `None` uses an in-memory
    /// registry that forgets sign-ups on restart.
    ///
    /// Default: `None`
    pub credentials_file: Option<PathBuf>,

    /// `tracing` filter directive used by [`logging::init`](crate::logging::init).
    ///
    /// Default: `"info"`
    pub log_filter: String,

    pub session: SessionConfig,
}

impl Default for LatchkeyConfig {
    fn default() -> Self {
        Self {
            store_dir: None,
            credentials_file: None,
            log_filter: "info".to_string(),
            session: SessionConfig::default(),
        }
    }
}

impl LatchkeyConfig {
    /// Reads a JSON config file. Missing fields take their defaults.
    ///
    /// # Errors
    /// - [`LatchkeyError::ConfigIo`]: the file can't be read
    /// - [`LatchkeyError::ConfigParse`]: the file isn't valid config JSON
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LatchkeyError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|source| LatchkeyError::ConfigIo {
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_str(&contents).map_err(|source| LatchkeyError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies overrides from the process environment.
    pub fn with_env(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its
    /// value. Empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(dir) = lookup(STORE_DIR_ENV) {
            self.store_dir = Some(PathBuf::from(dir));
        }
        if let Some(filter) = lookup(LOG_ENV) {
            self.log_filter = filter;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use latchkey_session::PersistencePolicy;

    use super::*;

    #[test]
    fn test_default_values() {
        let config = LatchkeyConfig::default();

        assert_eq!(config.store_dir, None);
        assert_eq!(config.credentials_file, None);
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.session.persistence, PersistencePolicy::BestEffort);
    }

    #[test]
    fn test_from_file_partial_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("latchkey.json");
        std::fs::write(
            &path,
            r#"{"store_dir":"/var/lib/app","session":{"persistence":"strict"}}"#,
        )
        .unwrap();

        let config = LatchkeyConfig::from_file(&path).unwrap();

        assert_eq!(config.store_dir, Some(PathBuf::from("/var/lib/app")));
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.session.persistence, PersistencePolicy::Strict);
    }

    #[test]
    fn test_from_file_missing_returns_config_io() {
        let tmp = tempfile::tempdir().unwrap();

        let result = LatchkeyConfig::from_file(tmp.path().join("nope.json"));

        assert!(matches!(result, Err(LatchkeyError::ConfigIo { .. })));
    }

    #[test]
    fn test_from_file_invalid_returns_config_parse() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("latchkey.json");
        std::fs::write(&path, r#"{"session":{"persistence":"sometimes"}}"#).unwrap();

        let result = LatchkeyConfig::from_file(&path);

        assert!(matches!(result, Err(LatchkeyError::ConfigParse { .. })));
    }

    #[test]
    fn test_with_overrides_replaces_fields() {
        let env = HashMap::from([
            (STORE_DIR_ENV, "/tmp/session"),
            (LOG_ENV, "latchkey_session=debug"),
        ]);

        let config = LatchkeyConfig::default()
            .with_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.store_dir, Some(PathBuf::from("/tmp/session")));
        assert_eq!(config.log_filter, "latchkey_session=debug");
    }

    #[test]
    fn test_with_overrides_ignores_empty_values() {
        let config = LatchkeyConfig::default().with_overrides(|_| Some("  ".to_string()));

        assert_eq!(config, LatchkeyConfig::default());
    }
}
