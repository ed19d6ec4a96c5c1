//! Runtime configuration from the environment.
//!
//! | Variable                | Default         | Meaning                           |
//! |-------------------------|-----------------|-----------------------------------|
//! | `EDUREGISTER_DATA_DIR`  | `.eduregister`  | Directory holding the record file |
//! | `EDUREGISTER_PORT`      | `3000`          | HTTP port for `serve`             |
//! | `EDUREGISTER_GENDERS`   | (any)           | Comma-separated gender options    |
//! | `EDUREGISTER_COURSES`   | (any)           | Comma-separated course options    |
//! | `EDUREGISTER_YEARS`     | (any)           | Comma-separated year options      |
//! | `EDUREGISTER_LOG`       | `info`          | `tracing` filter (else `RUST_LOG`)|
//!
//! A `.env` file in the working directory is loaded first if present.

use std::env;
use std::path::PathBuf;

use crate::store::{FileStorage, RecordStore};
use crate::validation::FieldOptions;

/// Default data directory (relative to current dir).
pub const DEFAULT_DATA_DIR: &str = ".eduregister";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Settings shared by the CLI and the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub port: u16,
    pub options: FieldOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            port: DEFAULT_PORT,
            options: FieldOptions::default(),
        }
    }
}

impl Config {
    /// Read settings from the process environment (and `.env`).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns a variable's value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let data_dir = lookup("EDUREGISTER_DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let port = lookup("EDUREGISTER_PORT")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.port);

        let list = |key: &str| lookup(key).map(|v| split_list(&v)).unwrap_or_default();

        Self {
            data_dir,
            port,
            options: FieldOptions {
                genders: list("EDUREGISTER_GENDERS"),
                courses: list("EDUREGISTER_COURSES"),
                years: list("EDUREGISTER_YEARS"),
            },
        }
    }

    /// Open the file-backed record store in the data directory.
    pub fn open_store(&self) -> RecordStore {
        RecordStore::new(FileStorage::new(&self.data_dir))
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// The `tracing` filter directive: `EDUREGISTER_LOG`, then `RUST_LOG`, then `info`.
pub fn log_filter() -> String {
    env::var("EDUREGISTER_LOG")
        .or_else(|_| env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.data_dir, PathBuf::from(".eduregister"));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_reads_values() {
        let config = Config::from_lookup(lookup(&[
            ("EDUREGISTER_DATA_DIR", "/var/lib/eduregister"),
            ("EDUREGISTER_PORT", "8080"),
            ("EDUREGISTER_COURSES", "B.Tech, BCA ,,MBA"),
        ]));
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/eduregister"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.options.courses, vec!["B.Tech", "BCA", "MBA"]);
        assert!(config.options.genders.is_empty());
    }

    #[test]
    fn test_bad_port_falls_back() {
        let config = Config::from_lookup(lookup(&[("EDUREGISTER_PORT", "eighty")]));
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
