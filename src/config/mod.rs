//! Server configuration, read from environment variables.
//!
//! - `PERSON_INFO_DATA_FILE` -- backing file path (default: next to the executable)
//! - `PERSON_INFO_LOG_DIR` -- also write rolling log files here
//! - `PERSON_INFO_TRANSLITERATION` -- `0`/`false`/`off`/`no` disables pinyin matching

pub mod paths;

use std::path::PathBuf;

use tracing::warn;

pub const DATA_FILE_ENV: &str = "PERSON_INFO_DATA_FILE";
pub const LOG_DIR_ENV: &str = "PERSON_INFO_LOG_DIR";
pub const TRANSLITERATION_ENV: &str = "PERSON_INFO_TRANSLITERATION";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub data_file: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub transliteration: bool,
    /// Problems found while resolving; logged by [`ServerConfig::report_warnings`]
    /// once a subscriber exists.
    pub warnings: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_file: paths::default_data_file(),
            log_dir: None,
            transliteration: true,
            warnings: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Resolve from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve using `lookup` in place of the environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_file = non_empty(DATA_FILE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(paths::default_data_file);
        let log_dir = non_empty(LOG_DIR_ENV).map(PathBuf::from);
        let mut warnings = Vec::new();
        let transliteration = match non_empty(TRANSLITERATION_ENV) {
            Some(v) => parse_flag(&v).unwrap_or_else(|| {
                warnings.push(format!(
                    "Ignoring {}={:?}; expected on/off",
                    TRANSLITERATION_ENV, v
                ));
                true
            }),
            None => true,
        };

        Self {
            data_file,
            log_dir,
            transliteration,
            warnings,
        }
    }

    /// Log anything noticed while resolving. Call after the logger is up.
    pub fn report_warnings(&self) {
        for warning in &self.warnings {
            warn!("[Config] {}", warning);
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
