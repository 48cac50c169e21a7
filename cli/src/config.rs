//! `mesa.toml` plus environment overrides.
//!
//! ```toml
//! bind = "0.0.0.0:8080"
//! snapshot = "data/mesa.json"
//! log_json = true
//! drain_timeout_secs = 10
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "mesa.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub bind: String,
    pub snapshot: PathBuf,
    pub log_json: bool,
    pub drain_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            snapshot: PathBuf::from("mesa-data.json"),
            log_json: false,
            drain_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Reads `path` if given (it must exist), else `mesa.toml` when present,
    /// else defaults. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// `MESA_BIND`, `MESA_SNAPSHOT` and `MESA_LOG_JSON` override the file.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(bind) = lookup("MESA_BIND") {
            self.bind = bind;
        }
        if let Some(snapshot) = lookup("MESA_SNAPSHOT") {
            self.snapshot = PathBuf::from(snapshot);
        }
        if let Some(flag) = lookup("MESA_LOG_JSON") {
            self.log_json = parse_flag(&flag)
                .with_context(|| format!("MESA_LOG_JSON must be true or false, got '{flag}'"))?;
        }
        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_file_values_with_defaults_for_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesa.toml");
        std::fs::write(&path, "bind = \"0.0.0.0:8080\"\nlog_json = true\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.bind, "0.0.0.0:8080");
        assert!(config.log_json);
        assert_eq!(config.snapshot, PathBuf::from("mesa-data.json"));
        assert_eq!(config.drain_timeout_secs, 10);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesa.toml");
        std::fs::write(&path, "port = 8080\n").unwrap();
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("MESA_BIND", "0.0.0.0:9000"),
            ("MESA_SNAPSHOT", "/var/lib/mesa.json"),
            ("MESA_LOG_JSON", "yes"),
        ]
        .into();
        let mut config = Config::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.snapshot, PathBuf::from("/var/lib/mesa.json"));
        assert!(config.log_json);

        let mut config = Config::default();
        let err = config.apply_env(|key| (key == "MESA_LOG_JSON").then(|| "maybe".to_string()));
        assert!(err.is_err());
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        assert!(Config::load(Some(Path::new("/definitely/not/here.toml"))).is_err());
    }
}
