//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$PROMPTSHELL_CONFIG` (environment variable)
//! 2. `~/.config/promptshell/config.toml` (Linux/macOS)
//!    `%APPDATA%\promptshell\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Autosave tuning.
    pub autosave: AutosaveConfig,
    /// Storage locations and attachment limits.
    pub storage: StorageConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Language override: "en" or "es". `None` follows the system locale.
    pub language: Option<String>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Autosave tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    /// Debounce delay in milliseconds before a scheduled save fires.
    pub delay_ms: u64,
}

/// Storage locations and attachment limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Override directory for the workspace record (default: platform data dir).
    pub data_dir: Option<PathBuf>,
    /// Largest attachment stored inline, in bytes (default: 10 MiB).
    pub inline_ceiling_bytes: u64,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            language: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self { delay_ms: 700 }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            inline_ceiling_bytes: 10 * 1024 * 1024, // 10 MiB
        }
    }
}

// ── Load / paths ────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    // 1. Environment variable override
    if let Ok(env_path) = std::env::var("PROMPTSHELL_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    // 2. Standard config directory
    dirs::config_dir().map(|d| d.join("promptshell").join("config.toml"))
}

/// Directory holding the durable workspace record.
pub fn data_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.storage.data_dir {
        return dir.clone();
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promptshell")
}

/// Path of the single durable workspace record.
pub fn storage_file_path(config: &Config) -> PathBuf {
    data_dir(config).join(crate::persist::STORAGE_FILE)
}

/// Return the cache directory for logs.
pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promptshell")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert!(cfg.general.language.is_none());
        assert_eq!(cfg.autosave.delay_ms, 700);
        assert_eq!(cfg.storage.inline_ceiling_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.autosave.delay_ms, cfg.autosave.delay_ms);
        assert_eq!(
            parsed.storage.inline_ceiling_bytes,
            cfg.storage.inline_ceiling_bytes
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[general]
language = "es"

[autosave]
delay_ms = 250
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.general.language.as_deref(), Some("es"));
        assert_eq!(cfg.autosave.delay_ms, 250);
        // Other fields use defaults
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.storage.inline_ceiling_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_storage_path_uses_override() {
        let mut cfg = Config::default();
        cfg.storage.data_dir = Some(PathBuf::from("/tmp/ps-test"));
        assert_eq!(
            storage_file_path(&cfg),
            PathBuf::from("/tmp/ps-test").join("workspace.json")
        );
    }
}
