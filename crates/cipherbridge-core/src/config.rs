use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::Profile;

/// Environment variable naming a config file for [`BridgeConfig::from_env`]
pub const CONFIG_ENV: &str = "CIPHERBRIDGE_CONFIG";

/// Bridge configuration (loaded from cipherbridge.toml)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Algorithm subset: "full" or "minimal" (default: full)
    pub profile: Profile,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when RUST_LOG is unset (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
        }
    }
}

impl BridgeConfig {
    /// Read `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!("config file not found: {}  (using defaults)", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Load from the file named by `CIPHERBRIDGE_CONFIG`, or defaults if unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
profile = "minimal"

[logging]
level = "cipherbridge_core=debug"
format = "json"
"#;
        let config: BridgeConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.profile, Profile::Minimal);
        assert_eq!(config.logging.level, "cipherbridge_core=debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_parse_defaults() {
        let config: BridgeConfig = toml::from_str("").unwrap();

        assert_eq!(config.profile, Profile::Full);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
[logging]
format = "json"
"#;
        let config: BridgeConfig = toml::from_str(toml_str).unwrap();

        // Overridden
        assert_eq!(config.logging.format, LogFormat::Json);
        // Defaults
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.profile, Profile::Full);
    }

    #[test]
    fn test_unknown_profile_rejected() {
        assert!(toml::from_str::<BridgeConfig>(r#"profile = "compact""#).is_err());
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = BridgeConfig {
            profile: Profile::Minimal,
            ..Default::default()
        };
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: BridgeConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, parsed);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "profile = \"minimal\"").unwrap();

        let config = BridgeConfig::load(file.path()).unwrap();
        assert_eq!(config.profile, Profile::Minimal);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = BridgeConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_load_invalid_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "profile = [").unwrap();

        let err = BridgeConfig::load(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));
    }
}
