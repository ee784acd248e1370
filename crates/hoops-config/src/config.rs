//! Configuration types and loading.
//!
//! The main entry point is [`HoopsConfig`], which represents the contents of
//! `.hoops/config.yaml`. Values are layered with figment: built-in defaults,
//! then the YAML file, then `HOOPS_*` environment variables.

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hoops_core::scoring::PointRules;

/// File name of the configuration inside `.hoops/`.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Prefix for environment overrides, e.g. `HOOPS_POINTS__STREAK_BONUS=25`.
pub const ENV_PREFIX: &str = "HOOPS_";

/// Env keys under [`ENV_PREFIX`] that belong to the CLI, not to the config.
const CLI_ENV_KEYS: &[&str] = &["dir", "log", "now", "role"];

/// Largest accepted UTC offset (14 hours), in minutes.
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("failed to access config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// The configuration could not be serialized to YAML.
    #[error("failed to write config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// A layer (file or environment) could not be merged.
    #[error("failed to load configuration: {0}")]
    ExtractError(#[from] Box<figment::Error>),

    /// The `.hoops/` directory was not found.
    #[error("no .hoops directory found (run 'hoops init' first)")]
    HoopsDirNotFound,

    /// A configuration value was invalid.
    #[error("invalid configuration value for key '{key}': {reason}")]
    InvalidValue {
        /// The configuration key that had an invalid value.
        key: String,
        /// A description of why the value is invalid.
        reason: String,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::ExtractError(Box::new(e))
    }
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Main config struct
// ---------------------------------------------------------------------------

/// The full hoops configuration, corresponding to `.hoops/config.yaml`.
///
/// All fields use `serde` defaults so a partially specified file still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoopsConfig {
    /// Database file name, relative to the `.hoops/` directory.
    #[serde(default = "default_database")]
    pub database: String,

    /// Fixed UTC offset that defines local midnight for streak days.
    #[serde(default)]
    pub timezone_offset_minutes: i32,

    /// Point amounts for drill completions.
    #[serde(default)]
    pub points: PointRules,

    /// Default log filter when neither `-v` nor `HOOPS_LOG` is given.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Default user id when no `--user` is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Default for HoopsConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            timezone_offset_minutes: 0,
            points: PointRules::default(),
            log_level: default_log_level(),
            user: None,
        }
    }
}

fn default_database() -> String {
    "hoops.db".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl HoopsConfig {
    /// Checks value ranges after all layers are merged.
    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(invalid("database", "cannot be empty"));
        }
        if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&self.timezone_offset_minutes) {
            return Err(invalid(
                "timezone_offset_minutes",
                format!(
                    "{} is outside -{MAX_OFFSET_MINUTES}..={MAX_OFFSET_MINUTES}",
                    self.timezone_offset_minutes
                ),
            ));
        }
        for (key, value) in [
            ("points.drill_base", self.points.drill_base),
            ("points.perfect_rating_bonus", self.points.perfect_rating_bonus),
            ("points.streak_bonus", self.points.streak_bonus),
        ] {
            if value < 0 {
                return Err(invalid(key, format!("{value} is negative")));
            }
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(invalid(
                "log_level",
                format!("{:?} is not one of {}", self.log_level, LOG_LEVELS.join(", ")),
            ));
        }
        if let Some(user) = &self.user {
            if user.trim().is_empty() {
                return Err(invalid("user", "cannot be blank"));
            }
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

fn file_layers(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(HoopsConfig::default()))
        .merge(Yaml::file(path))
}

/// Loads configuration for the given `.hoops/` directory.
///
/// Precedence (lowest to highest): defaults, `config.yaml`, `HOOPS_*` env.
/// A missing file is not an error.
pub fn load_config(hoops_dir: &Path) -> Result<HoopsConfig> {
    let config: HoopsConfig = file_layers(&hoops_dir.join(CONFIG_FILE_NAME))
        .merge(Env::prefixed(ENV_PREFIX).ignore(CLI_ENV_KEYS).split("__"))
        .extract()?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration from a specific file, without environment overrides.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<HoopsConfig> {
    let config: HoopsConfig = file_layers(path.as_ref()).extract()?;
    config.validate()?;
    Ok(config)
}

/// Saves configuration to `config.yaml` inside the given `.hoops/` directory.
///
/// The directory is created if it does not exist.
pub fn save_config(hoops_dir: &Path, config: &HoopsConfig) -> Result<()> {
    std::fs::create_dir_all(hoops_dir)?;
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(hoops_dir.join(CONFIG_FILE_NAME), yaml)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_is_valid() {
        let cfg = HoopsConfig::default();
        assert_eq!(cfg.database, "hoops.db");
        assert_eq!(cfg.points, PointRules::default());
        assert_eq!(cfg.log_level, "warn");
        cfg.validate().unwrap();
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_from_file(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(cfg, HoopsConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "timezone_offset_minutes: -300\npoints:\n  streak_bonus: 25\n",
        )
        .unwrap();
        let cfg = load_from_file(&path).unwrap();
        assert_eq!(cfg.timezone_offset_minutes, -300);
        assert_eq!(cfg.points.streak_bonus, 25);
        assert_eq!(cfg.points.drill_base, 10);
        assert_eq!(cfg.database, "hoops.db");
    }

    #[test]
    fn roundtrip_config() {
        let dir = tempfile::tempdir().unwrap();
        let hoops_dir = dir.path().join(".hoops");
        let cfg = HoopsConfig {
            user: Some("kid-1".into()),
            log_level: "info".into(),
            ..HoopsConfig::default()
        };
        save_config(&hoops_dir, &cfg).unwrap();
        let loaded = load_from_file(hoops_dir.join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn rejects_out_of_range_offset() {
        let cfg = HoopsConfig {
            timezone_offset_minutes: 900,
            ..HoopsConfig::default()
        };
        match cfg.validate().unwrap_err() {
            ConfigError::InvalidValue { key, .. } => assert_eq!(key, "timezone_offset_minutes"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_negative_points_and_unknown_level() {
        let mut cfg = HoopsConfig::default();
        cfg.points.perfect_rating_bonus = -1;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "points.perfect_rating_bonus"
        ));

        let cfg = HoopsConfig {
            log_level: "loud".into(),
            ..HoopsConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_file_is_extract_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "timezone_offset_minutes: [not, a, number]\n").unwrap();
        assert!(matches!(
            load_from_file(&path),
            Err(ConfigError::ExtractError(_))
        ));
    }
}
