//! Runtime context for command execution.
//!
//! [`RuntimeContext`] holds what every handler needs: the resolved `.hoops`
//! directory, the acting user and role, the clock, and output flags.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Utc};
use tracing::debug;

use hoops_config::{HOOPS_DIR_NAME, HoopsConfig, find_hoops_dir_or_error, load_config};
use hoops_core::enums::Role;
use hoops_engine::ProgressionEngine;
use hoops_storage::SqliteStore;

use crate::cli::GlobalArgs;

/// The engine type every command works with.
pub type Engine = ProgressionEngine<SqliteStore>;

/// Runtime context passed to every command handler.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Explicit `.hoops` directory from `--db`.
    pub db_dir: Option<PathBuf>,

    /// User id from `--user` / `HOOPS_USER`.
    pub user: Option<String>,

    pub role: Role,

    /// Clock override from `--now` / `HOOPS_NOW`.
    pub now: Option<DateTime<Utc>>,

    pub json: bool,
    pub verbose: bool,
    pub quiet: bool,
}

impl RuntimeContext {
    /// Builds the context from parsed global arguments.
    pub fn from_global_args(global: &GlobalArgs) -> Result<Self> {
        let now = global
            .now
            .as_deref()
            .map(parse_timestamp)
            .transpose()
            .context("invalid --now")?;

        Ok(Self {
            db_dir: global.db.clone(),
            user: global
                .user
                .as_ref()
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty()),
            role: global.role,
            now,
            json: global.json,
            verbose: global.verbose,
            quiet: global.quiet,
        })
    }

    /// The current instant, honoring the clock override.
    pub fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    /// Resolves the `.hoops` directory: `--db` first, then discovery.
    pub fn hoops_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.db_dir {
            let dir = if dir.ends_with(HOOPS_DIR_NAME) || !dir.join(HOOPS_DIR_NAME).is_dir() {
                dir.clone()
            } else {
                dir.join(HOOPS_DIR_NAME)
            };
            if !dir.is_dir() {
                bail!("database directory not found: {}", dir.display());
            }
            return Ok(dir);
        }
        let cwd = env::current_dir().context("failed to get current directory")?;
        Ok(find_hoops_dir_or_error(&cwd)?)
    }

    /// Loads the configuration for the resolved `.hoops` directory.
    pub fn config(&self) -> Result<HoopsConfig> {
        let dir = self.hoops_dir()?;
        load_config(&dir).with_context(|| format!("failed to load config from {}", dir.display()))
    }

    /// Opens the store and builds an engine configured from `config.yaml`.
    pub fn open_engine(&self) -> Result<(Engine, HoopsConfig)> {
        let dir = self.hoops_dir()?;
        let config = load_config(&dir)
            .with_context(|| format!("failed to load config from {}", dir.display()))?;
        let db_path = dir.join(&config.database);
        if !db_path.exists() {
            bail!(
                "no database at {} (run 'hoops init' first)",
                db_path.display()
            );
        }
        debug!(path = %db_path.display(), "opening database");
        let store = SqliteStore::open(&db_path)
            .with_context(|| format!("failed to open database: {}", db_path.display()))?;
        let engine = ProgressionEngine::new(store)
            .with_rules(config.points)
            .with_utc_offset_minutes(config.timezone_offset_minutes)?;
        Ok((engine, config))
    }

    /// The acting user: `--user` / `HOOPS_USER`, then the config default.
    pub fn require_user(&self, config: &HoopsConfig) -> Result<String> {
        self.user
            .clone()
            .or_else(|| config.user.clone())
            .ok_or_else(|| anyhow!("no user specified (use --user or set HOOPS_USER)"))
    }
}

/// Parses an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("expected an RFC 3339 timestamp, got {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn global() -> GlobalArgs {
        GlobalArgs {
            db: None,
            user: Some("  kid ".into()),
            role: Role::Coach,
            now: Some("2024-03-01T18:30:00-05:00".into()),
            json: false,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn clock_override_is_normalized_to_utc() {
        let ctx = RuntimeContext::from_global_args(&global()).unwrap();
        assert_eq!(ctx.now(), Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap());
        assert_eq!(ctx.user.as_deref(), Some("kid"));
        assert_eq!(ctx.role, Role::Coach);
    }

    #[test]
    fn bad_clock_override_rejected() {
        let mut args = global();
        args.now = Some("yesterday".into());
        assert!(RuntimeContext::from_global_args(&args).is_err());
    }

    #[test]
    fn user_falls_back_to_config() {
        let mut args = global();
        args.user = Some("   ".into());
        let ctx = RuntimeContext::from_global_args(&args).unwrap();
        let mut config = HoopsConfig::default();
        assert!(ctx.require_user(&config).is_err());
        config.user = Some("sam".into());
        assert_eq!(ctx.require_user(&config).unwrap(), "sam");
    }

    #[test]
    fn explicit_db_dir_must_exist() {
        let tmp = tempfile::tempdir().unwrap();
        let mut args = global();
        args.db = Some(tmp.path().join("missing"));
        let ctx = RuntimeContext::from_global_args(&args).unwrap();
        assert!(ctx.hoops_dir().is_err());

        std::fs::create_dir(tmp.path().join(".hoops")).unwrap();
        args.db = Some(tmp.path().to_path_buf());
        let ctx = RuntimeContext::from_global_args(&args).unwrap();
        assert_eq!(ctx.hoops_dir().unwrap(), tmp.path().join(".hoops"));
    }
}
