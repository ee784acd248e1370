//! `hoops init` -- create a `.hoops` directory with a database and config.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use hoops_config::config::CONFIG_FILE_NAME;
use hoops_config::{HoopsConfig, ensure_hoops_dir, load_config, save_config};
use hoops_core::catalog::LadderDefinition;
use hoops_core::enums::Role;
use hoops_engine::{ImportSummary, ProgressionEngine};
use hoops_storage::SqliteStore;

use crate::cli::InitArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Ladder seeded unless `--no-seed` is given.
pub const DEFAULT_LADDER: &str = include_str!("../../assets/default_ladder.yaml");

const GITIGNORE_CONTENT: &str = "# hoops database files
*.db
*.db-journal
*.db-wal
*.db-shm
";

#[derive(Serialize)]
struct InitReport {
    directory: String,
    database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    seeded: Option<ImportSummary>,
}

/// Execute the `hoops init` command.
pub fn run(ctx: &RuntimeContext, args: &InitArgs) -> Result<()> {
    let base = match &ctx.db_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to get current directory")?,
    };
    let hoops_dir = ensure_hoops_dir(&base)
        .with_context(|| format!("failed to create .hoops under {}", base.display()))?;

    let config = if hoops_dir.join(CONFIG_FILE_NAME).exists() {
        load_config(&hoops_dir)?
    } else {
        let config = HoopsConfig::default();
        save_config(&hoops_dir, &config)?;
        config
    };

    let db_path = hoops_dir.join(&config.database);
    if db_path.exists() {
        if !args.force {
            bail!(
                "found existing database at {}\n\n\
                 This directory is already initialized. Use --force to start over \
                 (all progress will be lost).",
                db_path.display()
            );
        }
        remove_database(&db_path)?;
    }

    let gitignore = hoops_dir.join(".gitignore");
    if !gitignore.exists() {
        fs::write(&gitignore, GITIGNORE_CONTENT)
            .with_context(|| format!("failed to create {}", gitignore.display()))?;
    }

    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("failed to create database: {}", db_path.display()))?;
    let engine = ProgressionEngine::new(store);

    let seeded = if args.no_seed {
        None
    } else {
        let ladder =
            LadderDefinition::from_yaml(DEFAULT_LADDER).context("built-in ladder is invalid")?;
        Some(engine.import_ladder(Role::Admin, &ladder, ctx.now())?)
    };

    let report = InitReport {
        directory: hoops_dir.display().to_string(),
        database: db_path.display().to_string(),
        seeded,
    };

    if ctx.json {
        return output_json(&report);
    }
    if !ctx.quiet {
        println!("hoops initialized in {}", report.directory);
        if let Some(s) = &report.seeded {
            println!(
                "  Loaded default ladder: {} levels, {} goals",
                s.levels_created, s.goals_created
            );
        }
        println!();
        println!("Next: hoops --user <id> profile create --name <name>");
    }
    Ok(())
}

/// Deletes a database file and its WAL side files.
fn remove_database(db_path: &Path) -> Result<()> {
    for suffix in ["", "-wal", "-shm", "-journal"] {
        let path = db_path.with_file_name(format!(
            "{}{suffix}",
            db_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        ));
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        }
    }
    Ok(())
}
