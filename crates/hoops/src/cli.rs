//! Clap CLI definitions for the `hoops` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use hoops_core::enums::Role;

/// hoops -- basketball practice progression tracker.
///
/// Work through a ladder of levels, ten goals each, log daily drills to keep
/// a streak going, and chase weekly goals for bonus points.
#[derive(Parser, Debug)]
#[command(
    name = "hoops",
    about = "Basketball practice progression tracker",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to the .hoops directory (default: discover from the working directory).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// User id to act as.
    #[arg(long, global = true, env = "HOOPS_USER")]
    pub user: Option<String>,

    /// Caller role; catalog edits require admin.
    #[arg(long, global = true, env = "HOOPS_ROLE", default_value = "player")]
    pub role: Role,

    /// Clock override as an RFC 3339 timestamp.
    #[arg(long, global = true, env = "HOOPS_NOW")]
    pub now: Option<String>,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a .hoops directory here.
    Init(InitArgs),

    /// Create or show a player profile.
    Profile(ProfileArgs),

    /// Submit progress on a ladder goal.
    Goal(GoalArgs),

    /// Record a completed drill.
    Drill(DrillArgs),

    /// Weekly goals.
    Weekly(WeeklyArgs),

    /// Show level progression.
    Levels,

    /// Show points and streak statistics.
    Stats,

    /// Manage the level and goal catalog.
    Catalog(CatalogArgs),

    /// Generate shell completions.
    Completion(CompletionArgs),

    /// Print version information.
    Version,
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Do not load the built-in default ladder.
    #[arg(long)]
    pub no_seed: bool,

    /// Re-initialize even if a database already exists.
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// profile
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommands,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Create a profile for the current user.
    Create {
        /// Display name.
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Show the current user's profile.
    Show,
    /// List all profiles.
    List,
}

// ---------------------------------------------------------------------------
// goal
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct GoalArgs {
    #[command(subcommand)]
    pub command: GoalCommands,
}

#[derive(Subcommand, Debug)]
pub enum GoalCommands {
    /// Record progress (0-100) on a goal.
    Progress {
        /// Goal id.
        goal_id: i64,
        /// Progress percentage; clamped to 0-100.
        #[arg(allow_negative_numbers = true)]
        progress: i64,
        /// Mark the goal completed regardless of progress.
        #[arg(long)]
        complete: bool,
    },
}

// ---------------------------------------------------------------------------
// drill
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct DrillArgs {
    /// Drill identifier.
    pub drill_id: String,

    /// Time spent, in seconds.
    #[arg(long, allow_negative_numbers = true)]
    pub duration: i64,

    /// Self rating from 1 to 5.
    #[arg(long, allow_negative_numbers = true)]
    pub rating: Option<i64>,
}

// ---------------------------------------------------------------------------
// weekly
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct WeeklyArgs {
    #[command(subcommand)]
    pub command: WeeklyCommands,
}

#[derive(Subcommand, Debug)]
pub enum WeeklyCommands {
    /// Record progress (0-100) on a weekly goal.
    Progress {
        weekly_goal_id: i64,
        #[arg(allow_negative_numbers = true)]
        progress: i64,
        #[arg(long)]
        complete: bool,
    },
    /// List weekly goals with your progress.
    List,
    /// Create a weekly goal (admin).
    Add {
        /// What has to be done.
        criteria: String,
        /// Points awarded on completion.
        #[arg(long)]
        points: i64,
        #[arg(long, default_value = "")]
        title: String,
        /// Window start, RFC 3339 (default: now).
        #[arg(long)]
        start: Option<String>,
        /// Window length in days.
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
    /// Re-open a deactivated weekly goal (admin).
    Activate { weekly_goal_id: i64 },
    /// Stop a weekly goal from accepting progress (admin).
    Deactivate { weekly_goal_id: i64 },
}

// ---------------------------------------------------------------------------
// catalog
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// Import a ladder from a YAML file (admin).
    Import {
        /// Ladder file.
        file: PathBuf,
    },
    /// List levels and goals.
    List,
    /// Add a level (admin).
    LevelAdd {
        number: i32,
        tag: String,
        name: String,
        #[arg(long, default_value_t = 0)]
        points_required: i64,
    },
    /// Add a goal to a level (admin).
    GoalAdd {
        /// Level number.
        level: i32,
        /// Goal number (1-10; #10 is the level test).
        number: i32,
        criteria: String,
        #[arg(long)]
        points: i64,
        #[arg(long, default_value = "")]
        title: String,
    },
    /// Edit a goal (admin).
    GoalEdit {
        goal_id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        criteria: Option<String>,
        #[arg(long)]
        points: Option<i64>,
        #[arg(long)]
        level_test: Option<bool>,
    },
}

// ---------------------------------------------------------------------------
// completion
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct CompletionArgs {
    #[command(subcommand)]
    pub command: CompletionCommands,
}

#[derive(Subcommand, Debug)]
pub enum CompletionCommands {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn negative_progress_parses() {
        let cli = Cli::try_parse_from(["hoops", "goal", "progress", "3", "-10"]).unwrap();
        match cli.command {
            Some(Commands::Goal(GoalArgs {
                command: GoalCommands::Progress { progress, .. },
            })) => assert_eq!(progress, -10),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn role_parses_from_flag() {
        let cli = Cli::try_parse_from(["hoops", "--role", "admin", "levels"]).unwrap();
        assert_eq!(cli.global.role, Role::Admin);
        assert!(Cli::try_parse_from(["hoops", "--role", "owner", "levels"]).is_err());
    }
}
