//! `hoops` -- basketball practice progression tracker CLI.
//!
//! Parses arguments with clap, resolves the runtime context, installs
//! logging, and dispatches to command handlers.

mod cli;
mod commands;
mod context;
mod output;

use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use context::RuntimeContext;

/// Tracks whether a Ctrl+C has already been received.
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Filter used for `-v`.
const VERBOSE_FILTER: &str = "hoops=debug,hoops_engine=debug,hoops_storage=debug,hoops_config=debug";

fn main() {
    // First Ctrl+C exits cleanly; a second forces exit.
    let _ = ctrlc::set_handler(|| {
        if CTRLC_RECEIVED.swap(true, Ordering::SeqCst) {
            std::process::exit(1);
        }
        std::process::exit(130);
    });

    let cli = Cli::parse();

    let ctx = match RuntimeContext::from_global_args(&cli.global) {
        Ok(ctx) => ctx,
        Err(e) => {
            output::print_error(&e, cli.global.json);
            std::process::exit(1);
        }
    };

    init_logging(&ctx);

    let result = match cli.command {
        Some(Commands::Init(args)) => commands::init::run(&ctx, &args),
        Some(Commands::Profile(args)) => commands::profile::run(&ctx, &args),
        Some(Commands::Goal(args)) => commands::goal::run(&ctx, &args),
        Some(Commands::Drill(args)) => commands::drill::run(&ctx, &args),
        Some(Commands::Weekly(args)) => commands::weekly::run(&ctx, &args),
        Some(Commands::Levels) => commands::levels::run(&ctx),
        Some(Commands::Stats) => commands::stats::run(&ctx),
        Some(Commands::Catalog(args)) => commands::catalog::run(&ctx, &args),
        Some(Commands::Completion(args)) => commands::completion::run(&ctx, &args),
        Some(Commands::Version) => commands::version::run(&ctx),
        None => {
            use clap::CommandFactory;
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        output::print_error(&e, ctx.json);
        std::process::exit(1);
    }
}

/// Installs the stderr subscriber.
///
/// Precedence: `-v`, then `-q`, then `HOOPS_LOG`, then the config's
/// `log_level`, then `warn`.
fn init_logging(ctx: &RuntimeContext) {
    let filter = if ctx.verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if ctx.quiet {
        EnvFilter::new("error")
    } else if let Ok(filter) = EnvFilter::try_from_env("HOOPS_LOG") {
        filter
    } else {
        let level = ctx
            .config()
            .map(|c| c.log_level)
            .unwrap_or_else(|_| "warn".to_string());
        EnvFilter::new(level)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
