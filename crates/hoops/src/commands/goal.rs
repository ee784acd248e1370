//! `hoops goal` -- submit progress on ladder goals.

use anyhow::Result;

use hoops_engine::UserGoalView;

use crate::cli::{GoalArgs, GoalCommands};
use crate::context::RuntimeContext;
use crate::output::{accent, output_json, pass, progress_status};

/// Execute the `hoops goal` command.
pub fn run(ctx: &RuntimeContext, args: &GoalArgs) -> Result<()> {
    let (engine, config) = ctx.open_engine()?;
    let user = ctx.require_user(&config)?;

    match &args.command {
        GoalCommands::Progress {
            goal_id,
            progress,
            complete,
        } => {
            let view = engine
                .submit_goal_progress(&user, *goal_id, *progress, *complete, ctx.now())?;
            if ctx.json {
                return output_json(&view);
            }
            if !ctx.quiet {
                print_view(&view);
            }
        }
    }
    Ok(())
}

fn print_view(view: &UserGoalView) {
    println!(
        "Goal {}: {} ({}%)",
        view.goal_id,
        progress_status(view.status),
        view.progress
    );
    if view.points_awarded > 0 {
        println!(
            "  {} (total {})",
            pass(&format!("+{} points", view.points_awarded)),
            view.total_points
        );
    }
    if let Some(cascade) = &view.cascade {
        if cascade.newly_completed {
            println!("  Level {} complete!", cascade.level_number);
            match &cascade.unlocked_level {
                Some(next) => println!("  Unlocked level {}: {}", next.level_number, accent(&next.name)),
                None => println!("  You finished the whole ladder."),
            }
        } else {
            println!("  Level {}: {}% of goals done", cascade.level_number, cascade.progress);
        }
    }
}
