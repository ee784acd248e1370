//! `hoops weekly` -- weekly goals.

use anyhow::Result;
use chrono::Duration;

use hoops_core::catalog::NewWeeklyGoal;

use crate::cli::{WeeklyArgs, WeeklyCommands};
use crate::context::{RuntimeContext, parse_timestamp};
use crate::output::{output_json, output_table, pass, weekly_status};

/// Execute the `hoops weekly` command.
pub fn run(ctx: &RuntimeContext, args: &WeeklyArgs) -> Result<()> {
    let (engine, config) = ctx.open_engine()?;
    let now = ctx.now();

    match &args.command {
        WeeklyCommands::Progress {
            weekly_goal_id,
            progress,
            complete,
        } => {
            let user = ctx.require_user(&config)?;
            let view =
                engine.submit_weekly_progress(&user, *weekly_goal_id, *progress, *complete, now)?;
            if ctx.json {
                return output_json(&view);
            }
            if !ctx.quiet {
                println!(
                    "Weekly goal {}: {} ({}%)",
                    view.weekly_goal_id,
                    weekly_status(view.status),
                    view.progress
                );
                if view.points_awarded > 0 {
                    println!(
                        "  {} (total {})",
                        pass(&format!("+{} points", view.points_awarded)),
                        view.total_points
                    );
                }
            }
        }
        WeeklyCommands::List => {
            let user = ctx.require_user(&config)?;
            let entries = engine.list_weekly_goals(&user, now)?;
            if ctx.json {
                return output_json(&entries);
            }
            if entries.is_empty() {
                println!("No weekly goals.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = entries
                .iter()
                .map(|e| {
                    vec![
                        e.goal.id.to_string(),
                        weekly_status(e.status),
                        format!("{}%", e.progress),
                        e.goal.points.to_string(),
                        e.goal.end_at.format("%Y-%m-%d %H:%M").to_string(),
                        e.goal.criteria.clone(),
                    ]
                })
                .collect();
            output_table(&["ID", "STATUS", "PROGRESS", "POINTS", "ENDS", "CRITERIA"], &rows);
        }
        WeeklyCommands::Add {
            criteria,
            points,
            title,
            start,
            days,
        } => {
            let start_at = match start {
                Some(raw) => parse_timestamp(raw)?,
                None => now,
            };
            let goal = engine.create_weekly_goal(
                ctx.role,
                &NewWeeklyGoal {
                    title: title.clone(),
                    criteria: criteria.clone(),
                    points: *points,
                    start_at,
                    end_at: start_at + Duration::days(*days),
                },
                now,
            )?;
            if ctx.json {
                return output_json(&goal);
            }
            if !ctx.quiet {
                println!("Created weekly goal {} ({} points)", goal.id, goal.points);
            }
        }
        WeeklyCommands::Activate { weekly_goal_id } => {
            toggle(ctx, &engine, *weekly_goal_id, true)?;
        }
        WeeklyCommands::Deactivate { weekly_goal_id } => {
            toggle(ctx, &engine, *weekly_goal_id, false)?;
        }
    }
    Ok(())
}

fn toggle(
    ctx: &RuntimeContext,
    engine: &crate::context::Engine,
    weekly_goal_id: i64,
    active: bool,
) -> Result<()> {
    let goal = engine.set_weekly_goal_active(ctx.role, weekly_goal_id, active)?;
    if ctx.json {
        return output_json(&goal);
    }
    if !ctx.quiet {
        let state = if goal.is_active { "active" } else { "inactive" };
        println!("Weekly goal {} is now {state}", goal.id);
    }
    Ok(())
}
