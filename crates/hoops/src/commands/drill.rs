//! `hoops drill` -- record a drill completion.

use anyhow::Result;

use crate::cli::DrillArgs;
use crate::context::RuntimeContext;
use crate::output::{output_json, pass};

/// Execute the `hoops drill` command.
pub fn run(ctx: &RuntimeContext, args: &DrillArgs) -> Result<()> {
    let (engine, config) = ctx.open_engine()?;
    let user = ctx.require_user(&config)?;

    let outcome = engine.record_drill_completion(
        &user,
        &args.drill_id,
        args.duration,
        args.rating,
        ctx.now(),
    )?;

    if ctx.json {
        return output_json(&outcome);
    }
    if ctx.quiet {
        return Ok(());
    }

    let b = &outcome.breakdown;
    let mut parts = vec![format!("{} base", b.base)];
    if b.perfect_bonus > 0 {
        parts.push(format!("{} perfect rating", b.perfect_bonus));
    }
    if b.streak_bonus > 0 {
        parts.push(format!("{} streak", b.streak_bonus));
    }
    println!(
        "Drill logged: {} ({})",
        pass(&format!("+{} points", outcome.points_awarded)),
        parts.join(" + ")
    );
    println!(
        "  Streak: {} day(s){}",
        outcome.new_streak,
        if outcome.streak_extended { ", extended" } else { "" }
    );
    println!("  Total points: {}", outcome.total_points);
    Ok(())
}
