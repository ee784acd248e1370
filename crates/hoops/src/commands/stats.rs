//! `hoops stats` -- points and streak statistics.

use anyhow::Result;

use crate::context::RuntimeContext;
use crate::output::{accent, output_json};

/// Execute the `hoops stats` command.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let (engine, config) = ctx.open_engine()?;
    let user = ctx.require_user(&config)?;
    let stats = engine.stats(&user, ctx.now())?;

    if ctx.json {
        return output_json(&stats);
    }

    println!("{}", accent(&stats.user_id));
    println!("  Total points:      {}", stats.total_points);
    println!("  Points this week:  {}", stats.points_this_week);
    println!("  Drills this week:  {}", stats.drills_this_week);
    println!(
        "  Streak:            {} (longest {})",
        stats.current_streak, stats.longest_streak
    );
    if !stats.current_level_tag.is_empty() {
        println!("  Level:             {}", stats.current_level_tag);
    }
    Ok(())
}
