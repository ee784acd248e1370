//! `hoops levels` -- show level progression.

use anyhow::Result;

use hoops_engine::LevelProgression;

use crate::context::RuntimeContext;
use crate::output::{accent, muted, output_json, output_table, progress_status};

/// Execute the `hoops levels` command.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let (engine, config) = ctx.open_engine()?;
    let user = ctx.require_user(&config)?;
    let view = engine.level_progression(&user)?;

    if ctx.json {
        return output_json(&view);
    }
    print_progression(&view);
    Ok(())
}

fn print_progression(view: &LevelProgression) {
    let Some(current) = &view.current_level else {
        println!("The catalog has no levels yet.");
        return;
    };

    if view.ladder_complete {
        println!("Ladder complete! Final level: {}", accent(&current.name));
    } else {
        println!(
            "Level {}: {} ({}% to next)",
            current.level_number,
            accent(&current.name),
            view.progress_to_next
        );
        match &view.next_level {
            Some(next) => println!("  Next: level {} {}", next.level_number, next.name),
            None => println!("  {}", muted("Last level of the ladder")),
        }
    }
    println!();

    let rows: Vec<Vec<String>> = view
        .goal_progress
        .iter()
        .map(|g| {
            let label = if g.title.is_empty() {
                g.criteria.clone()
            } else {
                g.title.clone()
            };
            vec![
                g.goal_id.to_string(),
                format!("#{}{}", g.goal_number, if g.is_level_test { " (test)" } else { "" }),
                progress_status(g.status),
                format!("{}%", g.progress),
                g.points.to_string(),
                label,
            ]
        })
        .collect();
    output_table(&["ID", "GOAL", "STATUS", "PROGRESS", "POINTS", "TITLE"], &rows);

    println!();
    for level in &view.all_levels {
        println!(
            "  {:>2}. {:<12} {}",
            level.level_number,
            level.name,
            progress_status(level.status)
        );
    }
}
