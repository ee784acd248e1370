//! `hoops catalog` -- list and edit the level/goal catalog.
//!
//! Every write requires `--role admin`; the engine enforces it.

use std::fs;

use anyhow::{Context, Result, anyhow};

use hoops_core::catalog::{GoalUpdates, LadderDefinition, NewGoal, NewLevel};

use crate::cli::{CatalogArgs, CatalogCommands};
use crate::context::RuntimeContext;
use crate::output::{accent, muted, output_json};

/// Execute the `hoops catalog` command.
pub fn run(ctx: &RuntimeContext, args: &CatalogArgs) -> Result<()> {
    let (engine, _config) = ctx.open_engine()?;
    let now = ctx.now();

    match &args.command {
        CatalogCommands::Import { file } => {
            let text = fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let ladder = LadderDefinition::from_yaml(&text)
                .with_context(|| format!("failed to parse {}", file.display()))?;
            let summary = engine.import_ladder(ctx.role, &ladder, now)?;
            if ctx.json {
                return output_json(&summary);
            }
            if !ctx.quiet {
                println!(
                    "Imported {} level(s) and {} goal(s); {} existing goal(s) skipped",
                    summary.levels_created, summary.goals_created, summary.goals_skipped
                );
            }
        }
        CatalogCommands::List => {
            let catalog = engine.catalog()?;
            if ctx.json {
                return output_json(&catalog);
            }
            if catalog.is_empty() {
                println!("The catalog is empty.");
            }
            for entry in &catalog {
                println!(
                    "Level {} {} [{}]",
                    entry.level.level_number,
                    accent(&entry.level.name),
                    entry.level.tag
                );
                for goal in &entry.goals {
                    let test = if goal.is_level_test { " (level test)" } else { "" };
                    println!(
                        "  {:>4}  #{:<2} {:>4} pts  {}{}",
                        goal.id,
                        goal.goal_number,
                        goal.points,
                        goal.criteria,
                        muted(test)
                    );
                }
            }
        }
        CatalogCommands::LevelAdd {
            number,
            tag,
            name,
            points_required,
        } => {
            let level = engine.create_level(
                ctx.role,
                &NewLevel {
                    level_number: *number,
                    tag: tag.clone(),
                    name: name.clone(),
                    points_required: *points_required,
                },
                now,
            )?;
            if ctx.json {
                return output_json(&level);
            }
            if !ctx.quiet {
                println!("Created level {} ({})", level.level_number, level.tag);
            }
        }
        CatalogCommands::GoalAdd {
            level,
            number,
            criteria,
            points,
            title,
        } => {
            let level_id = engine
                .catalog()?
                .into_iter()
                .find(|l| l.level.level_number == *level)
                .map(|l| l.level.id)
                .ok_or_else(|| anyhow!("level {level} not found"))?;
            let goal = engine.create_goal(
                ctx.role,
                &NewGoal {
                    level_id,
                    goal_number: *number,
                    title: title.clone(),
                    criteria: criteria.clone(),
                    points: *points,
                    is_level_test: *number == hoops_core::catalog::LEVEL_TEST_GOAL_NUMBER,
                },
                now,
            )?;
            if ctx.json {
                return output_json(&goal);
            }
            if !ctx.quiet {
                println!("Created goal {} (#{} in level {level})", goal.id, goal.goal_number);
            }
        }
        CatalogCommands::GoalEdit {
            goal_id,
            title,
            criteria,
            points,
            level_test,
        } => {
            let updates = GoalUpdates {
                title: title.clone(),
                criteria: criteria.clone(),
                points: *points,
                is_level_test: *level_test,
            };
            let goal = engine.update_goal(ctx.role, *goal_id, &updates, now)?;
            if ctx.json {
                return output_json(&goal);
            }
            if !ctx.quiet {
                println!("Updated goal {} (version {})", goal.id, goal.version);
            }
        }
    }
    Ok(())
}
