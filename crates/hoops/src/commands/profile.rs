//! `hoops profile` -- create and show player profiles.

use anyhow::Result;

use hoops_core::profile::PlayerProfile;

use crate::cli::{ProfileArgs, ProfileCommands};
use crate::context::RuntimeContext;
use crate::output::{accent, muted, output_json, output_table};

/// Execute the `hoops profile` command.
pub fn run(ctx: &RuntimeContext, args: &ProfileArgs) -> Result<()> {
    let (engine, config) = ctx.open_engine()?;

    match &args.command {
        ProfileCommands::Create { name } => {
            let user = ctx.require_user(&config)?;
            let profile = engine.create_profile(&user, name, ctx.now())?;
            if ctx.json {
                return output_json(&profile);
            }
            if !ctx.quiet {
                println!("Created profile {}", accent(&profile.user_id));
                if !profile.current_level_tag.is_empty() {
                    println!("  Starting level: {}", profile.current_level_tag);
                }
            }
        }
        ProfileCommands::Show => {
            let user = ctx.require_user(&config)?;
            let profile = engine.get_profile(&user)?;
            if ctx.json {
                return output_json(&profile);
            }
            print_profile(&profile);
        }
        ProfileCommands::List => {
            let profiles = engine.list_profiles()?;
            if ctx.json {
                return output_json(&profiles);
            }
            if profiles.is_empty() {
                println!("No profiles yet.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = profiles
                .iter()
                .map(|p| {
                    vec![
                        p.user_id.clone(),
                        p.display_name.clone(),
                        p.current_level_tag.clone(),
                        p.total_points.to_string(),
                        p.current_streak.to_string(),
                    ]
                })
                .collect();
            output_table(&["USER", "NAME", "LEVEL", "POINTS", "STREAK"], &rows);
        }
    }
    Ok(())
}

fn print_profile(p: &PlayerProfile) {
    let name = if p.display_name.is_empty() {
        String::new()
    } else {
        format!(" ({})", p.display_name)
    };
    println!("{}{}", accent(&p.user_id), name);
    println!("  Level:   {}", p.current_level_tag);
    println!("  Points:  {}", p.total_points);
    println!(
        "  Streak:  {} day(s), longest {}",
        p.current_streak, p.longest_streak
    );
    match p.last_active_date {
        Some(d) => println!("  Last active: {d}"),
        None => println!("  {}", muted("No drills logged yet")),
    }
}
