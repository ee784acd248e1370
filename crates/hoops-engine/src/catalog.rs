//! Catalog administration.
//!
//! Levels, goals, and weekly goals are versioned rows in the same store as
//! user progress. Every edit runs in a transaction, is restricted to roles
//! that may edit the catalog, and bumps the store-wide catalog version.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use hoops_core::catalog::{
    Goal, GoalUpdates, LadderDefinition, Level, NewGoal, NewLevel, NewWeeklyGoal, WeeklyGoal,
};
use hoops_core::enums::Role;
use hoops_core::validation::{
    validate_goal, validate_new_goal, validate_new_level, validate_new_weekly_goal,
};
use hoops_storage::{Storage, Transaction};

use crate::error::{EngineError, Result};
use crate::tx::in_transaction;
use crate::ProgressionEngine;

/// Counts from a ladder import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub levels_created: usize,
    pub levels_reused: usize,
    pub goals_created: usize,
    pub goals_skipped: usize,
    pub catalog_version: i64,
}

/// A level with its goals, for catalog listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogLevel {
    #[serde(flatten)]
    pub level: Level,
    pub goals: Vec<Goal>,
}

fn authorize(role: Role) -> Result<()> {
    if role.can_edit_catalog() {
        Ok(())
    } else {
        Err(EngineError::Forbidden {
            role,
            action: "edit the catalog",
        })
    }
}

/// Creates a goal after checking it against the level's existing goals.
///
/// A level that any user has completed is closed to new goals: completion is
/// terminal and must keep covering every goal in the level.
fn insert_goal(tx: &dyn Transaction, goal: &NewGoal, now: DateTime<Utc>) -> Result<Goal> {
    let level = tx.get_level(goal.level_id)?;
    let siblings = tx.list_goals_for_level(goal.level_id)?;
    validate_new_goal(goal, &siblings)?;
    let completed = tx.count_completed_user_levels(level.id)?;
    if completed > 0 {
        return Err(EngineError::validation(format!(
            "level {} is already completed by {completed} player(s); it cannot take new goals",
            level.level_number
        )));
    }
    Ok(tx.create_goal(goal, now)?)
}

impl<S: Storage> ProgressionEngine<S> {
    pub fn create_level(&self, role: Role, level: &NewLevel, now: DateTime<Utc>) -> Result<Level> {
        authorize(role)?;
        validate_new_level(level)?;
        let created = in_transaction(&self.store, |tx| {
            let created = tx.create_level(level, now)?;
            tx.bump_catalog_version()?;
            Ok(created)
        })?;
        info!(level = created.level_number, tag = %created.tag, "level created");
        Ok(created)
    }

    pub fn create_goal(&self, role: Role, goal: &NewGoal, now: DateTime<Utc>) -> Result<Goal> {
        authorize(role)?;
        let created = in_transaction(&self.store, |tx| {
            let created = insert_goal(tx, goal, now)?;
            tx.bump_catalog_version()?;
            Ok(created)
        })?;
        info!(goal_id = created.id, level_id = created.level_id, "goal created");
        Ok(created)
    }

    /// Applies field updates to a goal, bumping its version.
    ///
    /// The edited goal is validated as a whole, so goal #10 can never lose
    /// its level-test flag.
    pub fn update_goal(
        &self,
        role: Role,
        goal_id: i64,
        updates: &GoalUpdates,
        now: DateTime<Utc>,
    ) -> Result<Goal> {
        authorize(role)?;
        if updates.is_empty() {
            return Err(EngineError::validation("no updates specified"));
        }
        let updated = in_transaction(&self.store, |tx| {
            let current = tx.get_goal(goal_id)?;
            let edited = updates.apply_to(&current);
            validate_goal(&edited)?;
            let updated = tx.update_goal(&edited, now)?;
            tx.bump_catalog_version()?;
            Ok(updated)
        })?;
        info!(goal_id, version = updated.version, "goal updated");
        Ok(updated)
    }

    pub fn create_weekly_goal(
        &self,
        role: Role,
        goal: &NewWeeklyGoal,
        now: DateTime<Utc>,
    ) -> Result<WeeklyGoal> {
        authorize(role)?;
        validate_new_weekly_goal(goal)?;
        let created = in_transaction(&self.store, |tx| {
            let created = tx.create_weekly_goal(goal, now)?;
            tx.bump_catalog_version()?;
            Ok(created)
        })?;
        info!(weekly_goal_id = created.id, "weekly goal created");
        Ok(created)
    }

    /// Activates or deactivates a weekly goal. Deactivated goals reject
    /// further progress.
    pub fn set_weekly_goal_active(
        &self,
        role: Role,
        weekly_goal_id: i64,
        active: bool,
    ) -> Result<WeeklyGoal> {
        authorize(role)?;
        let goal = in_transaction(&self.store, |tx| {
            tx.set_weekly_goal_active(weekly_goal_id, active)?;
            tx.bump_catalog_version()?;
            Ok(tx.get_weekly_goal(weekly_goal_id)?)
        })?;
        info!(weekly_goal_id, active, "weekly goal toggled");
        Ok(goal)
    }

    /// Loads a ladder definition in one transaction.
    ///
    /// Levels whose number already exists are reused, and goals whose number
    /// already exists in their level are skipped, so importing the same
    /// ladder twice is harmless.
    pub fn import_ladder(
        &self,
        role: Role,
        ladder: &LadderDefinition,
        now: DateTime<Utc>,
    ) -> Result<ImportSummary> {
        authorize(role)?;
        for def in &ladder.levels {
            validate_new_level(&def.to_new_level())?;
        }

        let summary = in_transaction(&self.store, |tx| {
            let mut summary = ImportSummary::default();
            for def in &ladder.levels {
                let level = match tx.get_level_by_number(def.number)? {
                    Some(level) => {
                        summary.levels_reused += 1;
                        level
                    }
                    None => {
                        summary.levels_created += 1;
                        tx.create_level(&def.to_new_level(), now)?
                    }
                };
                let existing = tx.list_goals_for_level(level.id)?;
                for goal in &def.goals {
                    if existing.iter().any(|g| g.goal_number == goal.number) {
                        summary.goals_skipped += 1;
                        continue;
                    }
                    insert_goal(tx, &goal.to_new_goal(level.id), now).map_err(|e| match e {
                        EngineError::Validation(msg) => EngineError::validation(format!(
                            "level {} goal {}: {msg}",
                            def.number, goal.number
                        )),
                        other => other,
                    })?;
                    summary.goals_created += 1;
                }
            }
            summary.catalog_version = tx.bump_catalog_version()?;
            Ok(summary)
        })?;

        info!(
            levels = summary.levels_created,
            goals = summary.goals_created,
            skipped = summary.goals_skipped,
            version = summary.catalog_version,
            "ladder imported"
        );
        Ok(summary)
    }

    /// Returns every level with its goals, in ladder order.
    pub fn catalog(&self) -> Result<Vec<CatalogLevel>> {
        self.store
            .list_levels()?
            .into_iter()
            .map(|level| {
                let goals = self.store.list_goals_for_level(level.id)?;
                Ok(CatalogLevel { level, goals })
            })
            .collect()
    }

    pub fn catalog_version(&self) -> Result<i64> {
        let raw = self.store.get_metadata(hoops_storage::sqlite::schema::CATALOG_VERSION_KEY)?;
        raw.parse()
            .map_err(|_| EngineError::validation(format!("corrupt catalog version: {raw:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    use crate::error::ErrorKind;
    use crate::testutil::{at, engine, goal_id, ladder, seeded};

    fn now() -> DateTime<Utc> {
        at(2024, 3, 1, 12)
    }

    #[test]
    fn only_admin_edits() {
        let engine = engine();
        let level = NewLevel {
            level_number: 1,
            tag: "rookie".into(),
            name: "Rookie".into(),
            points_required: 0,
        };
        for role in [Role::Player, Role::Parent, Role::Coach] {
            let err = engine.create_level(role, &level, now()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Forbidden);
        }
        assert!(engine.create_level(Role::Admin, &level, now()).is_ok());
        assert_eq!(engine.catalog_version().unwrap(), 1);
    }

    #[test]
    fn import_is_repeatable() {
        let engine = engine();
        let first = engine.import_ladder(Role::Admin, &ladder(3, 10), now()).unwrap();
        assert_eq!(first.levels_created, 3);
        assert_eq!(first.goals_created, 30);

        let second = engine.import_ladder(Role::Admin, &ladder(3, 10), now()).unwrap();
        assert_eq!(second.levels_created, 0);
        assert_eq!(second.levels_reused, 3);
        assert_eq!(second.goals_skipped, 30);
        assert_eq!(second.catalog_version, first.catalog_version + 1);

        let catalog = engine.catalog().unwrap();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.iter().all(|l| l.goals.len() == 10));
        assert!(catalog[0].goals[9].is_level_test);
    }

    #[test]
    fn bad_goal_rolls_back_whole_import() {
        let engine = engine();
        let mut def = ladder(2, 3);
        def.levels[1].goals[2].points = 0;
        let err = engine.import_ladder(Role::Admin, &def, now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert!(engine.catalog().unwrap().is_empty());
    }

    #[test]
    fn goal_ten_cannot_drop_level_test() {
        let engine = seeded(1, 10);
        let g10 = goal_id(&engine, 1, 10);
        let updates = GoalUpdates {
            is_level_test: Some(false),
            ..GoalUpdates::default()
        };
        let err = engine.update_goal(Role::Admin, g10, &updates, now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);

        let level_id = engine.catalog().unwrap()[0].level.id;
        let mut dup = NewGoal {
            level_id,
            goal_number: 10,
            title: String::new(),
            criteria: "Test".into(),
            points: 50,
            is_level_test: false,
        };
        let err = engine.create_goal(Role::Admin, &dup, now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        dup.is_level_test = true;
        let err = engine.create_goal(Role::Admin, &dup, now()).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn goal_edit_bumps_versions() {
        let engine = seeded(1, 3);
        let g = goal_id(&engine, 1, 2);
        let before = engine.catalog_version().unwrap();
        let updated = engine
            .update_goal(
                Role::Admin,
                g,
                &GoalUpdates {
                    points: Some(25),
                    ..GoalUpdates::default()
                },
                now(),
            )
            .unwrap();
        assert_eq!(updated.points, 25);
        assert_eq!(updated.version, 2);
        assert_eq!(engine.catalog_version().unwrap(), before + 1);

        let err = engine
            .update_goal(Role::Admin, g, &GoalUpdates::default(), now())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    fn complete_level_one(engine: &ProgressionEngine<hoops_storage::SqliteStore>, goals: i32) {
        for n in 1..=goals {
            engine
                .submit_goal_progress("kid", goal_id(engine, 1, n), 100, false, now())
                .unwrap();
        }
    }

    #[test]
    fn completed_level_rejects_new_goal() {
        let engine = seeded(2, 2);
        complete_level_one(&engine, 2);
        let catalog = engine.catalog().unwrap();
        let before = engine.catalog_version().unwrap();

        let mut goal = NewGoal {
            level_id: catalog[0].level.id,
            goal_number: 3,
            title: String::new(),
            criteria: "Make 10 free throws".into(),
            points: 10,
            is_level_test: false,
        };
        let err = engine.create_goal(Role::Admin, &goal, now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert!(err.to_string().contains("already completed"));
        assert_eq!(engine.catalog().unwrap()[0].goals.len(), 2);
        assert_eq!(engine.catalog_version().unwrap(), before);

        // Levels nobody has completed stay open.
        goal.level_id = catalog[1].level.id;
        assert!(engine.create_goal(Role::Admin, &goal, now()).is_ok());
    }

    #[test]
    fn reimport_cannot_grow_completed_level() {
        let engine = seeded(2, 2);
        complete_level_one(&engine, 2);

        let err = engine
            .import_ladder(Role::Admin, &ladder(2, 3), now())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert!(err.to_string().contains("level 1 goal 3"));

        let catalog = engine.catalog().unwrap();
        assert_eq!(catalog[0].goals.len(), 2);
        assert_eq!(catalog[1].goals.len(), 2);

        // Re-importing what already exists is still fine.
        let summary = engine.import_ladder(Role::Admin, &ladder(2, 2), now()).unwrap();
        assert_eq!(summary.goals_skipped, 4);
    }

    #[test]
    fn goal_in_missing_level_not_found() {
        let engine = engine();
        let goal = NewGoal {
            level_id: 77,
            goal_number: 1,
            title: String::new(),
            criteria: "x".into(),
            points: 10,
            is_level_test: false,
        };
        let err = engine.create_goal(Role::Admin, &goal, now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn weekly_goal_window_validated() {
        let engine = engine();
        let goal = NewWeeklyGoal {
            title: String::new(),
            criteria: "Shoot 500".into(),
            points: 30,
            start_at: now(),
            end_at: now() + Duration::days(9),
        };
        let err = engine.create_weekly_goal(Role::Admin, &goal, now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);

        let goal = NewWeeklyGoal {
            end_at: now() + Duration::days(7),
            ..goal
        };
        let created = engine.create_weekly_goal(Role::Admin, &goal, now()).unwrap();
        assert!(created.is_active);
        let toggled = engine
            .set_weekly_goal_active(Role::Admin, created.id, false)
            .unwrap();
        assert!(!toggled.is_active);
    }
}
