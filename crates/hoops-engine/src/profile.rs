//! Player profile operations.

use chrono::{DateTime, Utc};
use tracing::info;

use hoops_core::profile::PlayerProfile;
use hoops_core::validation::validate_user_id;
use hoops_storage::Storage;

use crate::error::Result;
use crate::tx::in_transaction;
use crate::ProgressionEngine;

impl<S: Storage> ProgressionEngine<S> {
    /// Creates a profile at the first level of the ladder.
    ///
    /// Level 1, when the catalog has one, is unlocked for the new user in the
    /// same transaction. A duplicate user id is a validation error.
    pub fn create_profile(
        &self,
        user_id: &str,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> Result<PlayerProfile> {
        validate_user_id(user_id)?;

        let profile = in_transaction(&self.store, |tx| {
            let first = tx.get_level_by_number(1)?;
            let tag = first.as_ref().map(|l| l.tag.as_str()).unwrap_or_default();
            let profile = PlayerProfile::new(user_id, tag, now)
                .with_display_name(display_name.trim());
            tx.create_profile(&profile)?;
            if let Some(level) = &first {
                tx.unlock_user_level(user_id, level.id, now)?;
            }
            Ok(profile)
        })?;

        info!(user_id, level_tag = %profile.current_level_tag, "profile created");
        Ok(profile)
    }

    /// Retrieves a profile, failing with not-found for unknown users.
    pub fn get_profile(&self, user_id: &str) -> Result<PlayerProfile> {
        Ok(self.store.get_profile(user_id)?)
    }

    pub fn list_profiles(&self) -> Result<Vec<PlayerProfile>> {
        Ok(self.store.list_profiles()?)
    }
}

#[cfg(test)]
mod tests {
    use hoops_core::enums::ProgressStatus;
    use hoops_storage::Storage;

    use crate::error::ErrorKind;
    use crate::testutil::{at, engine, seeded};

    #[test]
    fn new_profile_starts_on_level_one() {
        let engine = seeded(2, 1);
        let profile = engine.get_profile("kid").unwrap();
        assert_eq!(profile.current_level_tag, "tier-1");
        assert_eq!(profile.total_points, 0);
        assert_eq!(profile.display_name, "Kid");

        let rows = engine.store().list_user_levels("kid").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, ProgressStatus::Unlocked);
    }

    #[test]
    fn empty_catalog_gives_empty_tag() {
        let engine = engine();
        let profile = engine.create_profile("kid", "", at(2024, 3, 1, 8)).unwrap();
        assert_eq!(profile.current_level_tag, "");
    }

    #[test]
    fn duplicate_profile_is_validation_error() {
        let engine = seeded(1, 1);
        let err = engine
            .create_profile("kid", "", at(2024, 3, 1, 8))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[test]
    fn blank_user_id_rejected() {
        let engine = engine();
        let err = engine.create_profile("  ", "", at(2024, 3, 1, 8)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[test]
    fn unknown_profile_not_found() {
        let engine = engine();
        assert_eq!(
            engine.get_profile("ghost").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
