//! Bridges engine closures onto [`Storage::run_in_transaction`].

use hoops_storage::{Storage, StorageError, Transaction};

use crate::error::{EngineError, Result};

/// Runs `f` inside one storage transaction and hands back its value.
///
/// An engine error from `f` aborts (rolls back) the transaction and is
/// returned unchanged. A commit failure wins over a value produced by `f`.
pub(crate) fn in_transaction<S, T, F>(store: &S, f: F) -> Result<T>
where
    S: Storage + ?Sized,
    F: FnOnce(&dyn Transaction) -> Result<T>,
{
    let mut f = Some(f);
    let mut out: Option<Result<T>> = None;

    let committed = store.run_in_transaction(&mut |tx| {
        let Some(f) = f.take() else {
            return Err(StorageError::Internal(
                "transaction body invoked twice".into(),
            ));
        };
        match f(tx) {
            Ok(value) => {
                out = Some(Ok(value));
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                out = Some(Err(e));
                Err(StorageError::Aborted(reason))
            }
        }
    });

    match (committed, out) {
        (Err(StorageError::Aborted(_)), Some(Err(e))) => Err(e),
        (Err(e), _) => Err(e.into()),
        (Ok(()), Some(result)) => result,
        (Ok(()), None) => Err(EngineError::Storage(StorageError::Internal(
            "transaction body did not run".into(),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hoops_core::profile::PlayerProfile;
    use hoops_storage::SqliteStore;

    #[test]
    fn returns_value_on_commit() {
        let store = SqliteStore::open_in_memory().unwrap();
        let total = in_transaction(&store, |tx| {
            tx.create_profile(&PlayerProfile::new("kid", "", Utc::now()))?;
            Ok(tx.add_points("kid", 12, Utc::now())?)
        })
        .unwrap();
        assert_eq!(total, 12);
        assert_eq!(store.get_profile("kid").unwrap().total_points, 12);
    }

    #[test]
    fn engine_error_rolls_back_and_surfaces() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = in_transaction(&store, |tx| -> Result<()> {
            tx.create_profile(&PlayerProfile::new("kid", "", Utc::now()))?;
            Err(EngineError::validation("nope"))
        })
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(ref m) if m == "nope"));
        assert!(store.get_profile("kid").unwrap_err().is_not_found());
    }
}
