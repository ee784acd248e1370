//! Discovery and management of the `.hoops/` directory.
//!
//! The `.hoops/` directory holds the database and `config.yaml`. It is found
//! by walking up from the working directory, or named directly with
//! `HOOPS_DIR`.

use std::path::{Path, PathBuf};

use crate::config::ConfigError;

/// The name of the metadata directory.
pub const HOOPS_DIR_NAME: &str = ".hoops";

/// Environment variable that overrides discovery.
const HOOPS_DIR_ENV: &str = "HOOPS_DIR";

/// Walks up the directory tree from `start` looking for a `.hoops/` directory.
///
/// `HOOPS_DIR` is checked first. Returns `None` when the filesystem root is
/// reached without finding one.
pub fn find_hoops_dir(start: &Path) -> Option<PathBuf> {
    if let Ok(env_dir) = std::env::var(HOOPS_DIR_ENV) {
        let env_path = PathBuf::from(env_dir);
        if env_path.is_dir() {
            return Some(env_path);
        }
    }
    find_hoops_dir_from(start)
}

/// The walk-up half of [`find_hoops_dir`], ignoring the environment.
pub fn find_hoops_dir_from(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().ok()?;
    start
        .ancestors()
        .map(|dir| dir.join(HOOPS_DIR_NAME))
        .find(|candidate| candidate.is_dir())
}

/// Like [`find_hoops_dir`], converting `None` into
/// [`ConfigError::HoopsDirNotFound`].
pub fn find_hoops_dir_or_error(start: &Path) -> Result<PathBuf, ConfigError> {
    find_hoops_dir(start).ok_or(ConfigError::HoopsDirNotFound)
}

/// Ensures a `.hoops/` directory exists at (or under) `path`.
///
/// If `path` is not itself named `.hoops`, a `.hoops/` subdirectory is
/// created under it. Returns the directory path.
pub fn ensure_hoops_dir(path: &Path) -> Result<PathBuf, ConfigError> {
    let hoops_dir = if path.ends_with(HOOPS_DIR_NAME) {
        path.to_path_buf()
    } else {
        path.join(HOOPS_DIR_NAME)
    };
    std::fs::create_dir_all(&hoops_dir)?;
    Ok(hoops_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_dir_from_nested_child() {
        let dir = tempfile::tempdir().unwrap();
        let hoops = dir.path().join(".hoops");
        std::fs::create_dir(&hoops).unwrap();
        let child = dir.path().join("season").join("week1");
        std::fs::create_dir_all(&child).unwrap();

        let found = find_hoops_dir_from(&child).unwrap();
        assert_eq!(found, hoops.canonicalize().unwrap());
    }

    #[test]
    fn missing_start_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_hoops_dir_from(&dir.path().join("does-not-exist")).is_none());
    }

    #[test]
    fn ensure_creates_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let first = ensure_hoops_dir(dir.path()).unwrap();
        assert!(first.is_dir());
        assert!(first.ends_with(".hoops"));
        let second = ensure_hoops_dir(&first).unwrap();
        assert_eq!(first, second);
    }
}
