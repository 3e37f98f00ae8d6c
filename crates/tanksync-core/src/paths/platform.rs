//! Platform-specific path resolution.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::PathError;

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "TANKSYNC_DATA_DIR";

/// Get the root directory for application data.
///
/// Resolution order:
/// 1. `TANKSYNC_DATA_DIR` environment variable
/// 2. System data directory (e.g., `~/.local/share/tanksync`)
///
/// The directory is created if it does not exist.
pub fn data_root() -> Result<PathBuf, PathError> {
    let root = match env::var(DATA_DIR_ENV) {
        Ok(path) if !path.trim().is_empty() => resolve_user_path(&path)?,
        _ => dirs::data_local_dir()
            .ok_or(PathError::NoDataDir)?
            .join("tanksync"),
    };

    ensure_dir(&root)?;
    Ok(root)
}

pub(super) fn ensure_dir(path: &Path) -> Result<(), PathError> {
    if path.exists() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Normalize a user-provided path, expanding `~` and making it absolute.
pub fn resolve_user_path(raw: &str) -> Result<PathBuf, PathError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PathError::EmptyPath);
    }

    let expanded = if trimmed == "~" {
        dirs::home_dir().ok_or(PathError::NoHomeDir)?
    } else if let Some(rest) = trimmed.strip_prefix("~/") {
        dirs::home_dir().ok_or(PathError::NoHomeDir)?.join(rest)
    } else {
        PathBuf::from(trimmed)
    };

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(expanded))
            .map_err(|e| PathError::CurrentDirError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_is_rejected() {
        assert!(matches!(resolve_user_path("  "), Err(PathError::EmptyPath)));
    }

    #[test]
    fn test_relative_path_becomes_absolute() {
        let path = resolve_user_path("some/store.db").unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("some/store.db"));
    }

    #[test]
    fn test_absolute_path_is_kept() {
        let path = resolve_user_path("/tmp/x.db").unwrap();
        assert_eq!(path, PathBuf::from("/tmp/x.db"));
    }
}
