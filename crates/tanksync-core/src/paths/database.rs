//! Store file locations.
//!
//! Both `SQLite` files live in the `data/` subdirectory of the data root. The
//! shared store may instead be pointed at any file other processes can reach.

use std::path::PathBuf;

use super::error::PathError;
use super::platform::{data_root, ensure_dir};

fn data_dir() -> Result<PathBuf, PathError> {
    let dir = data_root()?.join("data");
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Default path of the shared (remote) document store.
pub fn remote_store_path() -> Result<PathBuf, PathError> {
    Ok(data_dir()?.join("shared.db"))
}

/// Path of this client's local fallback store.
pub fn local_store_path() -> Result<PathBuf, PathError> {
    Ok(data_dir()?.join("local.db"))
}
