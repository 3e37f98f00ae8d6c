//! Path utilities for tanksync data directories.
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - No interactive/terminal I/O
//! - OS-specific logic is kept private in `platform`

mod database;
mod error;
mod platform;

pub use database::{local_store_path, remote_store_path};
pub use error::PathError;
pub use platform::{DATA_DIR_ENV, data_root, resolve_user_path};
