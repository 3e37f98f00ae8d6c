//! Paths command handler.
//!
//! Displays resolved store locations for diagnostics. Runs without opening
//! either store.

use anyhow::Result;

use tanksync_core::data_root;
use tanksync_db::StoreConfig;

use crate::bootstrap::SETTINGS_FILE;

/// Print every resolved location in `key = value` format.
pub fn execute(stores: &StoreConfig) -> Result<()> {
    let root = data_root()?;
    println!("data_root = {}", root.display());
    println!("settings = {}", root.join(SETTINGS_FILE).display());
    println!("local_db = {}", stores.local_path.display());
    println!(
        "remote_url = {}",
        stores.remote_url.as_deref().unwrap_or("(offline)")
    );
    Ok(())
}
