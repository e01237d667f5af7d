//! Generated items file
//!
//! Items are persisted as one pretty-printed JSON array, non-ASCII text kept
//! as is.

use super::item::PracticeItem;
use crate::Result;
use log::info;
use std::fs;
use std::path::Path;

/// Write `items` to `path`, replacing any existing file
pub fn save_items(items: &[PracticeItem], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(items)?;
    fs::write(path, json)?;
    info!("Saved {} items to {:?}", items.len(), path);
    Ok(())
}

/// Read items previously written by `save_items`
pub fn load_items(path: &Path) -> Result<Vec<PracticeItem>> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Append `items` to the file at `path`, creating it if needed
pub fn append_items(items: &[PracticeItem], path: &Path) -> Result<usize> {
    let mut all = if path.exists() {
        load_items(path)?
    } else {
        Vec::new()
    };
    all.extend_from_slice(items);
    save_items(&all, path)?;
    Ok(all.len())
}
