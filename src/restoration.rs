//! Restoration record for the quick terminal
//!
//! Stored in `~/.config/quickterm/quick_terminal.yaml`: the per-display
//! frame cache plus the split tree of the last active overlay, so a relaunch
//! reopens where the user left off.

use crate::screen_cache::ScreenStateCache;
use crate::surface::{SplitTreeSnapshot, SurfaceId};
use anyhow::{Context, Result};
use quickterm_config::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestorationState {
    /// RFC 3339 capture time
    #[serde(default)]
    pub saved_at: String,
    #[serde(default)]
    pub screen_state: ScreenStateCache,
    #[serde(default)]
    pub surface_tree: SplitTreeSnapshot,
}

impl RestorationState {
    pub fn new(screen_state: ScreenStateCache, surface_tree: SplitTreeSnapshot) -> Self {
        Self {
            saved_at: chrono::Utc::now().to_rfc3339(),
            screen_state,
            surface_tree,
        }
    }

    pub fn focused_surface(&self) -> Option<SurfaceId> {
        self.surface_tree.focused
    }
}

/// Get the path to the restoration file
pub fn restoration_path() -> PathBuf {
    Config::config_dir().join("quick_terminal.yaml")
}

/// Save the record to the default location
pub fn save(state: &RestorationState) -> Result<()> {
    save_to(state, &restoration_path())
}

pub fn save_to(state: &RestorationState, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {:?}", parent))?;
    }

    let contents =
        serde_yaml_ng::to_string(state).context("Failed to serialize quick terminal state")?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write quick terminal state to {:?}", path))?;

    log::info!(
        "Saved quick terminal state ({} cached screens) to {:?}",
        state.screen_state.len(),
        path
    );
    Ok(())
}

/// Load the record from the default location
///
/// Returns `None` if the file doesn't exist or is empty.
/// Returns an error if the file exists but is corrupt.
pub fn load() -> Result<Option<RestorationState>> {
    load_from(&restoration_path())
}

pub fn load_from(path: &Path) -> Result<Option<RestorationState>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read quick terminal state from {:?}", path))?;
    if contents.trim().is_empty() {
        return Ok(None);
    }

    let state: RestorationState = serde_yaml_ng::from_str(&contents)
        .with_context(|| format!("Failed to parse quick terminal state from {:?}", path))?;

    log::info!(
        "Loaded quick terminal state saved at {} from {:?}",
        state.saved_at,
        path
    );
    Ok(Some(state))
}

/// Remove the record, e.g. after the overlay was closed for good
pub fn clear_at(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove quick terminal state {:?}", path))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Rect, Screen};
    use crate::surface::NodeSnapshot;
    use tempfile::tempdir;

    fn sample_state() -> RestorationState {
        let mut cache = ScreenStateCache::new();
        let screen = Screen::new(
            1,
            Rect::new(0.0, 0.0, 1440.0, 900.0),
            Rect::new(0.0, 0.0, 1440.0, 875.0),
        );
        cache.save(&screen, Rect::new(0.0, 600.0, 1440.0, 275.0), &[]);

        let surface = SurfaceId::new();
        RestorationState::new(
            cache,
            SplitTreeSnapshot {
                root: Some(NodeSnapshot::Leaf { surface }),
                focused: Some(surface),
            },
        )
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp = tempdir().unwrap();
        assert!(load_from(&temp.path().join("missing.yaml")).unwrap().is_none());
    }

    #[test]
    fn test_load_empty_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("empty.yaml");
        std::fs::write(&path, "  \n").unwrap();
        assert!(load_from(&path).unwrap().is_none());
    }

    #[test]
    fn test_load_corrupt_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("corrupt.yaml");
        std::fs::write(&path, "screen_state: [[[").unwrap();
        assert!(load_from(&path).is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("quick_terminal.yaml");
        let state = sample_state();

        save_to(&state, &path).unwrap();
        let loaded = load_from(&path).unwrap().unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.focused_surface(), state.surface_tree.focused);

        clear_at(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_saved_at_is_rfc3339() {
        let state = sample_state();
        assert!(chrono::DateTime::parse_from_rfc3339(&state.saved_at).is_ok());
    }
}
