//! Per-display memory of the overlay's last frame.
//!
//! Written on every hide, read on every show. Each entry remembers the
//! screen geometry it was saved against so a resolution change or display
//! rearrangement invalidates it instead of restoring an off-screen frame.

use crate::geometry::{DisplayId, Rect, Screen};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of displays remembered
pub const MAX_ENTRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenEntry {
    pub frame: Rect,
    /// Full display bounds at the time the frame was saved
    pub screen_frame: Rect,
    /// Save counter used to evict the least recently saved display
    #[serde(default)]
    pub generation: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenStateCache {
    #[serde(default)]
    entries: BTreeMap<DisplayId, ScreenEntry>,
    #[serde(default)]
    generation: u64,
}

impl ScreenStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Frame to reopen at on `screen`, if one was saved against the same
    /// display geometry
    pub fn frame_for(&self, screen: &Screen) -> Option<Rect> {
        let entry = self.entries.get(&screen.id)?;
        if entry.screen_frame != screen.frame {
            log::debug!(
                "screen cache: {} geometry changed ({} -> {}), ignoring saved frame",
                screen.id,
                entry.screen_frame,
                screen.frame
            );
            return None;
        }
        Some(entry.frame)
    }

    /// Remember `frame` for `screen`.
    ///
    /// Degenerate frames are ignored. Displays missing from `connected` are
    /// dropped, then the least recently saved entries are evicted down to
    /// [`MAX_ENTRIES`].
    pub fn save(&mut self, screen: &Screen, frame: Rect, connected: &[Screen]) {
        if frame.is_degenerate() {
            log::debug!("screen cache: skipping degenerate frame {frame} for {}", screen.id);
            return;
        }

        self.generation += 1;
        self.entries.insert(
            screen.id,
            ScreenEntry {
                frame,
                screen_frame: screen.frame,
                generation: self.generation,
            },
        );

        if !connected.is_empty() {
            self.entries
                .retain(|id, _| *id == screen.id || connected.iter().any(|s| s.id == *id));
        }

        while self.entries.len() > MAX_ENTRIES {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.generation)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    self.entries.remove(&id);
                }
                None => break,
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen(id: u32) -> Screen {
        let origin = f64::from(id) * 2000.0;
        Screen::new(
            id,
            Rect::new(origin, 0.0, 1920.0, 1080.0),
            Rect::new(origin, 0.0, 1920.0, 1055.0),
        )
    }

    #[test]
    fn test_save_and_restore() {
        let mut cache = ScreenStateCache::new();
        let frame = Rect::new(100.0, 200.0, 800.0, 300.0);
        cache.save(&screen(1), frame, &[]);
        assert_eq!(cache.frame_for(&screen(1)), Some(frame));
        assert_eq!(cache.frame_for(&screen(2)), None);
    }

    #[test]
    fn test_degenerate_frame_not_saved() {
        let mut cache = ScreenStateCache::new();
        cache.save(&screen(1), Rect::new(0.0, 0.0, 0.0, 300.0), &[]);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_geometry_change_invalidates() {
        let mut cache = ScreenStateCache::new();
        cache.save(&screen(1), Rect::new(10.0, 10.0, 500.0, 500.0), &[]);

        let mut resized = screen(1);
        resized.frame = Rect::new(2000.0, 0.0, 2560.0, 1440.0);
        assert_eq!(cache.frame_for(&resized), None);
    }

    #[test]
    fn test_disconnected_displays_pruned() {
        let mut cache = ScreenStateCache::new();
        let frame = Rect::new(10.0, 10.0, 500.0, 500.0);
        cache.save(&screen(1), frame, &[]);
        cache.save(&screen(2), frame, &[]);
        cache.save(&screen(3), frame, &[screen(1), screen(3)]);

        assert_eq!(cache.len(), 2);
        assert!(cache.frame_for(&screen(2)).is_none());
    }

    #[test]
    fn test_evicts_least_recently_saved() {
        let mut cache = ScreenStateCache::new();
        let frame = Rect::new(10.0, 10.0, 500.0, 500.0);
        for id in 0..MAX_ENTRIES as u32 {
            cache.save(&screen(id), frame, &[]);
        }
        // Refresh display 0 so display 1 becomes the oldest
        cache.save(&screen(0), frame, &[]);
        cache.save(&screen(99), frame, &[]);

        assert_eq!(cache.len(), MAX_ENTRIES);
        assert!(cache.frame_for(&screen(0)).is_some());
        assert!(cache.frame_for(&screen(1)).is_none());
        assert!(cache.frame_for(&screen(99)).is_some());
    }

    #[test]
    fn test_yaml_round_trip_keeps_entries() {
        let mut cache = ScreenStateCache::new();
        cache.save(&screen(4), Rect::new(1.0, 2.0, 3.0, 4.0), &[]);
        let yaml = serde_yaml_ng::to_string(&cache).unwrap();
        let parsed: ScreenStateCache = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(parsed, cache);
    }
}
