//! Dock auto-hide suppression.
//!
//! A [`DockSuppressor`] forces the OS dock into auto-hide while an overlay
//! sits on the dock's edge. Only one exists per tab group: it is moved
//! between controllers, never cloned, and dropping it puts the user's
//! preference back.

use std::fmt;
use std::sync::Arc;

/// Process-global dock settings exposed by the host platform
pub trait DockControl {
    /// Current auto-hide preference
    fn autohide(&self) -> bool;
    fn set_autohide(&self, autohide: bool);
    /// Take the presentation option that keeps the dock out of the way
    fn acquire_presentation(&self);
    fn release_presentation(&self);
}

pub struct DockSuppressor {
    control: Arc<dyn DockControl>,
    /// Preference observed before the first hide
    previous: Option<bool>,
    hidden: bool,
}

impl DockSuppressor {
    pub fn new(control: Arc<dyn DockControl>) -> Self {
        Self {
            control,
            previous: None,
            hidden: false,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Force the dock into auto-hide. No-op while already hidden.
    pub fn hide(&mut self) {
        if self.hidden {
            return;
        }
        let previous = *self.previous.get_or_insert_with(|| self.control.autohide());
        self.control.acquire_presentation();
        self.control.set_autohide(true);
        self.hidden = true;
        log::debug!("dock: suppressed (previous autohide={previous})");
    }

    /// Put the recorded preference back; returns it, or `None` when the dock
    /// was not suppressed.
    pub fn restore(&mut self) -> Option<bool> {
        if !self.hidden {
            return None;
        }
        let previous = self.previous.unwrap_or(false);
        self.control.set_autohide(previous);
        self.control.release_presentation();
        self.hidden = false;
        log::debug!("dock: restored (autohide={previous})");
        Some(previous)
    }
}

impl Drop for DockSuppressor {
    fn drop(&mut self) {
        self.restore();
    }
}

impl fmt::Debug for DockSuppressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DockSuppressor")
            .field("previous", &self.previous)
            .field("hidden", &self.hidden)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessDock;

    fn dock(autohide: bool) -> Arc<HeadlessDock> {
        Arc::new(HeadlessDock::new(autohide))
    }

    #[test]
    fn test_hide_is_idempotent() {
        let control = dock(false);
        let mut suppressor = DockSuppressor::new(control.clone());
        suppressor.hide();
        suppressor.hide();
        assert!(control.autohide());
        assert_eq!(control.presentation_holds(), 1);
    }

    #[test]
    fn test_restore_returns_previous_preference() {
        let control = dock(false);
        let mut suppressor = DockSuppressor::new(control.clone());
        assert_eq!(suppressor.restore(), None);

        suppressor.hide();
        assert_eq!(suppressor.restore(), Some(false));
        assert_eq!(suppressor.restore(), None);
        assert!(!control.autohide());
        assert_eq!(control.presentation_holds(), 0);
    }

    #[test]
    fn test_previous_recorded_once() {
        let control = dock(true);
        let mut suppressor = DockSuppressor::new(control.clone());
        suppressor.hide();
        suppressor.restore();

        // User preference changed while restored; the first recording still wins
        control.set_autohide(false);
        suppressor.hide();
        assert_eq!(suppressor.restore(), Some(true));
    }

    #[test]
    fn test_drop_restores() {
        let control = dock(false);
        {
            let mut suppressor = DockSuppressor::new(control.clone());
            suppressor.hide();
            assert!(control.autohide());
        }
        assert!(!control.autohide());
        assert_eq!(control.presentation_holds(), 0);
    }

    #[test]
    fn test_moved_suppressor_restores_once() {
        let control = dock(false);
        let mut first = DockSuppressor::new(control.clone());
        first.hide();
        let adopted = first;
        assert_eq!(control.presentation_holds(), 1);
        drop(adopted);
        assert_eq!(control.presentation_holds(), 0);
    }
}
