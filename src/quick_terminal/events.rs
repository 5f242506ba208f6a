//! Event dispatcher
//!
//! Every host notification enters the coordinator as one [`OverlayEvent`]
//! and is mapped to exactly one handler.

use super::QuickTerminalManager;
use crate::config::Config;
use crate::host::{AnimationId, WindowHost, WindowId};
use crate::surface::SurfaceId;

/// Closed set of inputs from the host
#[derive(Debug, Clone)]
pub enum OverlayEvent {
    /// `window` became key
    FocusGained { window: WindowId },
    /// `window` resigned key
    FocusLost { window: WindowId },
    /// The active space (virtual desktop) changed
    SpaceChanged,
    /// A user-driven live resize of `window` ended
    ResizeFinished { window: WindowId },
    /// Configuration was reloaded
    ConfigChanged(Config),
    /// The user asked to close `window` (close button, shortcut)
    CloseRequested { window: WindowId },
    /// An animation started through `WindowHost::animate` landed
    AnimationFinished(AnimationId),
    /// The process behind a surface ended
    SurfaceExited(SurfaceId),
}

impl<H: WindowHost> QuickTerminalManager<H> {
    pub fn dispatch(&mut self, event: OverlayEvent) {
        log::trace!("dispatch {:?}", event);
        match event {
            OverlayEvent::FocusGained { window } => self.focus_gained(window),
            OverlayEvent::FocusLost { window } => self.focus_lost(window),
            OverlayEvent::SpaceChanged => self.space_changed(),
            OverlayEvent::ResizeFinished { window } => self.resize_finished(window),
            OverlayEvent::ConfigChanged(config) => self.apply_config(&config),
            OverlayEvent::CloseRequested { window } => {
                if let Some(id) = self.registry.by_window(window) {
                    self.close_tab(id);
                }
            }
            OverlayEvent::AnimationFinished(animation) => self.animation_finished(animation),
            OverlayEvent::SurfaceExited(surface) => self.surface_exited(surface),
        }
    }
}
