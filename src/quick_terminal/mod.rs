//! Quick terminal overlay coordinator
//!
//! This module contains `QuickTerminalManager`, which owns every overlay
//! controller and drives the show/hide state machine against a
//! [`WindowHost`].
//!
//! The implementation is split across sub-modules for clarity:
//! - `controller`     per-window state and the controller registry
//! - `tab_group`      tab group resolution and state propagation
//! - `visibility`     animate in/out, toggle and animation completion
//! - `focus`          focus, space and resize notifications
//! - `tabs`           tab creation and the close flows
//! - `config_updates` config change detection and window rebuilds
//! - `events`         the event dispatcher

mod config_updates;
mod controller;
mod events;
mod focus;
mod tab_group;
mod tabs;
mod visibility;

pub use controller::{Controller, ControllerId};
pub use events::OverlayEvent;
pub use tabs::TabError;

use crate::config::{Config, DerivedConfig, QuickTerminalScreen};
use crate::dock::DockControl;
use crate::geometry::Screen;
use crate::host::{AnimationId, WindowHost, WindowId};
use crate::position::PositionPolicy;
use crate::restoration::RestorationState;
use crate::retry::RetryPolicy;
use crate::scheduler::{Clock, TimerQueue};
use crate::screen_cache::ScreenStateCache;
use crate::surface::{SplitTree, SplitTreeSnapshot, SurfaceFactory, SurfaceRequest};
use controller::ControllerRegistry;
use quickterm_config::watcher::ConfigWatcher;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Emitted to the embedding app; drained with `take_notifications`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayNotification {
    /// A tab group's logical visibility flipped
    VisibilityChanged {
        controllers: Vec<ControllerId>,
        visible: bool,
    },
}

/// Deferred work run by `run_due_timers`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledTask {
    /// Re-check key status after activating the app; `attempt` is 1-based
    FocusRetry {
        controller: ControllerId,
        attempt: u32,
    },
    /// One turn after creating a visible tab, make sure it ended up key
    EnsureKey { controller: ControllerId },
}

impl ScheduledTask {
    fn controller(&self) -> ControllerId {
        match self {
            ScheduledTask::FocusRetry { controller, .. }
            | ScheduledTask::EnsureKey { controller } => *controller,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AnimationKind {
    In,
    Out,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct InFlight {
    pub controller: ControllerId,
    pub kind: AnimationKind,
}

/// Coordinates every quick terminal window of the process
pub struct QuickTerminalManager<H: WindowHost> {
    pub(crate) host: H,
    pub(crate) config: DerivedConfig,
    pub(crate) dock: Arc<dyn DockControl>,
    pub(crate) surfaces: Box<dyn SurfaceFactory>,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) registry: ControllerRegistry,
    pub(crate) screen_cache: ScreenStateCache,
    /// Layout from the restoration record, handed to the first controller
    pub(crate) restored_tree: Option<SplitTreeSnapshot>,
    pub(crate) animations: HashMap<AnimationId, InFlight>,
    pub(crate) timers: TimerQueue<ScheduledTask>,
    pub(crate) retry: RetryPolicy,
    pub(crate) notifications: Vec<OverlayNotification>,
}

impl<H: WindowHost> QuickTerminalManager<H> {
    /// Create a manager with no windows; the first `toggle` creates one
    pub fn new(
        host: H,
        config: &Config,
        dock: Arc<dyn DockControl>,
        surfaces: Box<dyn SurfaceFactory>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            host,
            config: DerivedConfig::from(config),
            dock,
            surfaces,
            clock,
            registry: ControllerRegistry::default(),
            screen_cache: ScreenStateCache::new(),
            restored_tree: None,
            animations: HashMap::new(),
            timers: TimerQueue::new(),
            retry: RetryPolicy::focus(),
            notifications: Vec::new(),
        }
    }

    /// Seed the screen cache and initial layout from a restoration record
    pub fn with_restoration(mut self, state: RestorationState) -> Self {
        log::info!(
            "Restoring quick terminal state saved at {} ({} cached screens)",
            state.saved_at,
            state.screen_state.len()
        );
        self.screen_cache = state.screen_state;
        self.restored_tree = (!state.surface_tree.is_empty()).then_some(state.surface_tree);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &DerivedConfig {
        &self.config
    }

    pub fn controller(&self, id: ControllerId) -> Option<&Controller> {
        self.registry.get(id)
    }

    pub fn controller_for_window(&self, window: WindowId) -> Option<ControllerId> {
        self.registry.by_window(window)
    }

    pub fn controllers(&self) -> Vec<ControllerId> {
        self.registry.ids()
    }

    pub fn last_active(&self) -> Option<ControllerId> {
        self.registry.last_active()
    }

    pub fn screen_cache(&self) -> &ScreenStateCache {
        &self.screen_cache
    }

    /// Drain notifications emitted since the last call
    pub fn take_notifications(&mut self) -> Vec<OverlayNotification> {
        std::mem::take(&mut self.notifications)
    }

    /// Number of live dock suppressors across all controllers
    pub fn dock_suppressor_count(&self) -> usize {
        self.registry.iter().filter(|c| c.hidden_dock.is_some()).count()
    }

    // ── Timers ──────────────────────────────────────────────────────────

    /// Deadline of the next scheduled task, for sleeping the event loop
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Run every task that is due; returns how many ran
    pub fn run_due_timers(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.timers.pop_due(self.clock.now()) {
            ran += 1;
            match task {
                ScheduledTask::FocusRetry {
                    controller,
                    attempt,
                } => self.retry_focus(controller, attempt),
                ScheduledTask::EnsureKey { controller } => self.ensure_key(controller),
            }
        }
        ran
    }

    pub(crate) fn schedule(&mut self, after: std::time::Duration, task: ScheduledTask) {
        let deadline = self.clock.now() + after;
        log::trace!("scheduling {:?} in {:?}", task, after);
        self.timers.schedule(deadline, task);
    }

    // ── Config reload ───────────────────────────────────────────────────

    /// Turn a pending config file change into a `ConfigChanged` event
    pub fn poll_config_reload(&mut self, watcher: &ConfigWatcher) -> bool {
        let Some(event) = watcher.try_recv() else {
            return false;
        };
        match event.load() {
            Ok(config) => {
                self.dispatch(OverlayEvent::ConfigChanged(config));
                true
            }
            Err(e) => {
                log::warn!("Ignoring config reload from {:?}: {:#}", event.path, e);
                false
            }
        }
    }

    // ── Restoration ─────────────────────────────────────────────────────

    /// Snapshot for the restoration record.
    ///
    /// Uses the last active controller (or the first). Returns `None` when
    /// that controller runs a one-shot command.
    pub fn capture_restoration(&self) -> Option<RestorationState> {
        let tree = match self.registry.last_active().or_else(|| self.registry.first()) {
            Some(id) => {
                let controller = self.registry.get(id)?;
                if !controller.restorable {
                    log::debug!("{id} is not restorable, skipping capture");
                    return None;
                }
                if controller.tree.is_empty() {
                    controller.pending_snapshot.clone().unwrap_or_default()
                } else {
                    controller.tree.snapshot()
                }
            }
            None => self.restored_tree.clone().unwrap_or_default(),
        };
        Some(RestorationState::new(self.screen_cache.clone(), tree))
    }

    // ── Shared helpers ──────────────────────────────────────────────────

    /// Screen the overlay shows on, per the `screen` setting
    pub(crate) fn target_screen(&self) -> Option<Screen> {
        let selected = match self.config.screen {
            QuickTerminalScreen::Main => self.host.main_screen(),
            QuickTerminalScreen::Mouse => self.host.screen_with_mouse(),
            QuickTerminalScreen::MenuBar => self.host.menu_bar_screen(),
        };
        selected.or_else(|| self.host.main_screen())
    }

    /// Screen a controller's window sits on, else the target screen
    pub(crate) fn screen_for(&self, window: WindowId) -> Option<Screen> {
        self.host
            .screen_of(window)
            .or_else(|| self.target_screen())
    }

    pub(crate) fn policy_for(&self, id: ControllerId) -> PositionPolicy {
        let position = self
            .registry
            .get(id)
            .map_or(self.config.position, |c| c.position);
        PositionPolicy::new(position, self.config.size)
    }

    pub(crate) fn is_animating(&self, id: ControllerId) -> bool {
        self.animations.values().any(|a| a.controller == id)
    }

    /// Create a hidden controller and its window
    pub(crate) fn create_controller(
        &mut self,
        request: SurfaceRequest,
        restorable: bool,
    ) -> Option<ControllerId> {
        let Some(window) = self.host.create_window(self.config.chrome()) else {
            log::warn!("Window host refused to create a quick terminal window");
            return None;
        };
        self.configure_window(window);

        let id = self.registry.next_id();
        let mut controller =
            controller::Controller::new(id, window, self.config.position, request, restorable);
        if restorable {
            controller.pending_snapshot = self.restored_tree.take();
        }
        self.registry.insert(controller);
        crate::debug_info!("QUICK", "created {} on {}", id, window);
        Some(id)
    }

    /// Per-window settings applied on creation and rebuild
    pub(crate) fn configure_window(&mut self, window: WindowId) {
        self.host
            .set_space_behavior(window, self.config.space_behavior);
        self.host.set_appearance(window, self.config.appearance());
    }

    /// Give the controller content if it has none: the restored layout when
    /// one is pending, else a fresh surface
    pub(crate) fn materialize(&mut self, id: ControllerId) {
        let Some(controller) = self.registry.get_mut(id) else {
            return;
        };
        if !controller.tree.is_empty() {
            return;
        }

        if let Some(snapshot) = controller.pending_snapshot.take() {
            let tree = SplitTree::from_snapshot(&snapshot, self.surfaces.as_mut());
            if !tree.is_empty() {
                log::debug!("{id}: restored {} surfaces", tree.leaves().len());
                controller.tree = tree;
                return;
            }
        }

        let surface = self.surfaces.create(&controller.request);
        log::debug!("{id}: created surface {}", surface.id());
        controller.tree = SplitTree::with_surface(surface);
    }

    /// Hand keyboard focus to the controller's focused surface
    pub(crate) fn focus_surface(&mut self, id: ControllerId) {
        let Some(controller) = self.registry.get_mut(id) else {
            return;
        };
        if let Some(surface) = controller.tree.focus_target() {
            controller.tree.set_focused(surface.id());
            surface.grant_focus();
        }
    }
}

impl<H: WindowHost> Drop for QuickTerminalManager<H> {
    fn drop(&mut self) {
        // Controllers drop their dock suppressors, which restores the dock
        let held = self.dock_suppressor_count();
        if held > 0 {
            log::debug!("Releasing {held} dock suppressor(s) on shutdown");
        }
    }
}
