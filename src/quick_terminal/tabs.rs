//! Tab creation and the close flows.

use super::{ControllerId, QuickTerminalManager, ScheduledTask};
use crate::host::{Alert, CloseIntent, ConfirmPrompt, WindowHost, WindowLevel};
use crate::surface::{SurfaceId, SurfaceRequest};
use std::time::Duration;
use thiserror::Error;

/// Why a new tab could not be opened
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TabError {
    #[error("tabs are disabled for the quick terminal")]
    TabbingDisabled,
    #[error("the current fullscreen mode does not support tabs")]
    FullscreenForbidsTabs,
    #[error("unknown quick terminal controller {0}")]
    UnknownController(ControllerId),
    #[error("the window host could not create a window")]
    WindowUnavailable,
}

impl<H: WindowHost> QuickTerminalManager<H> {
    /// Open a new tab next to `parent`, inheriting its group state.
    ///
    /// Shows a blocking alert and aborts when tabs are disabled or the
    /// parent is in a fullscreen mode that cannot host a tab strip.
    pub fn new_tab(&mut self, parent: ControllerId) -> Result<ControllerId, TabError> {
        let Some(parent_window) = self.registry.window_of(parent) else {
            return Err(TabError::UnknownController(parent));
        };

        if !self.config.tabs_enabled {
            log::info!("new_tab: tabs disabled");
            self.host.alert(&Alert::TabsDisabled);
            return Err(TabError::TabbingDisabled);
        }
        if self.host.is_fullscreen(parent_window) && !self.config.fullscreen_mode.allows_tabs() {
            log::info!("new_tab: refused in {:?} fullscreen", self.config.fullscreen_mode);
            self.host.alert(&Alert::TabsUnavailableInFullscreen);
            return Err(TabError::FullscreenForbidsTabs);
        }

        // Attaching the tab steals key status from the parent; not a dismissal
        let group = self.group(parent);
        let until = self.clock.now() + self.config.auto_hide_suppression;
        self.set_group_suppression(&group, until);

        let window = self
            .host
            .create_window(self.config.chrome())
            .ok_or(TabError::WindowUnavailable)?;
        self.configure_window(window);
        self.host.add_tabbed_window(parent_window, window);

        let id = self.registry.next_id();
        let Some(source) = self.registry.get(parent) else {
            return Err(TabError::UnknownController(parent));
        };
        let mut controller = super::controller::Controller::new(
            id,
            window,
            source.position,
            SurfaceRequest::shell(),
            source.restorable,
        );
        controller.visible = source.visible;
        controller.previous_app = source.previous_app;
        controller.previous_space = source.previous_space;
        controller.suppress_auto_hide_until = Some(until);
        self.registry.insert(controller);
        self.materialize(id);

        // The new tab takes over the group's suppressor
        if let Some(holder) = group
            .iter()
            .copied()
            .find(|m| self.registry.get(*m).is_some_and(|c| c.hidden_dock.is_some()))
        {
            self.transfer_dock(holder, id);
        }

        if self.registry.get(id).is_some_and(|c| c.visible) {
            if let Some(frame) = self.host.frame(parent_window) {
                self.host.set_frame(window, frame);
            }
            self.host.set_alpha(window, 1.0);
            self.host.set_ignores_mouse_events(window, false);
            self.host.set_level(window, WindowLevel::Floating);
            self.host.select_tab(window);
            self.host.make_key_and_order_front(window);
            self.focus_surface(id);
            self.schedule(Duration::ZERO, ScheduledTask::EnsureKey { controller: id });
        }

        self.registry.set_last_active(Some(id));
        crate::debug_info!("QUICK", "{} opened as tab of {}", id, parent);
        Ok(id)
    }

    /// Close `id`'s tab; the last tab of a group is hidden instead
    pub fn close_tab(&mut self, id: ControllerId) {
        if self.registry.get(id).is_none() {
            return;
        }
        self.close_tabs(id, vec![id], CloseIntent::Tab);
    }

    /// Close every tab of `id`'s group except `id`
    pub fn close_other_tabs(&mut self, id: ControllerId) {
        if self.registry.get(id).is_none() {
            return;
        }
        let targets = self.group(id).into_iter().filter(|m| *m != id).collect();
        self.close_tabs(id, targets, CloseIntent::OtherTabs);
    }

    /// Close every tab after `id` in tab-strip order
    pub fn close_tabs_to_right(&mut self, id: ControllerId) {
        if self.registry.get(id).is_none() {
            return;
        }
        let targets = self
            .group(id)
            .into_iter()
            .skip_while(|m| *m != id)
            .skip(1)
            .collect();
        self.close_tabs(id, targets, CloseIntent::TabsToRight);
    }

    fn close_tabs(&mut self, origin: ControllerId, targets: Vec<ControllerId>, intent: CloseIntent) {
        if targets.is_empty() {
            log::trace!("{:?} from {origin}: nothing to close", intent);
            return;
        }

        let group = self.group(origin);
        if group.iter().all(|m| targets.contains(m)) {
            // Closing the whole group keeps the overlay alive for reuse
            log::debug!("{origin}: closing the last tab hides the overlay");
            self.animate_out(origin);
            return;
        }

        let needs_confirm = targets.iter().any(|id| {
            self.registry
                .get(*id)
                .is_some_and(|c| c.tree.leaves().iter().any(|s| s.needs_confirm_quit()))
        });
        if needs_confirm {
            let prompt = ConfirmPrompt::for_close(intent, targets.len());
            if !self.host.confirm(&prompt) {
                log::info!("{:?} from {origin} cancelled by user", intent);
                return;
            }
        }

        for id in targets {
            self.close_controller(id);
        }
    }

    /// Really close one tab and fix up group ownership afterwards
    pub(crate) fn close_controller(&mut self, id: ControllerId) {
        let siblings: Vec<ControllerId> =
            self.group(id).into_iter().filter(|m| *m != id).collect();
        let Some(mut controller) = self.registry.remove(id) else {
            return;
        };

        let suppressor = controller.hidden_dock.take();
        self.host.close_window(controller.window);
        self.animations.retain(|_, a| a.controller != id);
        self.timers.retain(|task| task.controller() != id);
        crate::debug_info!("QUICK", "closed {} ({})", id, controller.window);

        let selected = siblings
            .first()
            .and_then(|s| self.selected_in_group(*s))
            .or_else(|| siblings.first().copied());

        // Donate the suppressor while the group is still on screen
        if let Some(suppressor) = suppressor
            && let Some(heir) = selected
            && self.is_group_visible(heir)
            && self.adopt_dock(heir, suppressor).is_some()
        {
            log::warn!("{heir} already holds a dock suppressor; released {id}'s");
        }

        let last_active = selected.or_else(|| self.registry.first());
        self.registry.set_last_active(last_active);
    }

    /// A surface's process ended: drop it, and when its window has no
    /// surfaces left, close that tab (or hide a lone one)
    pub(crate) fn surface_exited(&mut self, surface: SurfaceId) {
        let Some(id) = self
            .registry
            .iter()
            .find(|c| c.tree.contains(surface))
            .map(|c| c.id)
        else {
            return;
        };

        let emptied = match self.registry.get_mut(id) {
            Some(controller) => {
                controller.tree.remove(surface);
                controller.tree.is_empty()
            }
            None => false,
        };
        if !emptied {
            return;
        }

        if self.group(id).len() > 1 {
            self.close_controller(id);
        } else {
            self.animate_out(id);
        }
    }
}
