//! Tab group resolution and shared-state propagation.
//!
//! Every write to state that siblings share goes through here so a change
//! made on one tab is visible on all of them.

use super::{ControllerId, OverlayNotification, QuickTerminalManager};
use crate::dock::DockSuppressor;
use crate::host::{AppId, SpaceId, WindowHost};
use std::time::Instant;

impl<H: WindowHost> QuickTerminalManager<H> {
    /// Controllers sharing `id`'s tab group, in tab-strip order.
    ///
    /// Resolution order: the host's tab group object, then its raw tabbed
    /// window list, then (only when neither exists and several controllers
    /// do) every controller in the process, finally `id` alone. The result
    /// always contains `id`.
    pub fn group(&self, id: ControllerId) -> Vec<ControllerId> {
        let Some(window) = self.registry.window_of(id) else {
            return Vec::new();
        };

        let windows = self
            .host
            .tab_group(window)
            .map(|group| group.windows)
            .or_else(|| self.host.tabbed_windows(window));

        let mut members: Vec<ControllerId> = match windows {
            Some(windows) => windows
                .into_iter()
                .filter_map(|w| self.registry.by_window(w))
                .collect(),
            None if self.registry.len() > 1 => {
                log::debug!("{id}: tab group not registered yet, using every controller");
                self.registry.ids()
            }
            None => vec![id],
        };

        if !members.contains(&id) {
            members.push(id);
        }
        members
    }

    /// Whether any member of `id`'s group is logically visible
    pub fn is_group_visible(&self, id: ControllerId) -> bool {
        self.group(id)
            .iter()
            .filter_map(|m| self.registry.get(*m))
            .any(|c| c.visible)
    }

    /// Controller of the group's selected tab, if the host reports one
    pub(crate) fn selected_in_group(&self, id: ControllerId) -> Option<ControllerId> {
        let window = self.registry.window_of(id)?;
        let selected = self.host.tab_group(window)?.selected?;
        self.registry.by_window(selected)
    }

    /// Set `visible` on every member; notifies only if a flag flipped
    pub(crate) fn set_group_visible(&mut self, group: &[ControllerId], visible: bool) {
        let mut flipped = false;
        for id in group {
            if let Some(controller) = self.registry.get_mut(*id)
                && controller.visible != visible
            {
                controller.visible = visible;
                flipped = true;
            }
        }
        if flipped {
            log::debug!("group {:?} visible={}", group, visible);
            self.notifications
                .push(OverlayNotification::VisibilityChanged {
                    controllers: group.to_vec(),
                    visible,
                });
        }
    }

    pub(crate) fn set_group_previous_app(&mut self, group: &[ControllerId], app: Option<AppId>) {
        for id in group {
            if let Some(controller) = self.registry.get_mut(*id) {
                controller.previous_app = app;
            }
        }
    }

    pub(crate) fn set_group_previous_space(
        &mut self,
        group: &[ControllerId],
        space: Option<SpaceId>,
    ) {
        for id in group {
            if let Some(controller) = self.registry.get_mut(*id) {
                controller.previous_space = space;
            }
        }
    }

    pub(crate) fn set_group_suppression(&mut self, group: &[ControllerId], until: Instant) {
        for id in group {
            if let Some(controller) = self.registry.get_mut(*id) {
                controller.suppress_auto_hide_until = Some(until);
            }
        }
    }

    /// Whether focus-loss auto-hide is currently suppressed for the group
    pub(crate) fn is_auto_hide_suppressed(&self, group: &[ControllerId]) -> bool {
        let now = self.clock.now();
        group
            .iter()
            .filter_map(|id| self.registry.get(*id))
            .filter_map(|c| c.suppress_auto_hide_until)
            .any(|deadline| now < deadline)
    }

    /// Engage dock suppression for the group, reusing its suppressor if one
    /// is live so a group never holds two
    pub(crate) fn suppress_dock(&mut self, group: &[ControllerId], owner: ControllerId) {
        let holder = group
            .iter()
            .copied()
            .find(|id| self.registry.get(*id).is_some_and(|c| c.hidden_dock.is_some()));

        let target = holder.unwrap_or(owner);
        let dock = self.dock.clone();
        if let Some(controller) = self.registry.get_mut(target) {
            controller
                .hidden_dock
                .get_or_insert_with(|| DockSuppressor::new(dock))
                .hide();
        }
    }

    /// Put the dock back without giving up the suppressor
    pub(crate) fn restore_dock(&mut self, group: &[ControllerId]) {
        for id in group {
            if let Some(suppressor) = self
                .registry
                .get_mut(*id)
                .and_then(|c| c.hidden_dock.as_mut())
            {
                suppressor.restore();
            }
        }
    }

    /// Remove and drop every suppressor in the group
    pub(crate) fn release_dock(&mut self, group: &[ControllerId]) {
        for id in group {
            if let Some(mut suppressor) = self
                .registry
                .get_mut(*id)
                .and_then(|c| c.hidden_dock.take())
            {
                suppressor.restore();
            }
        }
    }

    /// Move the group's suppressor (if any) from `from` to `to`
    pub(crate) fn transfer_dock(&mut self, from: ControllerId, to: ControllerId) {
        if from == to {
            return;
        }
        let taken = self
            .registry
            .get_mut(from)
            .and_then(|c| c.hidden_dock.take());
        if let Some(suppressor) = taken
            && let Some(rejected) = self.adopt_dock(to, suppressor)
            && let Some(controller) = self.registry.get_mut(from)
        {
            controller.hidden_dock = Some(rejected);
        }
    }

    /// Hand `suppressor` to `to`. Gives it back when `to` is gone or already
    /// holds one.
    pub(crate) fn adopt_dock(
        &mut self,
        to: ControllerId,
        suppressor: DockSuppressor,
    ) -> Option<DockSuppressor> {
        match self.registry.get_mut(to) {
            Some(controller) if controller.hidden_dock.is_none() => {
                log::debug!("{to} adopted the dock suppressor");
                controller.hidden_dock = Some(suppressor);
                None
            }
            _ => Some(suppressor),
        }
    }
}
