//! Focus, space and resize notifications.

use super::{ControllerId, QuickTerminalManager};
use crate::host::{WindowHost, WindowId};
use quickterm_config::SpaceBehavior;

impl<H: WindowHost> QuickTerminalManager<H> {
    pub(crate) fn focus_gained(&mut self, window: WindowId) {
        let Some(id) = self.registry.by_window(window) else {
            return;
        };
        self.registry.set_last_active(Some(id));
        self.notify_surface_focus(id, true);

        if !self.is_group_visible(id) {
            return;
        }
        if !self.is_animating(id) {
            self.host.set_alpha(window, 1.0);
            self.host.set_ignores_mouse_events(window, false);
        }
        // Re-engage the dock suppressor an app deactivation let go of
        if let Some(screen) = self.screen_for(window)
            && self.policy_for(id).conflicts_with_dock(&screen)
        {
            let group = self.group(id);
            self.suppress_dock(&group, id);
        }
    }

    pub(crate) fn focus_lost(&mut self, window: WindowId) {
        let Some(id) = self.registry.by_window(window) else {
            return;
        };
        self.notify_surface_focus(id, false);

        if !self.registry.get(id).is_some_and(|c| c.visible) {
            log::trace!("focus_lost: {id} not visible");
            return;
        }

        let group = self.group(id);
        if self.is_auto_hide_suppressed(&group) {
            log::debug!("focus_lost: auto-hide suppressed for {id}");
            return;
        }

        if let Some(key) = self.host.key_window()
            && group
                .iter()
                .any(|m| self.registry.window_of(*m) == Some(key))
        {
            log::trace!("focus_lost: focus moved within {id}'s group");
            return;
        }

        if self.host.has_attached_sheet(window) {
            log::trace!("focus_lost: {id} has a sheet attached");
            return;
        }

        if !self.host.is_app_active() {
            // The user picked another app; stay put but give the dock back
            log::debug!("focus_lost: app deactivated, restoring dock for {id}");
            self.restore_dock(&group);
            self.set_group_previous_app(&group, None);
            return;
        }

        if !self.config.auto_hide {
            return;
        }

        match self.config.space_behavior {
            SpaceBehavior::Remain => self.animate_out(id),
            SpaceBehavior::Move => {
                let current = self.host.active_space();
                let recorded = self.registry.get(id).and_then(|c| c.previous_space);
                if recorded.is_none_or(|space| space == current) {
                    self.animate_out(id);
                } else {
                    log::debug!("focus_lost: {id} follows to space {:?}", current);
                    self.follow_to_active_space(id, &group);
                }
            }
        }
    }

    pub(crate) fn space_changed(&mut self) {
        if self.config.space_behavior != SpaceBehavior::Move {
            return;
        }

        let mut moved: Vec<ControllerId> = Vec::new();
        for id in self.registry.ids() {
            if moved.contains(&id) || !self.registry.get(id).is_some_and(|c| c.visible) {
                continue;
            }
            let group = self.group(id);
            let front = self.selected_in_group(id).unwrap_or(id);
            self.follow_to_active_space(front, &group);
            moved.extend(group);
        }
    }

    pub(crate) fn resize_finished(&mut self, window: WindowId) {
        let Some(id) = self.registry.by_window(window) else {
            return;
        };
        if !self.registry.get(id).is_some_and(|c| c.visible)
            || self.is_animating(id)
            || self.host.is_fullscreen(window)
        {
            return;
        }
        let (Some(screen), Some(frame)) = (self.screen_for(window), self.host.frame(window)) else {
            return;
        };

        let origin = self.policy_for(id).resize_origin(&frame, &screen);
        log::debug!("{id}: re-anchoring after resize to ({:.1},{:.1})", origin.x, origin.y);
        self.host.set_frame_origin(window, origin);
    }

    fn follow_to_active_space(&mut self, id: ControllerId, group: &[ControllerId]) {
        let Some(window) = self.registry.window_of(id) else {
            return;
        };
        if self.host.is_fullscreen(window) {
            self.host.exit_fullscreen(window);
        }
        self.host.move_to_active_space(window);
        self.host.make_key_and_order_front(window);
        let space = self.host.active_space();
        self.set_group_previous_space(group, Some(space));
    }

    fn notify_surface_focus(&self, id: ControllerId, focused: bool) {
        let Some(controller) = self.registry.get(id) else {
            return;
        };
        if let Some(surface) = controller.tree.focus_target() {
            surface.focus_changed(focused);
        }
    }
}
