//! Show/hide state machine.
//!
//! The logical `visible` flag flips synchronously when a transition starts;
//! the window converges when the host reports the animation finished.
//! Completion handlers re-check the flag and skip their terminal side effects
//! when the state moved on in the meantime.

use super::{
    AnimationKind, ControllerId, InFlight, QuickTerminalManager, ScheduledTask,
};
use crate::geometry::Screen;
use crate::host::{AnimationId, AnimationRequest, Easing, WindowHost, WindowId, WindowLevel};
use crate::surface::SurfaceRequest;

impl<H: WindowHost> QuickTerminalManager<H> {
    /// Global toggle: affects the most recently active overlay, creating the
    /// first one on demand
    pub fn toggle(&mut self) {
        let target = match self
            .registry
            .last_active()
            .or_else(|| self.registry.first())
        {
            Some(id) => id,
            None => match self.create_controller(SurfaceRequest::shell(), true) {
                Some(id) => id,
                None => return,
            },
        };
        self.toggle_controller(target);
    }

    /// Toggle `id`'s group. When hidden and another group was used more
    /// recently, that group is toggled instead.
    pub fn toggle_controller(&mut self, id: ControllerId) {
        if self.registry.get(id).is_none() {
            log::debug!("toggle: unknown controller {id}");
            return;
        }

        if self.is_group_visible(id) {
            self.animate_out(id);
            return;
        }

        if let Some(last) = self.registry.last_active()
            && !self.group(id).contains(&last)
        {
            log::debug!("toggle: delegating {id} -> most recent {last}");
            if self.is_group_visible(last) {
                self.animate_out(last);
            } else {
                self.animate_in(last);
            }
            return;
        }

        self.animate_in(id);
    }

    /// Open a one-shot overlay running `command`; never persisted
    pub fn open_with_command(&mut self, command: &str) -> Option<ControllerId> {
        let id = self.create_controller(SurfaceRequest::command(command), false)?;
        crate::debug_info!("QUICK", "{} runs one-shot command {:?}", id, command);
        self.animate_in(id);
        Some(id)
    }

    /// Slide the overlay in. No-op while the group is already visible.
    pub fn animate_in(&mut self, id: ControllerId) {
        let Some(window) = self.registry.window_of(id) else {
            log::debug!("animate_in: unknown controller {id}");
            return;
        };
        let Some(screen) = self.target_screen() else {
            log::warn!("animate_in: no screen available, skipping show of {id}");
            return;
        };

        let group = self.group(id);
        if self.is_group_visible(id) {
            log::trace!("animate_in: {id} already visible");
            return;
        }

        self.set_group_visible(&group, true);
        self.host.select_tab(window);

        // Pick up a position change that arrived while the group was shown
        let position = self.config.position;
        for member in &group {
            if let Some(controller) = self.registry.get_mut(*member) {
                controller.position = position;
            }
        }

        let current = self.host.current_app();
        if let Some(app) = self.host.frontmost_app().filter(|app| *app != current) {
            self.set_group_previous_app(&group, Some(app));
        }
        let space = self.host.active_space();
        self.set_group_previous_space(&group, Some(space));

        self.materialize(id);
        self.slide_in(id, window, &screen);
    }

    /// Place `window` at its start frame and animate it to the final one
    pub(crate) fn slide_in(&mut self, id: ControllerId, window: WindowId, screen: &Screen) {
        let group = self.group(id);
        let policy = self.policy_for(id);
        let last_closed = self.screen_cache.frame_for(screen);
        let target = policy.set_initial(&mut self.host, window, screen, last_closed);
        self.host.set_ignores_mouse_events(window, false);

        if policy.conflicts_with_dock(screen) {
            self.suppress_dock(&group, id);
        }

        // Above the menu bar while sliding; lowered once the slide lands
        self.host.set_level(window, WindowLevel::PopUpMenu);
        self.host.make_key_and_order_front(window);

        let animation = self.host.animate(
            window,
            AnimationRequest {
                frame: target,
                alpha: 1.0,
                duration: self.config.animation_duration,
                easing: Easing::EaseOut,
            },
        );
        self.animations.insert(
            animation,
            InFlight {
                controller: id,
                kind: AnimationKind::In,
            },
        );
        crate::debug_info!(
            "QUICK",
            "{} animating in to {} on {}",
            id,
            target,
            screen.id
        );
    }

    /// Slide the overlay out. No-op unless the group is visible.
    pub fn animate_out(&mut self, id: ControllerId) {
        let Some(window) = self.registry.window_of(id) else {
            log::debug!("animate_out: unknown controller {id}");
            return;
        };
        if !self.is_group_visible(id) {
            log::trace!("animate_out: {id} already hidden");
            return;
        }

        let group = self.group(id);
        self.registry.set_last_active(Some(id));
        self.host.select_tab(window);
        self.set_group_visible(&group, false);

        if self.host.is_fullscreen(window) {
            self.host.exit_fullscreen(window);
        }

        let screen = self.screen_for(window);
        let frame = self.host.frame(window);
        let anchored = self
            .registry
            .get(id)
            .is_some_and(|c| c.position == self.config.position);
        if anchored && let (Some(screen), Some(frame)) = (&screen, frame) {
            let connected = self.host.screens();
            self.screen_cache.save(screen, frame, &connected);
        }

        self.release_dock(&group);

        // Reactivate before animating so focus does not trail the slide
        let previous_app = self.registry.get(id).and_then(|c| c.previous_app);
        if let Some(app) = previous_app {
            self.host.activate_app(app);
            self.set_group_previous_app(&group, None);
        }

        let (Some(screen), Some(frame)) = (screen, frame) else {
            log::warn!("animate_out: {id} has no frame or screen, hiding immediately");
            self.finish_hide(id);
            return;
        };

        let target = self.policy_for(id).initial_frame(&frame, &screen);
        let animation = self.host.animate(
            window,
            AnimationRequest {
                frame: target,
                alpha: 0.0,
                duration: self.config.animation_duration,
                easing: Easing::EaseIn,
            },
        );
        self.animations.insert(
            animation,
            InFlight {
                controller: id,
                kind: AnimationKind::Out,
            },
        );
        crate::debug_info!("QUICK", "{} animating out to {}", id, target);
    }

    /// Host callback: an animation started by this manager landed
    pub(crate) fn animation_finished(&mut self, animation: AnimationId) {
        let Some(in_flight) = self.animations.remove(&animation) else {
            log::trace!("ignoring unknown animation {:?}", animation);
            return;
        };
        match in_flight.kind {
            AnimationKind::In => self.finish_show(in_flight.controller),
            AnimationKind::Out => self.finish_hide(in_flight.controller),
        }
    }

    fn finish_show(&mut self, id: ControllerId) {
        let Some(controller) = self.registry.get(id) else {
            return;
        };
        if !controller.visible {
            log::debug!("{id}: show finished after a hide, skipping focus");
            return;
        }
        let window = controller.window;

        // Tabs left transparent by an earlier hide through another tab
        let group = self.group(id);
        self.set_group_transparent(&group, false);
        self.host.set_level(window, WindowLevel::Floating);
        self.focus_surface(id);
        self.host.make_key_and_order_front(window);
        self.registry.set_last_active(Some(id));

        if !self.host.is_app_active() {
            let app = self.host.current_app();
            self.host.activate_app(app);
            self.schedule(
                self.retry.interval,
                ScheduledTask::FocusRetry {
                    controller: id,
                    attempt: 1,
                },
            );
        }
    }

    pub(crate) fn finish_hide(&mut self, id: ControllerId) {
        let Some(controller) = self.registry.get(id) else {
            return;
        };
        if controller.visible {
            log::debug!("{id}: hide finished after a show, leaving window up");
            return;
        }
        let window = controller.window;

        let group = self.group(id);
        if group.len() > 1 {
            // Ordering out one tab would take the whole tab strip with it.
            // Every tab goes transparent, including the one selected next.
            self.set_group_transparent(&group, true);
        } else {
            self.host.order_out(window);
        }
    }

    /// Alpha and mouse handling for every tab window of `group`
    pub(crate) fn set_group_transparent(&mut self, group: &[ControllerId], transparent: bool) {
        let alpha = if transparent { 0.0 } else { 1.0 };
        for member in group {
            if let Some(window) = self.registry.window_of(*member) {
                self.host.set_alpha(window, alpha);
                self.host.set_ignores_mouse_events(window, transparent);
            }
        }
    }

    /// Timer: keep activating until the window is key or attempts run out
    pub(crate) fn retry_focus(&mut self, id: ControllerId, attempt: u32) {
        let Some(controller) = self.registry.get(id) else {
            return;
        };
        if !controller.visible {
            return;
        }
        let window = controller.window;
        if self.host.is_key(window) {
            log::debug!("{id}: key after {attempt} activation attempt(s)");
            return;
        }

        let now = self.clock.now();
        if self.retry.next_after(attempt, now).is_none() {
            log::debug!("{id}: giving up on focus after {attempt} attempts");
            return;
        }

        self.host.make_key_and_order_front(window);
        let app = self.host.current_app();
        self.host.activate_app(app);
        self.schedule(
            self.retry.interval,
            ScheduledTask::FocusRetry {
                controller: id,
                attempt: attempt + 1,
            },
        );
    }

    /// Timer: a freshly created visible tab should have ended up key
    pub(crate) fn ensure_key(&mut self, id: ControllerId) {
        let Some(controller) = self.registry.get(id) else {
            return;
        };
        if controller.visible && !self.host.is_key(controller.window) {
            let window = controller.window;
            log::debug!("{id}: new tab was not key, retrying");
            self.host.make_key_and_order_front(window);
        }
    }
}
