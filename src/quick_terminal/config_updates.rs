//! Config change detection and propagation to every overlay window.
//!
//! A reload is applied as one point-in-time replacement of the
//! `DerivedConfig`. Only what changed is pushed to the windows; a chrome
//! change rebuilds them.

use super::{AnimationKind, ControllerId, QuickTerminalManager};
use crate::chrome::WindowChromeAdapter;
use crate::config::{Config, DerivedConfig};
use crate::host::{WindowHost, WindowLevel};

/// Which derived settings differ between two configs
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OverlayConfigChanges {
    /// Window chrome variant; requires a rebuild
    pub chrome: bool,
    pub appearance: bool,
    pub position: bool,
    pub space_behavior: bool,
    pub tabs: bool,
}

impl OverlayConfigChanges {
    pub fn detect(old: &DerivedConfig, new: &DerivedConfig) -> Self {
        Self {
            chrome: WindowChromeAdapter::needs_rebuild(old, new),
            appearance: old.appearance() != new.appearance(),
            position: old.position != new.position,
            space_behavior: old.space_behavior != new.space_behavior,
            tabs: old.tabs_enabled != new.tabs_enabled,
        }
    }
}

impl<H: WindowHost> QuickTerminalManager<H> {
    pub(crate) fn apply_config(&mut self, config: &Config) {
        let new = DerivedConfig::from(config);
        let changes = OverlayConfigChanges::detect(&self.config, &new);
        self.config = new;
        log::info!("Applying quick terminal config change: {:?}", changes);

        if changes.chrome {
            for id in self.registry.ids() {
                self.rebuild_controller_window(id);
            }
        }

        let windows: Vec<_> = self.registry.iter().map(|c| c.window).collect();
        let appearance = self.config.appearance();
        for window in &windows {
            self.host.set_appearance(*window, appearance);
            if changes.space_behavior {
                self.host
                    .set_space_behavior(*window, self.config.space_behavior);
            }
        }

        if changes.position {
            // Remembered frames hug the old edge
            self.screen_cache.clear();
            // A visible group keeps sliding from where it came in
            let position = self.config.position;
            for id in self.registry.ids() {
                if !self.is_group_visible(id)
                    && let Some(controller) = self.registry.get_mut(id)
                {
                    controller.position = position;
                }
            }
        }

        if changes.tabs {
            log::info!("Quick terminal tabs enabled: {}", self.config.tabs_enabled);
        }
    }

    /// Replace a controller's window with one of the current chrome,
    /// carrying frame and visibility over
    fn rebuild_controller_window(&mut self, id: ControllerId) {
        let Some(controller) = self.registry.get(id) else {
            return;
        };
        let old = controller.window;
        let visible = controller.visible;
        let frame = self.host.frame(old);
        let screen = self.screen_for(old);

        let Some(window) = self.host.rebuild_window(old, self.config.chrome()) else {
            log::warn!("Window host could not rebuild {old} for {id}");
            return;
        };
        self.registry.reindex(id, window);
        self.configure_window(window);

        // An animation on the old window will never report back
        let showing = self
            .animations
            .values()
            .any(|a| a.controller == id && a.kind == AnimationKind::In);
        self.animations.retain(|_, a| a.controller != id);

        if visible && showing {
            match self.target_screen() {
                Some(screen) => self.slide_in(id, window, &screen),
                None => log::warn!("{id}: no screen to resume the slide on"),
            }
        } else if visible {
            match screen {
                Some(screen) => {
                    self.policy_for(id)
                        .set_final(&mut self.host, window, &screen, frame);
                }
                None => self.host.set_alpha(window, 1.0),
            }
            self.host.set_ignores_mouse_events(window, false);
            self.host.set_level(window, WindowLevel::Floating);
            if self.selected_in_group(id).is_none_or(|selected| selected == id) {
                self.host.make_key_and_order_front(window);
            }
        } else {
            self.finish_hide(id);
        }
        log::debug!("{id}: rebuilt {old} as {window}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{QuickTerminalPosition, TitlebarStyle};

    #[test]
    fn test_detect_no_changes() {
        let config = DerivedConfig::default();
        assert_eq!(
            OverlayConfigChanges::detect(&config, &config.clone()),
            OverlayConfigChanges::default()
        );
    }

    #[test]
    fn test_detect_chrome_and_position() {
        let old = DerivedConfig::default();
        let new = DerivedConfig::from(
            &Config::default()
                .with_titlebar_style(TitlebarStyle::Hidden)
                .with_position(QuickTerminalPosition::Bottom),
        );
        let changes = OverlayConfigChanges::detect(&old, &new);
        assert!(changes.chrome);
        assert!(changes.position);
        // Hidden titlebars cannot show a tab strip
        assert!(changes.tabs);
        assert!(!changes.appearance);
    }

    #[test]
    fn test_detect_appearance() {
        let old = DerivedConfig::default();
        let new = DerivedConfig::from(&Config {
            background_blur: 12,
            ..Config::default()
        });
        let changes = OverlayConfigChanges::detect(&old, &new);
        assert!(changes.appearance);
        assert!(!changes.chrome);
    }
}
