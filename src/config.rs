//! Configuration re-exports and the coordinator's derived snapshot.
//!
//! The coordinator never reads `Config` directly. It works from a
//! `DerivedConfig` built once per load or reload, so a config change is
//! always observed as one point-in-time replacement.

pub use quickterm_config::{
    Config, ConfigError, FullscreenMode, LogLevel, QuickTerminalPosition, QuickTerminalScreen,
    QuickTerminalSize, SizeDimension, SpaceBehavior, TitlebarStyle,
};

use crate::chrome::{ChromeVariant, WindowChromeAdapter};
use crate::host::WindowAppearance;
use std::time::Duration;

/// Typed values the overlay coordinator consumes
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedConfig {
    pub screen: QuickTerminalScreen,
    pub position: QuickTerminalPosition,
    pub size: QuickTerminalSize,
    pub animation_duration: Duration,
    pub auto_hide: bool,
    pub space_behavior: SpaceBehavior,
    pub auto_hide_suppression: Duration,
    pub titlebar_style: TitlebarStyle,
    pub window_decoration: bool,
    pub background_opacity: f64,
    pub background_blur: u32,
    pub fullscreen_mode: FullscreenMode,
    /// Tabs requested by config and supported by the window chrome
    pub tabs_enabled: bool,
}

impl DerivedConfig {
    pub fn chrome(&self) -> ChromeVariant {
        WindowChromeAdapter::for_config(self)
    }

    pub fn appearance(&self) -> WindowAppearance {
        WindowAppearance {
            opacity: self.background_opacity,
            blur_radius: self.background_blur,
        }
    }
}

impl From<&Config> for DerivedConfig {
    fn from(config: &Config) -> Self {
        let duration = config.quick_terminal_animation_duration;
        let animation_duration = if duration.is_finite() && duration > 0.0 {
            Duration::from_secs_f64(duration)
        } else {
            Duration::ZERO
        };
        let chrome = WindowChromeAdapter::variant(config.window_decoration, config.titlebar_style);

        Self {
            screen: config.quick_terminal_screen,
            position: config.quick_terminal_position,
            size: config.quick_terminal_size,
            animation_duration,
            auto_hide: config.quick_terminal_autohide,
            space_behavior: config.quick_terminal_space_behavior,
            auto_hide_suppression: Duration::from_millis(config.auto_hide_suppression_ms),
            titlebar_style: config.titlebar_style,
            window_decoration: config.window_decoration,
            background_opacity: config.background_opacity.clamp(0.0, 1.0),
            background_blur: config.background_blur,
            fullscreen_mode: config.fullscreen_mode,
            tabs_enabled: config.quick_terminal_tabs && chrome.supports_tabs(),
        }
    }
}

impl Default for DerivedConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_defaults() {
        let derived = DerivedConfig::default();
        assert_eq!(derived.animation_duration, Duration::from_millis(200));
        assert_eq!(derived.auto_hide_suppression, Duration::from_millis(250));
        assert_eq!(derived.chrome(), ChromeVariant::TransparentTitlebar);
        assert!(derived.tabs_enabled);
    }

    #[test]
    fn test_tabs_disabled_without_decoration() {
        let derived = DerivedConfig::from(&Config::default().with_decoration(false));
        assert_eq!(derived.chrome(), ChromeVariant::Borderless);
        assert!(!derived.tabs_enabled);
    }

    #[test]
    fn test_negative_duration_becomes_zero() {
        let derived = DerivedConfig::from(&Config::default().with_animation_duration(-3.0));
        assert_eq!(derived.animation_duration, Duration::ZERO);
    }
}
