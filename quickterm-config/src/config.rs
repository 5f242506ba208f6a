//! Core `Config` struct and its `Default` impl.
//!
//! Persistence (`load`, `save`, path helpers) lives in `persistence.rs`.

use crate::types::{
    FullscreenMode, LogLevel, QuickTerminalPosition, QuickTerminalScreen, QuickTerminalSize,
    SpaceBehavior, TitlebarStyle,
};
use serde::{Deserialize, Serialize};

/// Overlay configuration as stored in `config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // ========================================================================
    // Placement
    // ========================================================================
    /// Screen edge the overlay slides from
    #[serde(default)]
    pub quick_terminal_position: QuickTerminalPosition,

    /// Display the overlay appears on
    #[serde(default)]
    pub quick_terminal_screen: QuickTerminalScreen,

    /// Overlay size along and across the slide axis
    #[serde(default)]
    pub quick_terminal_size: QuickTerminalSize,

    // ========================================================================
    // Behavior
    // ========================================================================
    /// Slide animation duration in seconds (0 disables the animation)
    #[serde(default = "crate::defaults::animation_duration")]
    pub quick_terminal_animation_duration: f64,

    /// Hide the overlay when another window of this app or another app takes focus
    #[serde(default = "crate::defaults::bool_true")]
    pub quick_terminal_autohide: bool,

    /// Whether the overlay follows the user across spaces
    #[serde(default)]
    pub quick_terminal_space_behavior: SpaceBehavior,

    /// Allow opening additional tabs in the overlay
    #[serde(default = "crate::defaults::bool_true")]
    pub quick_terminal_tabs: bool,

    /// Milliseconds during which focus loss is ignored after internal tab moves
    #[serde(default = "crate::defaults::auto_hide_suppression_ms")]
    pub auto_hide_suppression_ms: u64,

    // ========================================================================
    // Window chrome and appearance
    // ========================================================================
    /// Titlebar style
    #[serde(default)]
    pub titlebar_style: TitlebarStyle,

    /// Show window decorations (title bar and border)
    #[serde(default = "crate::defaults::bool_true")]
    pub window_decoration: bool,

    /// Background opacity (0.0 = fully transparent, 1.0 = fully opaque)
    #[serde(default = "crate::defaults::background_opacity")]
    pub background_opacity: f64,

    /// Background blur radius (0 disables blur)
    #[serde(default = "crate::defaults::background_blur")]
    pub background_blur: u32,

    /// Fullscreen implementation
    #[serde(default)]
    pub fullscreen_mode: FullscreenMode,

    // ========================================================================
    // Diagnostics
    // ========================================================================
    /// Log level for the debug log file
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quick_terminal_position: QuickTerminalPosition::default(),
            quick_terminal_screen: QuickTerminalScreen::default(),
            quick_terminal_size: QuickTerminalSize::default(),
            quick_terminal_animation_duration: crate::defaults::animation_duration(),
            quick_terminal_autohide: true,
            quick_terminal_space_behavior: SpaceBehavior::default(),
            quick_terminal_tabs: true,
            auto_hide_suppression_ms: crate::defaults::auto_hide_suppression_ms(),
            titlebar_style: TitlebarStyle::default(),
            window_decoration: true,
            background_opacity: crate::defaults::background_opacity(),
            background_blur: crate::defaults::background_blur(),
            fullscreen_mode: FullscreenMode::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the anchor position
    pub fn with_position(mut self, position: QuickTerminalPosition) -> Self {
        self.quick_terminal_position = position;
        self
    }

    /// Set the space behavior
    pub fn with_space_behavior(mut self, behavior: SpaceBehavior) -> Self {
        self.quick_terminal_space_behavior = behavior;
        self
    }

    /// Set the animation duration in seconds
    pub fn with_animation_duration(mut self, seconds: f64) -> Self {
        self.quick_terminal_animation_duration = seconds;
        self
    }

    /// Enable or disable auto-hide on focus loss
    pub fn with_autohide(mut self, autohide: bool) -> Self {
        self.quick_terminal_autohide = autohide;
        self
    }

    /// Set the titlebar style
    pub fn with_titlebar_style(mut self, style: TitlebarStyle) -> Self {
        self.titlebar_style = style;
        self
    }

    /// Enable or disable window decorations
    pub fn with_decoration(mut self, decoration: bool) -> Self {
        self.window_decoration = decoration;
        self
    }

    /// Fix out-of-range values in place.
    ///
    /// Returns the list of fields that were corrected so callers can surface
    /// them; each correction is also logged as a warning.
    pub fn validate(&mut self) -> Vec<String> {
        let mut fixed = Vec::new();

        if !self.quick_terminal_animation_duration.is_finite()
            || self.quick_terminal_animation_duration < 0.0
        {
            log::warn!(
                "quick_terminal_animation_duration {} is invalid, using default",
                self.quick_terminal_animation_duration
            );
            self.quick_terminal_animation_duration = crate::defaults::animation_duration();
            fixed.push("quick_terminal_animation_duration".to_string());
        }

        if !self.background_opacity.is_finite() || !(0.0..=1.0).contains(&self.background_opacity)
        {
            let clamped = if self.background_opacity.is_finite() {
                self.background_opacity.clamp(0.0, 1.0)
            } else {
                crate::defaults::background_opacity()
            };
            log::warn!(
                "background_opacity {} out of range, using {}",
                self.background_opacity,
                clamped
            );
            self.background_opacity = clamped;
            fixed.push("background_opacity".to_string());
        }

        let size = &mut self.quick_terminal_size;
        if size.primary.is_some_and(|d| !d.is_valid()) {
            log::warn!(
                "quick_terminal_size.primary {:?} is not a positive length, ignoring",
                size.primary
            );
            size.primary = None;
            fixed.push("quick_terminal_size.primary".to_string());
        }
        if size.secondary.is_some_and(|d| !d.is_valid()) {
            log::warn!(
                "quick_terminal_size.secondary {:?} is not a positive length, ignoring",
                size.secondary
            );
            size.secondary = None;
            fixed.push("quick_terminal_size.secondary".to_string());
        }

        fixed
    }
}
