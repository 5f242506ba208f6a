//! Configuration types and enums.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Overlay placement
// ============================================================================

/// Screen edge (or center) the overlay slides from and to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuickTerminalPosition {
    /// Slides down from the top edge (default)
    #[default]
    Top,
    /// Slides up from the bottom edge
    Bottom,
    /// Slides in from the left edge
    Left,
    /// Slides in from the right edge
    Right,
    /// Fades in at the center of the screen
    Center,
}

impl QuickTerminalPosition {
    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            QuickTerminalPosition::Top => "Top",
            QuickTerminalPosition::Bottom => "Bottom",
            QuickTerminalPosition::Left => "Left",
            QuickTerminalPosition::Right => "Right",
            QuickTerminalPosition::Center => "Center",
        }
    }
}

/// Which display the overlay appears on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuickTerminalScreen {
    /// The screen holding the key window (default)
    #[default]
    Main,
    /// The screen under the mouse cursor
    Mouse,
    /// The screen that carries the menu bar
    MenuBar,
}

/// What happens when the user switches spaces while the overlay is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpaceBehavior {
    /// The overlay stays on the space it was shown on
    Remain,
    /// The overlay follows the user to the active space (default)
    #[default]
    Move,
}

// ============================================================================
// Window chrome
// ============================================================================

/// Titlebar style for overlay windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TitlebarStyle {
    /// Standard system titlebar
    Native,
    /// Titlebar drawn with the terminal background (default)
    #[default]
    Transparent,
    /// Tab strip integrated into the titlebar
    Tabs,
    /// No titlebar; the window keeps its resize border
    Hidden,
}

/// Fullscreen implementation used by overlay windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FullscreenMode {
    /// System fullscreen in a dedicated space (default)
    #[default]
    Native,
    /// Borderless fullscreen on the current space
    NonNative,
    /// Borderless fullscreen that keeps the menu bar visible
    NonNativeVisibleMenu,
}

impl FullscreenMode {
    /// Non-native fullscreen windows cannot host a tab strip
    pub fn allows_tabs(&self) -> bool {
        matches!(self, FullscreenMode::Native)
    }
}

// ============================================================================
// Logging
// ============================================================================

/// Log level for the debug log file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No logging (log file not created)
    #[default]
    Off,
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Most verbose
    Trace,
}

impl LogLevel {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

// ============================================================================
// Overlay size
// ============================================================================

/// One dimension of the overlay size: a share of the screen or a fixed length.
///
/// Written in YAML as `"40%"` or `"600px"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SizeDimension {
    /// Percentage of the visible screen dimension (0 < n <= 100)
    Percentage(f64),
    /// Absolute length in points
    Pixels(u32),
}

impl SizeDimension {
    /// Resolve against the available length, never exceeding it.
    pub fn to_points(self, available: f64) -> f64 {
        let value = match self {
            SizeDimension::Percentage(pct) => available * pct / 100.0,
            SizeDimension::Pixels(px) => f64::from(px),
        };
        value.min(available)
    }

    /// Whether the dimension describes a positive length
    pub fn is_valid(self) -> bool {
        match self {
            SizeDimension::Percentage(pct) => pct.is_finite() && pct > 0.0 && pct <= 100.0,
            SizeDimension::Pixels(px) => px > 0,
        }
    }
}

impl fmt::Display for SizeDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeDimension::Percentage(pct) => write!(f, "{pct}%"),
            SizeDimension::Pixels(px) => write!(f, "{px}px"),
        }
    }
}

impl FromStr for SizeDimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(pct) = s.strip_suffix('%') {
            pct.trim()
                .parse::<f64>()
                .map(SizeDimension::Percentage)
                .map_err(|e| format!("invalid percentage '{s}': {e}"))
        } else if let Some(px) = s.strip_suffix("px") {
            px.trim()
                .parse::<u32>()
                .map(SizeDimension::Pixels)
                .map_err(|e| format!("invalid pixel length '{s}': {e}"))
        } else {
            Err(format!(
                "invalid size '{s}': expected a percentage (\"40%\") or pixels (\"600px\")"
            ))
        }
    }
}

impl TryFrom<String> for SizeDimension {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SizeDimension> for String {
    fn from(value: SizeDimension) -> Self {
        value.to_string()
    }
}

/// Overlay size along the slide axis (`primary`) and across it (`secondary`).
///
/// For top/bottom the primary dimension is the height, for left/right it is
/// the width; for center it is the width and secondary is the height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QuickTerminalSize {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<SizeDimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<SizeDimension>,
}

impl QuickTerminalSize {
    /// Compute `(width, height)` for `position` inside a visible area.
    pub fn calculate(
        &self,
        position: QuickTerminalPosition,
        visible_width: f64,
        visible_height: f64,
    ) -> (f64, f64) {
        let resolve = |dim: Option<SizeDimension>, available: f64, fallback_share: f64| {
            dim.map(|d| d.to_points(available))
                .unwrap_or(available * fallback_share)
        };

        match position {
            QuickTerminalPosition::Top | QuickTerminalPosition::Bottom => (
                resolve(self.secondary, visible_width, 1.0),
                resolve(self.primary, visible_height, 0.25),
            ),
            QuickTerminalPosition::Left | QuickTerminalPosition::Right => (
                resolve(self.primary, visible_width, 0.25),
                resolve(self.secondary, visible_height, 1.0),
            ),
            QuickTerminalPosition::Center => (
                resolve(self.primary, visible_width, 0.5),
                resolve(self.secondary, visible_height, 0.5),
            ),
        }
    }
}
