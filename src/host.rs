//! Contract between the overlay coordinator and the host window system.
//!
//! The coordinator never touches platform APIs directly. Everything it needs
//! from the windowing layer (frames, levels, key status, animation, tab
//! groups, spaces, application activation and modal prompts) goes through
//! [`WindowHost`], which keeps the state machine unit-testable without a live
//! window server. [`crate::headless::HeadlessHost`] is the in-memory
//! implementation used by tests and the replay tool.

use crate::chrome::ChromeVariant;
use crate::geometry::{Point, Rect, Screen};
use quickterm_config::SpaceBehavior;
use std::fmt;
use std::time::Duration;

/// Host-assigned window identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

/// A running application (process) as seen by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AppId(pub u32);

/// Virtual desktop (space / workspace) identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpaceId(pub u64);

/// Handle for an in-flight animation; echoed back on completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationId(pub u64);

/// Window stacking level, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WindowLevel {
    Normal,
    /// Above normal windows but below transient UI such as IME popups
    Floating,
    /// Above the menu bar; only held while sliding
    PopUpMenu,
}

/// Timing curve of an animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    EaseIn,
    EaseOut,
}

/// One frame/alpha animation of a window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationRequest {
    pub frame: Rect,
    pub alpha: f64,
    pub duration: Duration,
    pub easing: Easing,
}

/// Snapshot of an OS tab group object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabGroupInfo {
    /// Windows in tab-strip order
    pub windows: Vec<WindowId>,
    pub selected: Option<WindowId>,
}

/// Visual appearance applied to every overlay window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowAppearance {
    pub opacity: f64,
    pub blur_radius: u32,
}

/// Why tabs are about to be closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseIntent {
    Tab,
    OtherTabs,
    TabsToRight,
}

/// Blocking confirmation shown before destroying tabs with live processes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub intent: CloseIntent,
    /// Number of tabs the confirmation covers
    pub count: usize,
    pub title: String,
    pub message: String,
}

impl ConfirmPrompt {
    pub fn for_close(intent: CloseIntent, count: usize) -> Self {
        let title = match intent {
            CloseIntent::Tab => "Close Tab?".to_string(),
            CloseIntent::OtherTabs => "Close Other Tabs?".to_string(),
            CloseIntent::TabsToRight => "Close Tabs to the Right?".to_string(),
        };
        let plural = if count == 1 { "" } else { "s" };
        let message = format!(
            "This will close {count} tab{plural}. A process is still running and will be terminated."
        );
        Self {
            intent,
            count,
            title,
            message,
        }
    }
}

/// Blocking, informational alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// The current fullscreen mode cannot host a tab strip
    TabsUnavailableInFullscreen,
    /// Tabs are disabled by configuration or window chrome
    TabsDisabled,
}

impl Alert {
    pub fn message(&self) -> &'static str {
        match self {
            Alert::TabsUnavailableInFullscreen => {
                "Tabs aren't supported in non-native fullscreen. Exit fullscreen and try again."
            }
            Alert::TabsDisabled => "Tabs are disabled for the quick terminal.",
        }
    }
}

/// Windowing, animation and notification primitives of the host platform.
///
/// Every method tolerates stale ids: operations on a closed window are no-ops
/// and queries return `None`/`false`.
pub trait WindowHost {
    // ── Screens ─────────────────────────────────────────────────────────

    /// Screen holding the key window, or the primary screen
    fn main_screen(&self) -> Option<Screen>;
    fn screen_with_mouse(&self) -> Option<Screen>;
    /// Screen that carries the menu bar
    fn menu_bar_screen(&self) -> Option<Screen>;
    /// Screen the window currently sits on
    fn screen_of(&self, window: WindowId) -> Option<Screen>;
    fn screens(&self) -> Vec<Screen>;

    // ── Window lifecycle ────────────────────────────────────────────────

    /// Create a hidden, empty window of the given chrome
    fn create_window(&mut self, chrome: ChromeVariant) -> Option<WindowId>;
    /// Tear down `window` and build a replacement with new chrome in the same
    /// tab position. Returns the replacement.
    fn rebuild_window(&mut self, window: WindowId, chrome: ChromeVariant) -> Option<WindowId>;
    fn close_window(&mut self, window: WindowId);

    // ── Geometry and appearance ─────────────────────────────────────────

    fn frame(&self, window: WindowId) -> Option<Rect>;
    fn set_frame(&mut self, window: WindowId, frame: Rect);
    fn set_frame_origin(&mut self, window: WindowId, origin: Point);
    fn level(&self, window: WindowId) -> Option<WindowLevel>;
    fn set_level(&mut self, window: WindowId, level: WindowLevel);
    fn set_alpha(&mut self, window: WindowId, alpha: f64);
    fn set_ignores_mouse_events(&mut self, window: WindowId, ignore: bool);
    fn set_appearance(&mut self, window: WindowId, appearance: WindowAppearance);
    fn set_space_behavior(&mut self, window: WindowId, behavior: SpaceBehavior);

    // ── Ordering and key status ─────────────────────────────────────────

    fn make_key_and_order_front(&mut self, window: WindowId);
    /// Remove the window from screen entirely
    fn order_out(&mut self, window: WindowId);
    fn is_key(&self, window: WindowId) -> bool;
    fn key_window(&self) -> Option<WindowId>;
    /// A modal sheet (alert, save panel) is attached to the window
    fn has_attached_sheet(&self, window: WindowId) -> bool;

    // ── Fullscreen ──────────────────────────────────────────────────────

    fn is_fullscreen(&self, window: WindowId) -> bool;
    fn exit_fullscreen(&mut self, window: WindowId);

    // ── Animation ───────────────────────────────────────────────────────

    /// Start animating; completion is reported back as
    /// `OverlayEvent::AnimationFinished` with the returned id.
    fn animate(&mut self, window: WindowId, request: AnimationRequest) -> AnimationId;

    // ── Tabs ────────────────────────────────────────────────────────────

    /// OS tab group object, if the window has been registered into one
    fn tab_group(&self, window: WindowId) -> Option<TabGroupInfo>;
    /// Raw list of windows tabbed with this one
    fn tabbed_windows(&self, window: WindowId) -> Option<Vec<WindowId>>;
    /// Attach `child` as a tab directly after `parent`
    fn add_tabbed_window(&mut self, parent: WindowId, child: WindowId);
    fn select_tab(&mut self, window: WindowId);

    // ── Spaces ──────────────────────────────────────────────────────────

    fn active_space(&self) -> SpaceId;
    fn move_to_active_space(&mut self, window: WindowId);

    // ── Applications ────────────────────────────────────────────────────

    /// This process
    fn current_app(&self) -> AppId;
    fn frontmost_app(&self) -> Option<AppId>;
    /// Whether this process is the active application
    fn is_app_active(&self) -> bool;
    fn activate_app(&mut self, app: AppId);

    // ── Modal UI ────────────────────────────────────────────────────────

    /// Run a blocking confirmation; `true` means proceed
    fn confirm(&mut self, prompt: &ConfirmPrompt) -> bool;
    fn alert(&mut self, alert: &Alert);
}
