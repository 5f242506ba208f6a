//! Screen-space geometry shared by the position policy, the screen cache and
//! the window host.
//!
//! Coordinates follow the desktop convention of the host window system:
//! origin at the bottom-left of the primary display, `y` growing upwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle: `origin` is the bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    /// A zero-area (or negative) frame carries no usable placement
    pub fn is_degenerate(&self) -> bool {
        !(self.size.width > 0.0 && self.size.height > 0.0)
    }

    /// Same size, new origin
    pub fn with_origin(&self, origin: Point) -> Self {
        Self {
            origin,
            size: self.size,
        }
    }

    /// Whether the two rectangles overlap with a non-empty area
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min_x() < other.max_x()
            && other.min_x() < self.max_x()
            && self.min_y() < other.max_y()
            && other.min_y() < self.max_y()
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.1},{:.1} {:.1}x{:.1})",
            self.origin.x, self.origin.y, self.size.width, self.size.height
        )
    }
}

/// Stable identity of a connected display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DisplayId(pub u32);

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "display-{}", self.0)
    }
}

/// Edge of a screen the dock is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DockEdge {
    Bottom,
    Left,
    Right,
}

/// A connected display as reported by the window host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    pub id: DisplayId,
    /// Full display bounds
    pub frame: Rect,
    /// Bounds minus menu bar and dock
    pub visible_frame: Rect,
    /// Edge carrying the dock on this display, if the dock lives here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dock: Option<DockEdge>,
}

impl Screen {
    pub fn new(id: u32, frame: Rect, visible_frame: Rect) -> Self {
        Self {
            id: DisplayId(id),
            frame,
            visible_frame,
            dock: None,
        }
    }

    /// Attach the dock to one edge of this screen
    pub fn with_dock(mut self, edge: DockEdge) -> Self {
        self.dock = Some(edge);
        self
    }
}
