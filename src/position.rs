//! Frame computation for each anchor position.
//!
//! Pure geometry apart from `set_initial` / `set_final`, which apply a
//! computed frame pair to a host window.

use crate::geometry::{DockEdge, Point, Rect, Screen};
use crate::host::{WindowHost, WindowId};
use quickterm_config::{QuickTerminalPosition, QuickTerminalSize};

/// Placement rules for one anchor position and size setting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionPolicy {
    pub position: QuickTerminalPosition,
    pub size: QuickTerminalSize,
}

impl PositionPolicy {
    pub fn new(position: QuickTerminalPosition, size: QuickTerminalSize) -> Self {
        Self { position, size }
    }

    /// On-screen frame once the overlay is shown.
    ///
    /// A usable `last_closed` frame (non-degenerate, overlapping the visible
    /// area) wins so the overlay reopens where the user left it.
    pub fn final_frame(&self, screen: &Screen, last_closed: Option<Rect>) -> Rect {
        if let Some(frame) = last_closed
            && !frame.is_degenerate()
            && frame.intersects(&screen.visible_frame)
        {
            return frame;
        }

        let visible = screen.visible_frame;
        let (width, height) =
            self.size
                .calculate(self.position, visible.width(), visible.height());
        let sized = Rect::new(0.0, 0.0, width, height);
        sized.with_origin(self.centered_origin(&sized, screen))
    }

    /// Off-screen (or, for center, in-place) frame the slide starts from and
    /// the hide animation ends at.
    pub fn initial_frame(&self, final_frame: &Rect, screen: &Screen) -> Rect {
        let full = screen.frame;
        let origin = match self.position {
            QuickTerminalPosition::Top => Point::new(final_frame.min_x(), full.max_y()),
            QuickTerminalPosition::Bottom => {
                Point::new(final_frame.min_x(), full.min_y() - final_frame.height())
            }
            QuickTerminalPosition::Left => {
                Point::new(full.min_x() - final_frame.width(), final_frame.min_y())
            }
            QuickTerminalPosition::Right => Point::new(full.max_x(), final_frame.min_y()),
            QuickTerminalPosition::Center => final_frame.origin,
        };
        final_frame.with_origin(origin)
    }

    /// Origin that anchors `frame` to its edge of the visible area, centered
    /// along the other axis.
    pub fn centered_origin(&self, frame: &Rect, screen: &Screen) -> Point {
        let visible = screen.visible_frame;
        let center_x = visible.min_x() + (visible.width() - frame.width()) / 2.0;
        let center_y = visible.min_y() + (visible.height() - frame.height()) / 2.0;

        match self.position {
            QuickTerminalPosition::Top => Point::new(center_x, visible.max_y() - frame.height()),
            QuickTerminalPosition::Bottom => Point::new(center_x, visible.min_y()),
            QuickTerminalPosition::Left => Point::new(visible.min_x(), center_y),
            QuickTerminalPosition::Right => Point::new(visible.max_x() - frame.width(), center_y),
            QuickTerminalPosition::Center => Point::new(center_x, center_y),
        }
    }

    /// Like `centered_origin` but only recenters vertically; for top, bottom
    /// and center the horizontal position is kept.
    pub fn vertically_centered_origin(&self, frame: &Rect, screen: &Screen) -> Point {
        let visible = screen.visible_frame;
        let center_y = visible.min_y() + (visible.height() - frame.height()) / 2.0;

        match self.position {
            QuickTerminalPosition::Left => Point::new(visible.min_x(), center_y),
            QuickTerminalPosition::Right => Point::new(visible.max_x() - frame.width(), center_y),
            QuickTerminalPosition::Top
            | QuickTerminalPosition::Bottom
            | QuickTerminalPosition::Center => Point::new(frame.min_x(), center_y),
        }
    }

    /// Origin to restore after the user resized the window by hand
    pub fn resize_origin(&self, frame: &Rect, screen: &Screen) -> Point {
        match self.position {
            QuickTerminalPosition::Left | QuickTerminalPosition::Right => {
                self.vertically_centered_origin(frame, screen)
            }
            QuickTerminalPosition::Top
            | QuickTerminalPosition::Bottom
            | QuickTerminalPosition::Center => self.centered_origin(frame, screen),
        }
    }

    /// Whether the overlay shares its edge with the dock on this screen
    pub fn conflicts_with_dock(&self, screen: &Screen) -> bool {
        match (self.position, screen.dock) {
            (QuickTerminalPosition::Bottom, Some(DockEdge::Bottom))
            | (QuickTerminalPosition::Left, Some(DockEdge::Left))
            | (QuickTerminalPosition::Right, Some(DockEdge::Right)) => true,
            _ => false,
        }
    }

    /// Hide the window at its off-screen start frame; returns the final frame
    pub fn set_initial<H: WindowHost>(
        &self,
        host: &mut H,
        window: WindowId,
        screen: &Screen,
        last_closed: Option<Rect>,
    ) -> Rect {
        let target = self.final_frame(screen, last_closed);
        host.set_alpha(window, 0.0);
        host.set_frame(window, self.initial_frame(&target, screen));
        target
    }

    /// Place the window fully shown at its final frame
    pub fn set_final<H: WindowHost>(
        &self,
        host: &mut H,
        window: WindowId,
        screen: &Screen,
        last_closed: Option<Rect>,
    ) -> Rect {
        let target = self.final_frame(screen, last_closed);
        host.set_alpha(window, 1.0);
        host.set_frame(window, target);
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickterm_config::SizeDimension;

    /// 1440x900 display with a 25pt menu bar and a 70pt dock at the bottom
    fn screen() -> Screen {
        Screen::new(
            1,
            Rect::new(0.0, 0.0, 1440.0, 900.0),
            Rect::new(0.0, 70.0, 1440.0, 805.0),
        )
        .with_dock(DockEdge::Bottom)
    }

    fn policy(position: QuickTerminalPosition) -> PositionPolicy {
        PositionPolicy::new(position, QuickTerminalSize::default())
    }

    #[test]
    fn test_top_final_frame_hugs_menu_bar() {
        let frame = policy(QuickTerminalPosition::Top).final_frame(&screen(), None);
        assert_eq!(frame.width(), 1440.0);
        assert_eq!(frame.height(), 805.0 * 0.25);
        assert_eq!(frame.max_y(), 875.0);
        assert_eq!(frame.min_x(), 0.0);
    }

    #[test]
    fn test_initial_frames_are_off_screen() {
        let s = screen();
        for position in [
            QuickTerminalPosition::Top,
            QuickTerminalPosition::Bottom,
            QuickTerminalPosition::Left,
            QuickTerminalPosition::Right,
        ] {
            let p = policy(position);
            let target = p.final_frame(&s, None);
            let start = p.initial_frame(&target, &s);
            assert!(
                !start.intersects(&s.frame),
                "{position:?} should start outside the display"
            );
            assert_eq!(start.size, target.size);
        }
    }

    #[test]
    fn test_center_fades_in_place() {
        let s = screen();
        let p = policy(QuickTerminalPosition::Center);
        let target = p.final_frame(&s, None);
        assert_eq!(p.initial_frame(&target, &s), target);
        assert_eq!(target.min_x(), 360.0);
    }

    #[test]
    fn test_last_closed_frame_overrides_default() {
        let s = screen();
        let closed = Rect::new(100.0, 300.0, 900.0, 400.0);
        assert_eq!(
            policy(QuickTerminalPosition::Top).final_frame(&s, Some(closed)),
            closed
        );
    }

    #[test]
    fn test_unusable_last_closed_frame_is_ignored() {
        let s = screen();
        let p = policy(QuickTerminalPosition::Top);
        let default = p.final_frame(&s, None);
        assert_eq!(p.final_frame(&s, Some(Rect::default())), default);
        assert_eq!(
            p.final_frame(&s, Some(Rect::new(5000.0, 5000.0, 100.0, 100.0))),
            default
        );
    }

    #[test]
    fn test_explicit_size_for_right() {
        let s = screen();
        let p = PositionPolicy::new(
            QuickTerminalPosition::Right,
            QuickTerminalSize {
                primary: Some(SizeDimension::Pixels(500)),
                secondary: Some(SizeDimension::Percentage(50.0)),
            },
        );
        let frame = p.final_frame(&s, None);
        assert_eq!(frame.width(), 500.0);
        assert_eq!(frame.height(), 402.5);
        assert_eq!(frame.max_x(), 1440.0);
        assert_eq!(frame.min_y(), 70.0 + (805.0 - 402.5) / 2.0);
    }

    #[test]
    fn test_resize_origin_keeps_edge_anchor() {
        let s = screen();
        let resized = Rect::new(37.0, 12.0, 600.0, 300.0);

        let top = policy(QuickTerminalPosition::Top).resize_origin(&resized, &s);
        assert_eq!(top, Point::new(420.0, 575.0));

        let left = policy(QuickTerminalPosition::Left).resize_origin(&resized, &s);
        assert_eq!(left, Point::new(0.0, 70.0 + (805.0 - 300.0) / 2.0));
    }

    #[test]
    fn test_vertically_centered_keeps_x_for_center() {
        let s = screen();
        let frame = Rect::new(37.0, 12.0, 600.0, 300.0);
        let origin = policy(QuickTerminalPosition::Center).vertically_centered_origin(&frame, &s);
        assert_eq!(origin.x, 37.0);
    }

    #[test]
    fn test_dock_conflict_by_edge() {
        let bottom_dock = screen();
        assert!(policy(QuickTerminalPosition::Bottom).conflicts_with_dock(&bottom_dock));
        assert!(!policy(QuickTerminalPosition::Top).conflicts_with_dock(&bottom_dock));
        assert!(!policy(QuickTerminalPosition::Center).conflicts_with_dock(&bottom_dock));

        let left_dock = screen().with_dock(DockEdge::Left);
        assert!(policy(QuickTerminalPosition::Left).conflicts_with_dock(&left_dock));
        assert!(!policy(QuickTerminalPosition::Right).conflicts_with_dock(&left_dock));

        let no_dock = Screen::new(2, Rect::new(0.0, 0.0, 800.0, 600.0), Rect::new(0.0, 0.0, 800.0, 600.0));
        assert!(!policy(QuickTerminalPosition::Bottom).conflicts_with_dock(&no_dock));
    }
}
