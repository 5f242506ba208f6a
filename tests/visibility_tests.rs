//! Show/hide state machine: toggle, idempotence, animation ordering, focus
//! retry and single vs multi-tab hide.

mod common;

use common::Harness;
use quickterm::{OverlayEvent, OverlayNotification};
use quickterm::config::{Config, QuickTerminalScreen};
use quickterm::geometry::Rect;
use quickterm::headless::{HEADLESS_APP, OTHER_APP};
use quickterm::host::{Easing, WindowHost, WindowLevel};
use quickterm::surface::Surface;

#[test]
fn test_first_toggle_creates_and_shows_overlay() {
    let mut h = Harness::new();
    assert!(h.manager.controllers().is_empty());

    let id = h.show();
    let state = h.window_state(id);
    assert!(h.is_visible(id));
    assert!(state.is_shown());
    assert_eq!(state.alpha, 1.0);
    assert_eq!(state.level, WindowLevel::Floating);
    assert!(!state.ignores_mouse);
    assert!(h.host().is_key(h.window_of(id)));
    // Top anchor, default 25% of the visible height, full width
    assert_eq!(h.frame(id), Rect::new(0.0, 673.75, 1440.0, 201.25));
    assert_eq!(h.surface(id).focus_grants(), 1);
}

#[test]
fn test_surface_is_created_lazily() {
    let mut h = Harness::new();
    h.manager.toggle();
    // Content is materialized by the first show, not by creation
    assert_eq!(h.surfaces.created(), 1);
    h.settle();
    h.manager.toggle();
    h.settle();
    h.manager.toggle();
    h.settle();
    assert_eq!(h.surfaces.created(), 1);
}

#[test]
fn test_animate_in_twice_is_a_single_transition() {
    let mut h = Harness::new();
    h.manager.toggle();
    let id = h.manager.controllers()[0];
    h.manager.animate_in(id);
    h.manager.animate_in(id);

    assert_eq!(h.host().animations_started(), 1);
    let shown: Vec<_> = h
        .manager
        .take_notifications()
        .into_iter()
        .filter(|n| matches!(n, OverlayNotification::VisibilityChanged { visible: true, .. }))
        .collect();
    assert_eq!(shown.len(), 1);
}

#[test]
fn test_animate_out_while_hidden_is_a_no_op() {
    let mut h = Harness::new();
    let id = h.show();
    h.manager.toggle();
    let started = h.host().animations_started();
    h.manager.animate_out(id);
    assert_eq!(h.host().animations_started(), started);
}

#[test]
fn test_slide_runs_above_menu_bar_then_drops_to_floating() {
    let mut h = Harness::new();
    h.manager.toggle();
    let id = h.manager.controllers()[0];

    let pending = h.host().pending_animations()[0];
    assert_eq!(pending.request.easing, Easing::EaseOut);
    assert_eq!(pending.request.alpha, 1.0);
    assert_eq!(h.window_state(id).level, WindowLevel::PopUpMenu);
    // Starts off-screen above the top edge
    assert_eq!(h.frame(id).min_y(), 900.0);

    h.settle();
    assert_eq!(h.window_state(id).level, WindowLevel::Floating);
}

#[test]
fn test_hide_reactivates_previous_app_before_animating() {
    let mut h = Harness::new();
    let id = h.show();
    assert_eq!(
        h.manager.controller(id).unwrap().previous_app(),
        Some(OTHER_APP)
    );

    h.manager.toggle();
    // Activation happened synchronously, the slide is still pending
    assert_eq!(h.host().activations().last(), Some(&OTHER_APP));
    assert_eq!(h.host().pending_animations().len(), 1);
    let pending = h.host().pending_animations()[0];
    assert_eq!(pending.request.easing, Easing::EaseIn);
    assert_eq!(pending.request.alpha, 0.0);
    assert_eq!(h.manager.controller(id).unwrap().previous_app(), None);
}

#[test]
fn test_single_tab_hide_orders_window_out() {
    let mut h = Harness::new();
    let id = h.show();
    h.manager.toggle();
    assert!(!h.is_visible(id));
    // Still on screen until the slide lands
    assert!(h.window_state(id).on_screen);

    h.settle();
    assert!(!h.window_state(id).on_screen);
}

#[test]
fn test_multi_tab_hide_keeps_window_transparent() {
    let mut h = Harness::new();
    let tabs = h.show_tabs(2);
    h.manager.toggle();
    h.settle();

    let selected = h.window_state(tabs[1]);
    assert!(selected.on_screen);
    assert_eq!(selected.alpha, 0.0);
    assert!(selected.ignores_mouse);
    let group = h.host().tab_group(h.window_of(tabs[1])).unwrap();
    assert_eq!(group.windows.len(), 2);
}

#[test]
fn test_multi_tab_reshow_restores_input() {
    let mut h = Harness::new();
    let tabs = h.show_tabs(2);
    h.manager.toggle();
    h.settle();
    h.manager.toggle();
    h.settle();

    let state = h.window_state(tabs[1]);
    assert!(h.is_visible(tabs[0]) && h.is_visible(tabs[1]));
    assert_eq!(state.alpha, 1.0);
    assert!(!state.ignores_mouse);
}

#[test]
fn test_multi_tab_hide_hides_every_tab() {
    let mut h = Harness::new();
    let tabs = h.show_tabs(2);
    h.manager.toggle();
    h.settle();

    for id in &tabs {
        let state = h.window_state(*id);
        assert!(!state.is_shown());
        assert!(state.ignores_mouse);
    }
}

#[test]
fn test_closing_selected_tab_while_hidden_keeps_heir_hidden() {
    let mut h = Harness::new();
    let tabs = h.show_tabs(2);
    h.manager.toggle();
    h.settle();

    let surface = h.surface(tabs[1]);
    surface.set_exited(true);
    h.manager.dispatch(OverlayEvent::SurfaceExited(surface.id()));
    h.settle();

    assert_eq!(h.manager.controllers(), vec![tabs[0]]);
    assert!(!h.is_visible(tabs[0]));
    let heir = h.window_of(tabs[0]);
    assert_eq!(h.host().tab_group(heir).unwrap().selected, Some(heir));
    let state = h.window_state(tabs[0]);
    assert!(!state.is_shown());
    assert!(state.ignores_mouse);

    // The surviving tab still comes back on the next toggle
    h.manager.toggle();
    h.settle();
    assert!(h.window_state(tabs[0]).is_shown());
}

#[test]
fn test_reshow_through_other_tab_restores_every_tab() {
    let mut h = Harness::new();
    let tabs = h.show_tabs(2);
    // Hidden through the second tab, shown again through the first
    h.manager.toggle();
    h.settle();
    h.manager.toggle_controller(tabs[0]);
    h.settle();

    let window = h.window_of(tabs[1]);
    h.host_mut().select_tab(window);
    h.host_mut().focus_window(window);
    h.manager.dispatch(OverlayEvent::FocusGained { window });

    assert!(h.is_visible(tabs[1]));
    let state = h.window_state(tabs[1]);
    assert_eq!(state.alpha, 1.0);
    assert!(!state.ignores_mouse);
}

#[test]
fn test_show_completing_after_hide_skips_focus() {
    let mut h = Harness::new();
    h.manager.toggle();
    h.manager.toggle();
    let id = h.manager.controllers()[0];
    h.settle();

    assert!(!h.is_visible(id));
    assert!(!h.window_state(id).on_screen);
    assert_eq!(h.surface(id).focus_grants(), 0);
    assert!(!h.host().activations().contains(&HEADLESS_APP));
}

#[test]
fn test_focus_retry_until_key() {
    let mut h = Harness::new();
    h.host_mut().fail_next_activations(3);
    let id = h.show();

    let ours = h
        .host()
        .activations()
        .iter()
        .filter(|app| **app == HEADLESS_APP)
        .count();
    assert_eq!(ours, 4);
    assert!(h.host().is_key(h.window_of(id)));
    assert_eq!(h.manager.pending_timers(), 0);
}

#[test]
fn test_focus_retry_gives_up_after_ten_attempts() {
    let mut h = Harness::new();
    h.host_mut().fail_next_activations(100);
    let id = h.show();

    let ours = h
        .host()
        .activations()
        .iter()
        .filter(|app| **app == HEADLESS_APP)
        .count();
    assert_eq!(ours, 10);
    // Still shown, just not key
    assert!(h.is_visible(id));
    assert!(!h.host().is_key(h.window_of(id)));
    assert_eq!(h.manager.pending_timers(), 0);
}

#[test]
fn test_toggle_delegates_to_most_recent_group() {
    let mut h = Harness::new();
    let a = h.show();
    h.manager.toggle();
    h.settle();

    let b = h.manager.open_with_command("htop").unwrap();
    h.settle();
    h.manager.toggle();
    h.settle();
    assert!(!h.is_visible(a) && !h.is_visible(b));
    assert_eq!(h.manager.last_active(), Some(b));

    // Asking for `a` brings back the overlay used last
    h.manager.toggle_controller(a);
    h.settle();
    assert!(h.is_visible(b));
    assert!(!h.is_visible(a));
}

#[test]
fn test_open_with_command_runs_one_shot_surface() {
    let mut h = Harness::new();
    let id = h.manager.open_with_command("make test").unwrap();
    h.settle();

    assert!(h.is_visible(id));
    assert_eq!(h.surface(id).command(), Some("make test"));
    assert!(!h.manager.controller(id).unwrap().is_restorable());
}

#[test]
fn test_zero_duration_still_lands_through_host() {
    let mut h = Harness::with_config(
        quickterm::config::Config::default().with_animation_duration(0.0),
    );
    h.manager.toggle();
    let pending = h.host().pending_animations()[0];
    assert!(pending.request.duration.is_zero());
    h.settle();
    assert!(h.window_state(h.manager.controllers()[0]).is_shown());
}

#[test]
fn test_no_screen_skips_show() {
    let mut h = Harness::new();
    h.host_mut().set_screens(Vec::new());
    h.manager.toggle();
    let id = h.manager.controllers()[0];
    assert!(!h.is_visible(id));
    assert_eq!(h.host().animations_started(), 0);
}

#[test]
fn test_overlay_follows_mouse_screen() {
    let mut h = Harness::build(
        Config {
            quick_terminal_screen: QuickTerminalScreen::Mouse,
            ..Config::default()
        },
        vec![common::laptop_screen(), common::external_screen()],
        None,
    );
    h.host_mut().set_mouse_screen(1);
    let id = h.show();
    assert_eq!(h.frame(id), Rect::new(1440.0, 791.25, 1920.0, 263.75));
}
