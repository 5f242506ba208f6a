//! Screen state cache round trips and the restoration record.

mod common;

use common::{Harness, external_screen, laptop_screen};
use quickterm::config::Config;
use quickterm::geometry::{Rect, Screen};
use quickterm::host::WindowHost;
use quickterm::restoration;
use quickterm::surface::Surface;

const USER_FRAME: Rect = Rect::new(100.0, 400.0, 800.0, 400.0);

/// Show, move the overlay by hand to `frame`, hide
fn cycle_with_frame(h: &mut Harness, frame: Rect) -> quickterm::ControllerId {
    let id = h.show();
    let window = h.window_of(id);
    h.host_mut().set_frame(window, frame);
    h.manager.toggle();
    h.settle();
    id
}

#[test]
fn test_hidden_frame_reused_by_fresh_controller() {
    let mut h = Harness::new();
    cycle_with_frame(&mut h, USER_FRAME);
    assert_eq!(
        h.manager.screen_cache().frame_for(&laptop_screen()),
        Some(USER_FRAME)
    );

    let fresh = h.manager.open_with_command("htop").unwrap();
    h.settle();
    assert_eq!(h.frame(fresh), USER_FRAME);
}

#[test]
fn test_same_controller_reopens_where_left() {
    let mut h = Harness::new();
    let id = cycle_with_frame(&mut h, USER_FRAME);
    h.manager.toggle();
    h.settle();
    assert_eq!(h.frame(id), USER_FRAME);
}

#[test]
fn test_degenerate_frame_is_not_cached() {
    let mut h = Harness::new();
    let id = cycle_with_frame(&mut h, Rect::new(10.0, 10.0, 0.0, 0.0));
    assert!(h.manager.screen_cache().is_empty());

    h.manager.toggle();
    h.settle();
    assert_eq!(h.frame(id), Rect::new(0.0, 673.75, 1440.0, 201.25));
}

#[test]
fn test_changed_display_geometry_ignores_cached_frame() {
    let mut h = Harness::new();
    let id = cycle_with_frame(&mut h, USER_FRAME);

    // Same display id, new resolution
    let resized = Screen::new(
        1,
        Rect::new(0.0, 0.0, 1280.0, 800.0),
        Rect::new(0.0, 0.0, 1280.0, 775.0),
    );
    h.host_mut().set_screens(vec![resized]);
    h.manager.toggle();
    h.settle();
    assert_eq!(h.frame(id), Rect::new(0.0, 581.25, 1280.0, 193.75));
}

#[test]
fn test_frames_are_cached_per_display() {
    let mut h = Harness::build(
        Config::default(),
        vec![laptop_screen(), external_screen()],
        None,
    );
    let id = cycle_with_frame(&mut h, USER_FRAME);

    h.host_mut().set_main_screen(1);
    h.manager.toggle();
    h.settle();
    // Nothing cached for the external display yet: default placement there
    assert_eq!(h.frame(id), Rect::new(1440.0, 791.25, 1920.0, 263.75));
    h.manager.toggle();
    h.settle();

    assert_eq!(h.manager.screen_cache().len(), 2);
    assert_eq!(
        h.manager.screen_cache().frame_for(&laptop_screen()),
        Some(USER_FRAME)
    );
}

#[test]
fn test_restoration_record_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quick_terminal.yaml");

    let saved_surface = {
        let mut h = Harness::new();
        let id = cycle_with_frame(&mut h, USER_FRAME);
        let state = h.manager.capture_restoration().unwrap();
        restoration::save_to(&state, &path).unwrap();
        h.surface(id).id()
    };

    let state = restoration::load_from(&path).unwrap().unwrap();
    assert_eq!(state.focused_surface(), Some(saved_surface));

    let mut h = Harness::build(Config::default(), vec![laptop_screen()], Some(state));
    let id = h.show();
    assert_eq!(h.frame(id), USER_FRAME);
    assert_eq!(h.surface(id).id(), saved_surface);
    assert_eq!(h.surfaces.created(), 1);
}

#[test]
fn test_unrestorable_surface_falls_back_to_fresh_shell() {
    let mut source = Harness::new();
    let id = cycle_with_frame(&mut source, USER_FRAME);
    let saved_surface = source.surface(id).id();
    let state = source.manager.capture_restoration().unwrap();

    let mut h = Harness::build(Config::default(), vec![laptop_screen()], Some(state));
    h.surfaces.forget(saved_surface);
    let id = h.show();
    assert_ne!(h.surface(id).id(), saved_surface);
    // The cached frame still applies
    assert_eq!(h.frame(id), USER_FRAME);
}

#[test]
fn test_one_shot_overlay_is_not_captured() {
    let mut h = Harness::new();
    h.manager.open_with_command("ssh build-box").unwrap();
    h.settle();
    assert!(h.manager.capture_restoration().is_none());
}

#[test]
fn test_capture_before_first_show_keeps_restored_layout() {
    let mut source = Harness::new();
    let id = cycle_with_frame(&mut source, USER_FRAME);
    let saved_surface = source.surface(id).id();
    let state = source.manager.capture_restoration().unwrap();

    let h = Harness::build(Config::default(), vec![laptop_screen()], Some(state));
    let recaptured = h.manager.capture_restoration().unwrap();
    assert_eq!(recaptured.focused_surface(), Some(saved_surface));
    assert_eq!(
        recaptured.screen_state.frame_for(&laptop_screen()),
        Some(USER_FRAME)
    );
}

#[test]
fn test_missing_record_loads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    assert!(
        restoration::load_from(&dir.path().join("absent.yaml"))
            .unwrap()
            .is_none()
    );
}
