//! Shared integration test helpers for quickterm.
//!
//! Every test drives a `QuickTerminalManager<HeadlessHost>` through a
//! [`Harness`]: a headless window host, a manual clock, an in-memory dock and
//! a surface factory the test keeps a handle to.
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::Harness;
//! ```
//!
//! Note: Rust integration tests use `mod common;` (not `use`) to bring in
//! helpers from `tests/common/mod.rs`. The `#![allow(dead_code)]` attribute
//! suppresses warnings when only a subset of helpers are used per file.

#![allow(dead_code)]

use quickterm::config::Config;
use quickterm::dock::DockControl;
use quickterm::geometry::{DockEdge, Rect, Screen};
use quickterm::headless::{self, HeadlessDock, HeadlessHost, HeadlessSurface, HeadlessSurfaceFactory, HeadlessWindow};
use quickterm::host::{WindowHost, WindowId};
use quickterm::restoration::RestorationState;
use quickterm::scheduler::ManualClock;
use quickterm::{ControllerId, QuickTerminalManager};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

/// 1440x900 display with a 25pt menu bar and a 70pt dock at the bottom
pub fn laptop_screen() -> Screen {
    Screen::new(
        1,
        Rect::new(0.0, 0.0, 1440.0, 900.0),
        Rect::new(0.0, 70.0, 1440.0, 805.0),
    )
    .with_dock(DockEdge::Bottom)
}

/// 1920x1080 display to the right of the laptop, no dock
pub fn external_screen() -> Screen {
    Screen::new(
        2,
        Rect::new(1440.0, 0.0, 1920.0, 1080.0),
        Rect::new(1440.0, 0.0, 1920.0, 1055.0),
    )
}

pub struct Harness {
    pub manager: QuickTerminalManager<HeadlessHost>,
    pub clock: ManualClock,
    pub dock: Arc<HeadlessDock>,
    pub surfaces: HeadlessSurfaceFactory,
}

impl Harness {
    /// Default config on the laptop screen
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::build(config, vec![laptop_screen()], None)
    }

    pub fn build(
        config: Config,
        screens: Vec<Screen>,
        restoration: Option<RestorationState>,
    ) -> Self {
        let clock = ManualClock::new();
        let dock = Arc::new(HeadlessDock::new(false));
        let dock_control: Arc<dyn DockControl> = dock.clone();
        let surfaces = HeadlessSurfaceFactory::new();

        let mut manager = QuickTerminalManager::new(
            HeadlessHost::new(screens),
            &config,
            dock_control,
            Box::new(surfaces.clone()),
            Box::new(clock.clone()),
        );
        if let Some(state) = restoration {
            manager = manager.with_restoration(state);
        }

        Self {
            manager,
            clock,
            dock,
            surfaces,
        }
    }

    /// Land animations and run timers until idle
    pub fn settle(&mut self) -> usize {
        headless::settle(&mut self.manager, &self.clock)
    }

    pub fn advance(&mut self, by: Duration) -> usize {
        self.clock.advance(by);
        self.manager.run_due_timers()
    }

    /// Toggle the overlay in, settle, and return the shown controller
    pub fn show(&mut self) -> ControllerId {
        self.manager.toggle();
        self.settle();
        self.manager
            .last_active()
            .expect("toggle should have created an overlay")
    }

    /// Show the overlay with `count` tabs (the last one is selected);
    /// returns them in creation order
    pub fn show_tabs(&mut self, count: usize) -> Vec<ControllerId> {
        let first = self.show();
        let mut tabs = vec![first];
        for _ in 1..count {
            let parent = *tabs.last().unwrap();
            let tab = self.manager.new_tab(parent).expect("new tab");
            tabs.push(tab);
            self.settle();
        }
        // Let the post-tab auto-hide suppression lapse
        self.clock.advance(Duration::from_secs(1));
        tabs
    }

    pub fn host(&self) -> &HeadlessHost {
        self.manager.host()
    }

    pub fn host_mut(&mut self) -> &mut HeadlessHost {
        self.manager.host_mut()
    }

    pub fn window_of(&self, id: ControllerId) -> WindowId {
        self.manager
            .controller(id)
            .expect("controller exists")
            .window()
    }

    pub fn window_state(&self, id: ControllerId) -> &HeadlessWindow {
        let window = self.window_of(id);
        self.host().window(window).expect("window exists")
    }

    pub fn is_visible(&self, id: ControllerId) -> bool {
        self.manager
            .controller(id)
            .is_some_and(|c| c.is_visible())
    }

    pub fn frame(&self, id: ControllerId) -> Rect {
        self.host()
            .frame(self.window_of(id))
            .expect("window has a frame")
    }

    /// Focused (else first) surface of a controller
    pub fn surface(&self, id: ControllerId) -> Rc<HeadlessSurface> {
        let controller = self.manager.controller(id).expect("controller exists");
        let surface = controller
            .tree()
            .focus_target()
            .expect("controller has a surface");
        self.surfaces
            .get(surface.id())
            .expect("surface created by the harness factory")
    }

    /// Number of live dock suppressors across the whole manager
    pub fn suppressors(&self) -> usize {
        self.manager.dock_suppressor_count()
    }
}
