// Library exports for the overlay coordinator, its headless host and the CLI
//
// # Threading
//
// `QuickTerminalManager` is single-threaded: every event, timer and host
// callback is delivered on the host's UI thread. The only shared state is
// behind `parking_lot::Mutex`:
//
//   - the debug log file (`debug::DEBUG_LOGGER`)
//   - `scheduler::ManualClock` offsets, shared between a test and the manager
//   - `headless::HeadlessDock` preference state
//
// Surfaces are `Rc` and never cross threads.

/// Crate version, logged at startup.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[macro_use]
pub mod debug;

pub mod chrome;
pub mod cli;
pub mod config;
pub mod dock;
pub mod geometry;
pub mod headless;
pub mod host;
pub mod position;
pub mod quick_terminal;
pub mod restoration;
pub mod retry;
pub mod scheduler;
pub mod screen_cache;
pub mod surface;

pub use quick_terminal::{
    Controller, ControllerId, OverlayEvent, OverlayNotification, QuickTerminalManager, TabError,
};
