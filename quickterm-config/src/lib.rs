//! Configuration system for the quickterm overlay.
//!
//! This crate provides configuration loading, saving, validation and default
//! values for the drop-down terminal overlay. It includes:
//!
//! - The `Config` struct and its YAML persistence
//! - Typed enums for anchor position, screen selection, space behavior,
//!   titlebar style and fullscreen mode
//! - The `QuickTerminalSize` dimension parser and size calculation
//! - Configuration file watching

pub mod config;
pub mod defaults;
pub mod error;
mod persistence;
pub mod types;
#[cfg(feature = "watcher")]
pub mod watcher;

// Re-export main types for convenience
pub use config::Config;
pub use error::ConfigError;
pub use types::{
    FullscreenMode, LogLevel, QuickTerminalPosition, QuickTerminalScreen, QuickTerminalSize,
    SizeDimension, SpaceBehavior, TitlebarStyle,
};
