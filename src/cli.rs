//! Command-line interface for quickterm.
//!
//! `check-config` validates a config file and prints what the overlay would
//! use. `replay` drives the coordinator against the headless host from a
//! YAML scenario and prints the overlay state after every step.

use crate::config::{Config, DerivedConfig};
use crate::dock::DockControl;
use crate::geometry::{DockEdge, Rect, Screen};
use crate::headless::{self, HEADLESS_APP, HeadlessDock, HeadlessHost, HeadlessSurfaceFactory};
use crate::host::{AppId, SpaceId, WindowHost};
use crate::quick_terminal::{OverlayEvent, QuickTerminalManager};
use crate::scheduler::ManualClock;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// quickterm - drop-down terminal overlay coordinator
#[derive(Parser)]
#[command(name = "quickterm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level for the debug log (overrides RUST_LOG and the config file)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevelArg>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Load and validate a config file, then print the derived overlay settings
    CheckConfig {
        /// Config file (default: ~/.config/quickterm/config.yaml)
        #[arg(long, value_name = "FILE")]
        path: Option<PathBuf>,
    },
    /// Replay a YAML scenario against the headless window host
    Replay {
        /// Scenario file
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
    },
    /// Print the config, restoration and debug log paths
    Paths,
}

/// Runtime options passed from CLI to the command runner
#[derive(Clone, Debug)]
pub struct RuntimeOptions {
    pub command: Commands,
    /// Explicit log level from `--log-level`
    pub log_level: Option<log::LevelFilter>,
}

/// Result of CLI processing
pub enum CliResult {
    /// Initialise logging, then run the command
    Continue(RuntimeOptions),
    /// Exit with the given code (command completed)
    Exit(i32),
}

/// Parse arguments; commands that need no logging complete here
pub fn process_cli() -> CliResult {
    let cli = Cli::parse();

    match cli.command {
        Commands::Paths => {
            println!("config:      {}", Config::config_path().display());
            println!(
                "restoration: {}",
                crate::restoration::restoration_path().display()
            );
            println!("debug log:   {}", crate::debug::log_path().display());
            CliResult::Exit(0)
        }
        command => CliResult::Continue(RuntimeOptions {
            command,
            log_level: cli.log_level.map(|l| l.to_level_filter()),
        }),
    }
}

/// Run a parsed command, writing its report to stdout
pub fn run(options: &RuntimeOptions) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match &options.command {
        Commands::CheckConfig { path } => {
            let path = path.clone().unwrap_or_else(Config::config_path);
            check_config(&path, &mut out)
        }
        Commands::Replay { script } => {
            let script = ReplayScript::load(script)?;
            apply_config_log_level(options.log_level, &script.config);
            run_replay(&script, &mut out)
        }
        Commands::Paths => Ok(()),
    }
}

/// The config file's `log_level` only applies when neither `--log-level`
/// nor `RUST_LOG` picked one
fn apply_config_log_level(cli_level: Option<log::LevelFilter>, config: &Config) {
    if cli_level.is_some() || std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    let filter = config.log_level.to_level_filter();
    if filter != log::LevelFilter::Off {
        crate::debug::init_log_bridge(Some(filter));
    }
}

// ── check-config ─────────────────────────────────────────────────────────

fn check_config(path: &Path, out: &mut impl Write) -> Result<()> {
    if !path.exists() {
        writeln!(out, "{} does not exist; defaults apply", path.display())?;
        return write_derived(&DerivedConfig::default(), out);
    }

    let (config, fixed) = Config::load_checked(path)?;
    writeln!(out, "{}: ok", path.display())?;
    for field in &fixed {
        writeln!(out, "  corrected: {field}")?;
    }
    write_derived(&DerivedConfig::from(&config), out)
}

fn write_derived(config: &DerivedConfig, out: &mut impl Write) -> Result<()> {
    writeln!(out, "position:         {}", config.position.display_name())?;
    writeln!(out, "screen:           {:?}", config.screen)?;
    writeln!(
        out,
        "size:             {} x {}",
        config
            .size
            .primary
            .map_or_else(|| "default".to_string(), |d| d.to_string()),
        config
            .size
            .secondary
            .map_or_else(|| "default".to_string(), |d| d.to_string())
    )?;
    writeln!(out, "animation:        {:?}", config.animation_duration)?;
    writeln!(out, "auto hide:        {}", config.auto_hide)?;
    writeln!(out, "space behavior:   {:?}", config.space_behavior)?;
    writeln!(out, "chrome:           {:?}", config.chrome())?;
    writeln!(out, "tabs:             {}", config.tabs_enabled)?;
    writeln!(out, "fullscreen mode:  {:?}", config.fullscreen_mode)?;
    writeln!(
        out,
        "appearance:       opacity {:.2}, blur {}",
        config.background_opacity, config.background_blur
    )?;
    Ok(())
}

// ── replay ───────────────────────────────────────────────────────────────

/// A scenario for `quickterm replay`
///
/// ```yaml
/// config:
///   quick_terminal_position: bottom
/// steps:
///   - toggle
///   - settle
///   - new_tab
///   - activate_app: 7
///   - focus_lost
///   - advance_ms: 300
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub config: Config,
    /// Displays; the first is main. Defaults to one laptop-sized screen
    /// with the dock at the bottom.
    #[serde(default = "default_screens")]
    pub screens: Vec<Screen>,
    /// Dock auto-hide preference before the scenario starts
    #[serde(default)]
    pub dock_autohide: bool,
    pub steps: Vec<ReplayStep>,
}

impl ReplayScript {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay script {:?}", path))?;
        Self::parse(&contents).with_context(|| format!("Invalid replay script {:?}", path))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let mut script: ReplayScript = serde_yaml_ng::from_str(contents)?;
        let fixed = script.config.validate();
        if !fixed.is_empty() {
            log::warn!("Replay config corrected: {}", fixed.join(", "));
        }
        Ok(script)
    }
}

fn default_screens() -> Vec<Screen> {
    vec![
        Screen::new(
            1,
            Rect::new(0.0, 0.0, 1440.0, 900.0),
            Rect::new(0.0, 70.0, 1440.0, 805.0),
        )
        .with_dock(DockEdge::Bottom),
    ]
}

/// One scripted input. Steps that target an overlay use the most recently
/// active one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayStep {
    Toggle,
    NewTab,
    CloseTab,
    CloseOtherTabs,
    CloseTabsToRight,
    /// The overlay's window resigned key
    FocusLost,
    /// The user clicked the overlay's window
    FocusGained,
    SwitchSpace(u64),
    /// Bring an application to the front; `1` is quickterm itself
    ActivateApp(u32),
    /// Live resize of the overlay's window to the given size
    Resize {
        width: f64,
        height: f64,
    },
    AdvanceMs(u64),
    /// Land animations and run timers until idle
    Settle,
}

/// Run `script` and write the overlay state after each step
pub fn run_replay(script: &ReplayScript, out: &mut impl Write) -> Result<()> {
    let clock = ManualClock::new();
    let dock = Arc::new(HeadlessDock::new(script.dock_autohide));
    let dock_control: Arc<dyn DockControl> = dock.clone();
    let mut manager = QuickTerminalManager::new(
        HeadlessHost::new(script.screens.clone()),
        &script.config,
        dock_control,
        Box::new(HeadlessSurfaceFactory::new()),
        Box::new(clock.clone()),
    );

    for (index, step) in script.steps.iter().enumerate() {
        log::info!("replay step {}: {:?}", index + 1, step);
        writeln!(out, "step {}: {:?}", index + 1, step)?;
        if let Some(note) = apply_step(&mut manager, &clock, step) {
            writeln!(out, "  ! {note}")?;
        }
        write_state(&manager, &dock, out)?;
    }
    Ok(())
}

/// Apply one step; returns a note when the step could not act
fn apply_step(
    manager: &mut QuickTerminalManager<HeadlessHost>,
    clock: &ManualClock,
    step: &ReplayStep,
) -> Option<String> {
    const NO_OVERLAY: &str = "no quick terminal yet";

    let target = manager
        .last_active()
        .or_else(|| manager.controllers().first().copied());
    let window = target.and_then(|id| manager.controller(id).map(|c| c.window()));

    match step {
        ReplayStep::Toggle => manager.toggle(),
        ReplayStep::NewTab => {
            let Some(parent) = target else {
                return Some(NO_OVERLAY.to_string());
            };
            if let Err(e) = manager.new_tab(parent) {
                return Some(format!("new tab refused: {e}"));
            }
        }
        ReplayStep::CloseTab | ReplayStep::CloseOtherTabs | ReplayStep::CloseTabsToRight => {
            let Some(id) = target else {
                return Some(NO_OVERLAY.to_string());
            };
            match step {
                ReplayStep::CloseTab => manager.close_tab(id),
                ReplayStep::CloseOtherTabs => manager.close_other_tabs(id),
                _ => manager.close_tabs_to_right(id),
            }
        }
        ReplayStep::FocusLost | ReplayStep::FocusGained | ReplayStep::Resize { .. } => {
            let Some(window) = window else {
                return Some(NO_OVERLAY.to_string());
            };
            match step {
                ReplayStep::FocusLost => {
                    if manager.host().key_window() == Some(window) {
                        manager.host_mut().clear_key_window();
                    }
                    manager.dispatch(OverlayEvent::FocusLost { window });
                }
                ReplayStep::FocusGained => {
                    manager.host_mut().focus_window(window);
                    manager.dispatch(OverlayEvent::FocusGained { window });
                }
                ReplayStep::Resize { width, height } => {
                    let frame = manager.host().frame(window)?;
                    let resized = Rect::new(frame.min_x(), frame.min_y(), *width, *height);
                    manager.host_mut().set_frame(window, resized);
                    manager.dispatch(OverlayEvent::ResizeFinished { window });
                }
                _ => {}
            }
        }
        ReplayStep::SwitchSpace(space) => {
            manager.host_mut().switch_space(SpaceId(*space));
            manager.dispatch(OverlayEvent::SpaceChanged);
        }
        ReplayStep::ActivateApp(app) => {
            let app = AppId(*app);
            if app == HEADLESS_APP {
                manager.host_mut().activate_app(app);
            } else {
                manager.host_mut().focus_other_app(app);
            }
        }
        ReplayStep::AdvanceMs(ms) => {
            clock.advance(Duration::from_millis(*ms));
            manager.run_due_timers();
        }
        ReplayStep::Settle => {
            headless::settle(manager, clock);
        }
    }
    None
}

fn write_state(
    manager: &QuickTerminalManager<HeadlessHost>,
    dock: &HeadlessDock,
    out: &mut impl Write,
) -> Result<()> {
    let host = manager.host();
    for id in manager.controllers() {
        let Some(controller) = manager.controller(id) else {
            continue;
        };
        let window = controller.window();
        let Some(state) = host.window(window) else {
            writeln!(out, "  {id} {window} (gone)")?;
            continue;
        };
        writeln!(
            out,
            "  {id} {window} {} alpha={:.2} level={:?} frame={}{}",
            if controller.is_visible() { "visible" } else { "hidden" },
            state.alpha,
            state.level,
            state.frame,
            if host.is_key(window) { " key" } else { "" },
        )?;
    }
    writeln!(
        out,
        "  last_active={} dock_hidden={} animations={} timers={}",
        manager
            .last_active()
            .map_or_else(|| "-".to_string(), |id| id.to_string()),
        dock.presentation_holds() > 0,
        host.pending_animations().len(),
        manager.pending_timers(),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuickTerminalPosition;

    #[test]
    fn test_parse_replay_script() {
        let script = ReplayScript::parse(
            r#"
config:
  quick_terminal_position: left
steps:
  - toggle
  - advance_ms: 25
  - activate_app: 7
  - resize: { width: 500, height: 700 }
  - settle
"#,
        )
        .unwrap();

        assert_eq!(
            script.config.quick_terminal_position,
            QuickTerminalPosition::Left
        );
        assert_eq!(script.screens.len(), 1);
        assert_eq!(
            script.steps,
            vec![
                ReplayStep::Toggle,
                ReplayStep::AdvanceMs(25),
                ReplayStep::ActivateApp(7),
                ReplayStep::Resize {
                    width: 500.0,
                    height: 700.0
                },
                ReplayStep::Settle,
            ]
        );
    }

    #[test]
    fn test_replay_show_then_hide() {
        let script = ReplayScript::parse("steps: [toggle, settle, toggle, settle]").unwrap();
        let mut out = Vec::new();
        run_replay(&script, &mut out).unwrap();

        let report = String::from_utf8(out).unwrap();
        let states: Vec<&str> = report
            .lines()
            .filter(|line| line.starts_with("  qt-1"))
            .collect();
        assert_eq!(states.len(), 4);
        assert!(states[1].contains("visible") && states[1].contains("key"));
        assert!(states[3].contains("hidden"));
    }

    #[test]
    fn test_replay_notes_missing_target() {
        let script = ReplayScript::parse("steps: [new_tab]").unwrap();
        let mut out = Vec::new();
        run_replay(&script, &mut out).unwrap();
        let report = String::from_utf8(out).unwrap();
        assert!(report.contains("step 1: NewTab"));
        assert!(report.contains("! no quick terminal yet"));
        assert!(report.contains("last_active=-"));
    }

    #[test]
    fn test_check_config_reports_corrections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "background_opacity: 7\nquick_terminal_tabs: false\n").unwrap();

        let mut out = Vec::new();
        check_config(&path, &mut out).unwrap();
        let report = String::from_utf8(out).unwrap();
        assert!(report.contains("corrected: background_opacity"));
        assert!(report.contains("tabs:             false"));
    }

    #[test]
    fn test_check_config_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        check_config(&dir.path().join("none.yaml"), &mut out).unwrap();
        let report = String::from_utf8(out).unwrap();
        assert!(report.contains("defaults apply"));
        assert!(report.contains("position:         Top"));
    }
}
