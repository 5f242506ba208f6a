//! Config file watcher for live reload.
//!
//! Watches config.yaml and reports changes so the overlay can apply the new
//! configuration as a single point-in-time `ConfigChanged` event. Debounced so
//! that editors which save in several steps trigger one reload.

use anyhow::{Context, Result};
use notify::{Config as NotifyConfig, Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::{Duration, Instant};

/// Poll interval used when the native backend is unavailable.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Event indicating the config file has changed and needs reloading.
#[derive(Debug, Clone)]
pub struct ConfigReloadEvent {
    /// Path to the config file that changed.
    pub path: PathBuf,
}

impl ConfigReloadEvent {
    /// Load and validate the changed file.
    pub fn load(&self) -> Result<crate::Config> {
        crate::Config::load_from(&self.path)
    }
}

/// Watches the config file for changes and sends reload events.
pub struct ConfigWatcher {
    /// Kept alive to maintain watching.
    _watcher: Box<dyn Watcher + Send>,
    event_receiver: Receiver<ConfigReloadEvent>,
}

impl std::fmt::Debug for ConfigWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigWatcher").finish_non_exhaustive()
    }
}

/// Filters raw notify events down to debounced reloads of one file.
#[derive(Clone)]
struct ReloadFilter {
    filename: OsString,
    path: PathBuf,
    debounce: Duration,
    last_sent: Arc<Mutex<Option<Instant>>>,
    tx: Sender<ConfigReloadEvent>,
}

impl ReloadFilter {
    fn handle(&self, result: notify::Result<Event>) {
        let Ok(event) = result else {
            return;
        };

        // Create covers editors that save via rename
        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
            return;
        }

        if !event
            .paths
            .iter()
            .any(|p| p.file_name().is_some_and(|f| f == self.filename))
        {
            return;
        }

        {
            let now = Instant::now();
            let mut last = self.last_sent.lock();
            if last.is_some_and(|t| now.duration_since(t) < self.debounce) {
                log::trace!("Debouncing config reload event");
                return;
            }
            *last = Some(now);
        }

        log::info!("Config file changed: {}", self.path.display());
        if let Err(e) = self.tx.send(ConfigReloadEvent {
            path: self.path.clone(),
        }) {
            log::error!("Failed to send config reload event: {}", e);
        }
    }
}

impl ConfigWatcher {
    /// Create a new config watcher.
    ///
    /// Uses the platform's native backend when available and falls back to a
    /// `PollWatcher` (e.g. inside containers or on network filesystems).
    ///
    /// # Errors
    /// Returns an error if the config file doesn't exist or watching fails on
    /// both backends.
    pub fn new(config_path: &Path, debounce_delay_ms: u64) -> Result<Self> {
        if !config_path.exists() {
            anyhow::bail!("Config file not found: {}", config_path.display());
        }

        let canonical = config_path
            .canonicalize()
            .unwrap_or_else(|_| config_path.to_path_buf());
        let filename = canonical
            .file_name()
            .context("Config path has no filename")?
            .to_os_string();
        let parent_dir = canonical
            .parent()
            .context("Config path has no parent directory")?
            .to_path_buf();

        let (tx, rx) = channel();
        let filter = ReloadFilter {
            filename,
            path: canonical.clone(),
            debounce: Duration::from_millis(debounce_delay_ms),
            last_sent: Arc::new(Mutex::new(None)),
            tx,
        };

        let mut watcher = Self::create_watcher(filter)?;
        watcher
            .watch(&parent_dir, RecursiveMode::NonRecursive)
            .with_context(|| {
                format!("Failed to watch config directory: {}", parent_dir.display())
            })?;

        log::info!("Config hot reload: watching {}", canonical.display());

        Ok(Self {
            _watcher: watcher,
            event_receiver: rx,
        })
    }

    fn create_watcher(filter: ReloadFilter) -> Result<Box<dyn Watcher + Send>> {
        let native_filter = filter.clone();
        match notify::recommended_watcher(move |res: notify::Result<Event>| {
            native_filter.handle(res)
        }) {
            Ok(w) => {
                log::debug!("Config watcher: using native backend");
                Ok(Box::new(w))
            }
            Err(e) => {
                log::warn!(
                    "Config watcher: native backend unavailable ({}); falling back to PollWatcher",
                    e
                );
                let poll = PollWatcher::new(
                    move |res: notify::Result<Event>| filter.handle(res),
                    NotifyConfig::default().with_poll_interval(POLL_INTERVAL),
                )
                .context("Failed to create fallback PollWatcher")?;
                Ok(Box::new(poll))
            }
        }
    }

    /// Next pending reload event, if any (non-blocking).
    pub fn try_recv(&self) -> Option<ConfigReloadEvent> {
        self.event_receiver.try_recv().ok()
    }
}
