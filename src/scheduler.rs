//! Time source and deferred-task queue.
//!
//! The coordinator never sleeps or spawns: work that must wait for the host
//! (focus retries, the one-turn key check after creating a tab) is queued
//! with a deadline and drained by the host event loop via
//! `QuickTerminalManager::run_due_timers`.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to; clones share the same time
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }

    /// Time elapsed since the clock was created
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }
}

/// Tasks ordered by deadline, then by scheduling order
#[derive(Debug)]
pub struct TimerQueue<T> {
    tasks: BTreeMap<(Instant, u64), T>,
    seq: u64,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            seq: 0,
        }
    }

    pub fn schedule(&mut self, deadline: Instant, task: T) {
        self.seq += 1;
        self.tasks.insert((deadline, self.seq), task);
    }

    /// Remove and return the earliest task whose deadline is not after `now`
    pub fn pop_due(&mut self, now: Instant) -> Option<T> {
        let key = *self.tasks.keys().next()?;
        if key.0 > now {
            return None;
        }
        self.tasks.remove(&key)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.keys().next().map(|(deadline, _)| *deadline)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Drop every task for which `keep` returns false
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.tasks.retain(|_, task| keep(task));
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
