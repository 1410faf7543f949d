//! Update coalescing and rate limiting for metadata sources

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Minimum time between two emissions of the same source
pub const UPDATE_COOLDOWN: Duration = Duration::from_secs(5);

/// Quiet period to wait for, in case several fields are changing at once
pub const UPDATE_WAIT: Duration = Duration::from_millis(250);

/// Time source for scheduling, measured from an arbitrary epoch
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Wall clock backed by tokio's instant, so paused test runtimes control it too
#[derive(Debug, Clone)]
pub struct SystemClock {
    epoch: tokio::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: tokio::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Clock advanced explicitly, e.g. from the game's own simulation time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now: Duration) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }
}

/// Per-source timer state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebounceState {
    next_emit_allowed_at: Duration,
    due_at: Option<Duration>,
}

impl DebounceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.due_at.is_some()
    }

    pub fn due_at(&self) -> Option<Duration> {
        self.due_at
    }

    pub fn next_emit_allowed_at(&self) -> Duration {
        self.next_emit_allowed_at
    }

    /// Arm or push back the pending emission after a change at `now`.
    ///
    /// Returns the time the emission is due.
    pub fn on_source_changed(&mut self, now: Duration) -> Duration {
        let earliest = now + UPDATE_WAIT;
        match self.due_at {
            Some(due) if due >= earliest => due,
            _ => {
                let due = earliest.max(self.next_emit_allowed_at);
                self.due_at = Some(due);
                due
            }
        }
    }

    pub fn is_due(&self, now: Duration) -> bool {
        matches!(self.due_at, Some(due) if due <= now)
    }

    /// Consume a due emission, starting the cooldown. Returns false if nothing was due.
    pub fn fire(&mut self, now: Duration) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.due_at = None;
        self.next_emit_allowed_at = now + UPDATE_COOLDOWN;
        true
    }

    pub fn cancel(&mut self) {
        self.due_at = None;
    }

    /// Take over the cooldown of a source being replaced
    pub fn inherit_cooldown(&mut self, previous: &DebounceState) {
        self.next_emit_allowed_at = self.next_emit_allowed_at.max(previous.next_emit_allowed_at);
    }
}
