use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Stopped,
    Running,
    Paused,
}

/// One-shot auto-dismiss countdown.
///
/// The timer owns no OS resource: the host event loop asks for
/// [`deadline`](Self::deadline), sleeps until then and calls
/// [`poll`](Self::poll). Expiry is reported as a return value instead of a
/// callback, so the caller may stop or restart the timer while handling it.
#[derive(Debug, Clone)]
pub struct LifecycleTimer {
    state: TimerState,
    interval: Duration,
    /// Running time accumulated before the current run segment.
    elapsed: Duration,
    resumed_at: Option<Instant>,
}

impl Default for LifecycleTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleTimer {
    pub fn new() -> Self {
        Self {
            state: TimerState::Stopped,
            interval: Duration::ZERO,
            elapsed: Duration::ZERO,
            resumed_at: None,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Arm (or re-arm) the countdown from zero.
    pub fn start(&mut self, interval: Duration, now: Instant) {
        self.state = TimerState::Running;
        self.interval = interval;
        self.elapsed = Duration::ZERO;
        self.resumed_at = Some(now);
    }

    /// Returns `false` if the timer was not running.
    pub fn pause(&mut self, now: Instant) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        self.elapsed = self.elapsed_at(now);
        self.resumed_at = None;
        self.state = TimerState::Paused;
        true
    }

    /// Returns `false` if the timer was not paused.
    pub fn resume(&mut self, now: Instant) -> bool {
        if self.state != TimerState::Paused {
            return false;
        }
        self.resumed_at = Some(now);
        self.state = TimerState::Running;
        true
    }

    pub fn stop(&mut self) {
        self.state = TimerState::Stopped;
        self.resumed_at = None;
    }

    /// Running time consumed so far. Paused spans do not count.
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        match self.resumed_at {
            Some(since) => self.elapsed + now.saturating_duration_since(since),
            None => self.elapsed,
        }
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        match self.state {
            TimerState::Stopped => None,
            _ => Some(self.interval.saturating_sub(self.elapsed_at(now))),
        }
    }

    /// Wall-clock expiry, only defined while running.
    pub fn deadline(&self) -> Option<Instant> {
        let since = self.resumed_at?;
        Some(since + self.interval.saturating_sub(self.elapsed))
    }

    /// Returns `true` exactly once, on the first poll at or past the deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.state != TimerState::Running || self.elapsed_at(now) < self.interval {
            return false;
        }
        self.elapsed = self.interval;
        self.stop();
        true
    }
}
