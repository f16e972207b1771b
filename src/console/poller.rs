use std::time::{Duration, Instant};

use crate::model::MIN_AUTO_REFRESH_SECS;

use super::context::Origin;

pub const DRIFT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Deadline-based periodic timer, polled by the event loop.
///
/// `start` and `stop` each bump the epoch, so work issued under an earlier
/// epoch can be recognised and dropped.
#[derive(Debug)]
pub struct Scheduler {
    name: &'static str,
    interval: Duration,
    next_due: Option<Instant>,
    epoch: u64,
}

impl Scheduler {
    pub fn new(name: &'static str, interval: Duration) -> Self {
        Self {
            name,
            interval,
            next_due: None,
            epoch: 0,
        }
    }

    /// First tick one interval from `now`.
    pub fn start(&mut self, now: Instant) {
        self.epoch += 1;
        self.next_due = Some(now + self.interval);
        tracing::debug!(timer = self.name, epoch = self.epoch, interval = ?self.interval, "timer started");
    }

    pub fn stop(&mut self) {
        if self.next_due.take().is_some() {
            tracing::debug!(timer = self.name, epoch = self.epoch, "timer stopped");
        }
        self.epoch += 1;
    }

    /// Changing the period restarts a running timer under a new epoch.
    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.interval = interval;
        if self.is_running() {
            self.start(now);
        }
    }

    /// True at most once per elapsed deadline; the next deadline is counted from `now`.
    pub fn poll_due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    AutoRefresh { epoch: u64 },
    Drift { epoch: u64 },
}

/// Auto-refresh and drift-poll timers.
#[derive(Debug)]
pub struct StatusPoller {
    auto_refresh: Scheduler,
    drift: Scheduler,
}

pub fn clamp_refresh_interval(interval: Duration) -> Duration {
    interval.max(Duration::from_secs(MIN_AUTO_REFRESH_SECS))
}

impl StatusPoller {
    pub fn new(auto_refresh_interval: Duration) -> Self {
        Self {
            auto_refresh: Scheduler::new("auto-refresh", clamp_refresh_interval(auto_refresh_interval)),
            drift: Scheduler::new("drift", DRIFT_POLL_INTERVAL),
        }
    }

    pub fn set_auto_refresh(&mut self, enabled: bool, now: Instant) {
        match (enabled, self.auto_refresh.is_running()) {
            (true, false) => self.auto_refresh.start(now),
            (false, true) => self.auto_refresh.stop(),
            _ => {}
        }
    }

    pub fn set_auto_refresh_interval(&mut self, interval: Duration, now: Instant) {
        self.auto_refresh
            .set_interval(clamp_refresh_interval(interval), now);
    }

    pub fn auto_refresh_enabled(&self) -> bool {
        self.auto_refresh.is_running()
    }

    pub fn auto_refresh_interval(&self) -> Duration {
        self.auto_refresh.interval()
    }

    pub fn auto_refresh_epoch(&self) -> u64 {
        self.auto_refresh.epoch()
    }

    /// Starts the drift poll and returns its epoch. The caller issues the
    /// opening fetch itself; the first tick follows one interval later.
    pub fn open_drift(&mut self, now: Instant) -> u64 {
        self.drift.start(now);
        self.drift.epoch()
    }

    pub fn close_drift(&mut self) {
        self.drift.stop();
    }

    pub fn drift_running(&self) -> bool {
        self.drift.is_running()
    }

    pub fn drift_epoch(&self) -> u64 {
        self.drift.epoch()
    }

    /// Whether a result issued with `origin` may still be written.
    pub fn accepts(&self, origin: Origin) -> bool {
        match origin {
            Origin::Operator => true,
            Origin::AutoRefresh { epoch } => {
                self.auto_refresh.is_running() && self.auto_refresh.epoch() == epoch
            }
        }
    }

    pub fn accepts_drift(&self, epoch: u64) -> bool {
        self.drift.is_running() && self.drift.epoch() == epoch
    }

    pub fn due(&mut self, now: Instant) -> Vec<Tick> {
        let mut ticks = Vec::new();
        if self.auto_refresh.poll_due(now) {
            ticks.push(Tick::AutoRefresh {
                epoch: self.auto_refresh.epoch(),
            });
        }
        if self.drift.poll_due(now) {
            ticks.push(Tick::Drift {
                epoch: self.drift.epoch(),
            });
        }
        ticks
    }

    /// Time until the nearest deadline; lets the event loop size its poll.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        [
            self.auto_refresh.time_until_due(now),
            self.drift.time_until_due(now),
        ]
        .into_iter()
        .flatten()
        .min()
    }
}
