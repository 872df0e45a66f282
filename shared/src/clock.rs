//! Countdown clock driven by an injectable scheduler.
//!
//! The clock never sleeps or spawns anything itself. A [`Scheduler`] decides
//! how the periodic tick is produced (a browser interval, a test harness) and
//! the host forwards every firing to [`Countdown::on_tick`].

use std::collections::BTreeSet;

use tracing::debug;

/// One tick per second.
pub const TICK_PERIOD_MS: u64 = 1000;

pub trait Scheduler {
    type Handle;

    /// Begin firing every `period_ms` until the handle is cancelled.
    fn schedule_every(&mut self, period_ms: u64) -> Self::Handle;

    fn cancel(&mut self, handle: Self::Handle);

    /// Milliseconds on the scheduler's own clock.
    fn now_ms(&self) -> u64;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    Remaining(u64),
    Expired,
    /// The clock is not running; nothing changed.
    Ignored,
}

pub struct Countdown<S: Scheduler> {
    scheduler: S,
    handle: Option<S::Handle>,
    duration_secs: u64,
    remaining: u64,
}

impl<S: Scheduler> Countdown<S> {
    pub fn new(scheduler: S, duration_ms: u64) -> Self {
        let duration_secs = duration_ms.div_ceil(1000);
        Self {
            scheduler,
            handle: None,
            duration_secs,
            remaining: duration_secs,
        }
    }

    /// Start ticking. A timer that is still scheduled is cancelled first so two
    /// can never tick at once, and the seconds already counted down are kept.
    /// From a stopped or expired clock the full duration is restored.
    pub fn start(&mut self) {
        match self.handle.take() {
            Some(previous) => {
                debug!("countdown_restart_cancelled_previous remaining = {}", self.remaining);
                self.scheduler.cancel(previous);
            }
            None => self.remaining = self.duration_secs,
        }
        self.handle = Some(self.scheduler.schedule_every(TICK_PERIOD_MS));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.scheduler.cancel(handle);
        }
    }

    pub fn reset(&mut self) {
        self.stop();
        self.remaining = self.duration_secs;
    }

    /// Change the configured duration. Stops the clock.
    pub fn set_duration_ms(&mut self, duration_ms: u64) {
        self.duration_secs = duration_ms.div_ceil(1000);
        self.reset();
    }

    pub fn on_tick(&mut self) -> Tick {
        if self.handle.is_none() {
            return Tick::Ignored;
        }
        if self.remaining <= 1 {
            self.remaining = 0;
            self.stop();
            return Tick::Expired;
        }
        self.remaining -= 1;
        Tick::Remaining(self.remaining)
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

impl<S: Scheduler> Drop for Countdown<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Scheduler with a hand-driven clock. Nothing fires on its own: the caller
/// advances time and forwards ticks.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: u64,
    next_id: u64,
    active: BTreeSet<u64>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, ms: u64) {
        self.now = self.now.saturating_add(ms);
    }

    /// Number of timers currently scheduled.
    pub fn active_timers(&self) -> usize {
        self.active.len()
    }
}

impl Scheduler for ManualScheduler {
    type Handle = u64;

    fn schedule_every(&mut self, _period_ms: u64) -> u64 {
        self.next_id += 1;
        self.active.insert(self.next_id);
        self.next_id
    }

    fn cancel(&mut self, handle: u64) {
        self.active.remove(&handle);
    }

    fn now_ms(&self) -> u64 {
        self.now
    }
}
