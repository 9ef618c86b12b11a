//! Refresh and clock timers, plus the gate in front of the renderer.
//!
//! The refresh timer fires every `dashboard.refresh_interval` and the clock
//! timer every `dashboard.clock_interval`. There is no backoff: a failed
//! cycle simply waits for the next tick.

use std::fmt;
use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::config::schema::DashboardConfig;
use crate::config::ConfigError;

/// Why a refresh cycle was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// First cycle after launch.
    Startup,
    /// The refresh timer fired.
    Scheduled,
    /// The user pressed refresh.
    Manual,
    /// Credentials were saved.
    SettingsChanged,
    /// A widget was shown or hidden.
    VisibilityChanged,
}

impl Trigger {
    /// Timer-driven triggers are dropped rather than deferred.
    pub fn is_scheduled(self) -> bool {
        matches!(self, Trigger::Scheduled)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trigger::Startup => "startup",
            Trigger::Scheduled => "scheduled",
            Trigger::Manual => "manual",
            Trigger::SettingsChanged => "settings-changed",
            Trigger::VisibilityChanged => "visibility-changed",
        };
        f.write_str(name)
    }
}

/// Admits at most one refresh cycle at a time.
///
/// A scheduled request that arrives while a cycle is in flight is dropped.
/// Any other request is remembered, and all such requests collapse into one
/// re-run that [`RefreshGate::finish`] hands back.
#[derive(Debug, Default)]
pub struct RefreshGate {
    in_flight: bool,
    pending: Option<Trigger>,
}

impl RefreshGate {
    /// Creates an idle gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks to start a cycle. Returns `true` when the caller should start
    /// one now; the gate is then in flight until [`finish`](Self::finish).
    pub fn request(&mut self, trigger: Trigger) -> bool {
        if !self.in_flight {
            self.in_flight = true;
            return true;
        }
        if trigger.is_scheduled() {
            tracing::debug!(%trigger, "refresh already in flight, dropping");
        } else if self.pending.is_none() {
            tracing::debug!(%trigger, "refresh already in flight, deferring");
            self.pending = Some(trigger);
        } else {
            tracing::debug!(%trigger, "refresh already pending, coalescing");
        }
        false
    }

    /// Marks the running cycle finished.
    ///
    /// Returns the deferred trigger if one is waiting. The gate stays in
    /// flight in that case and the caller must start the re-run.
    pub fn finish(&mut self) -> Option<Trigger> {
        match self.pending.take() {
            Some(trigger) => Some(trigger),
            None => {
                self.in_flight = false;
                None
            }
        }
    }

    /// Whether a cycle is running.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Whether a re-run is waiting for the current cycle.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Which timer fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Time to refresh widget data.
    Refresh,
    /// Time to redraw the clock.
    Clock,
}

/// The two periodic timers.
///
/// Both first fire one full period after construction. Ticks missed while
/// the loop was busy are skipped rather than replayed.
#[derive(Debug)]
pub struct Scheduler {
    refresh: Interval,
    clock: Interval,
}

impl Scheduler {
    /// Creates timers with the given periods.
    pub fn new(refresh_every: Duration, clock_every: Duration) -> Self {
        Self {
            refresh: skipping_interval(refresh_every),
            clock: skipping_interval(clock_every),
        }
    }

    /// Creates timers from the `[dashboard]` section.
    pub fn from_config(config: &DashboardConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.refresh_interval()?, config.clock_interval()?))
    }

    /// Refresh period.
    pub fn refresh_period(&self) -> Duration {
        self.refresh.period()
    }

    /// Clock period.
    pub fn clock_period(&self) -> Duration {
        self.clock.period()
    }

    /// Waits for the next timer. A refresh wins when both are due.
    pub async fn next(&mut self) -> Tick {
        tokio::select! {
            biased;
            _ = self.refresh.tick() => Tick::Refresh,
            _ = self.clock.tick() => Tick::Clock,
        }
    }
}

fn skipping_interval(period: Duration) -> Interval {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    timer
}
