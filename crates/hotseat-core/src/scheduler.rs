//! Scheduler - decides on which tick a reassignment fires
//!
//! Converts "one reassignment roughly every `min_interval` seconds"
//! into a per-tick probability trial: once both cooldowns have lapsed,
//! each eligible tick fires with probability `tick_duration /
//! min_interval`, so the expected wait equals the interval without the
//! moves ever feeling periodic.

use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Seconds that must pass after the last reassignment (and after the
/// last burn) before the next reassignment becomes eligible.
#[cfg(debug_assertions)]
pub const DEFAULT_MIN_INTERVAL: f64 = 30.0;
#[cfg(not(debug_assertions))]
pub const DEFAULT_MIN_INTERVAL: f64 = 300.0;

/// Flight situation reported by the host each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Situation {
    PreLaunch,
    Landed,
    Splashed,
    Flying,
    SubOrbital,
    Orbiting,
    Escaping,
    Docked,
}

impl Situation {
    /// Crew only wander between seats while coasting in free flight.
    pub fn allows_reassignment(&self) -> bool {
        matches!(
            self,
            Situation::Docked | Situation::Orbiting | Situation::Escaping
        )
    }
}

/// Per-tick verdict from the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerDecision {
    /// Run the reassignment engine this tick
    Trigger,
    /// Nothing to do this tick
    NoTrigger,
}

/// Tracks the cooldown timestamps and runs the per-tick trial.
#[derive(Debug, Clone)]
pub struct Scheduler {
    last_reassignment: f64,
    last_burn: f64,
    min_interval: f64,
}

impl Scheduler {
    /// A non-positive or non-finite `min_interval` is replaced by
    /// [`DEFAULT_MIN_INTERVAL`] with a warning.
    pub fn new(min_interval: f64) -> Self {
        let min_interval = if min_interval > 0.0 && min_interval.is_finite() {
            min_interval
        } else {
            warn!(
                "invalid min_interval {} - falling back to {}s",
                min_interval, DEFAULT_MIN_INTERVAL
            );
            DEFAULT_MIN_INTERVAL
        };
        Self {
            last_reassignment: 0.0,
            last_burn: 0.0,
            min_interval,
        }
    }

    /// Treats startup as a just-completed reassignment so nobody moves
    /// the moment a flight loads.
    pub fn on_init(&mut self, now: f64) {
        self.last_reassignment = now;
    }

    /// Runs the gating checks and, once eligible, the probability
    /// trial. On `Trigger` the reassignment timestamp is advanced
    /// immediately, so even a swap that ends up a no-op resets the
    /// cooldown.
    pub fn tick(
        &mut self,
        now: f64,
        throttle: f64,
        situation: Situation,
        tick_duration: f64,
        rng: &mut impl Rng,
    ) -> TriggerDecision {
        // Outside free flight nothing happens and no state is touched.
        if !situation.allows_reassignment() {
            return TriggerDecision::NoTrigger;
        }

        // Thrust pins everyone to their seats and restarts the burn
        // cooldown.
        if throttle != 0.0 {
            self.last_burn = now;
            return TriggerDecision::NoTrigger;
        }

        if now - self.last_reassignment < self.min_interval
            || now - self.last_burn < self.min_interval
        {
            return TriggerDecision::NoTrigger;
        }

        if tick_duration <= 0.0 || !tick_duration.is_finite() {
            return TriggerDecision::NoTrigger;
        }

        // Fire with probability 1/N where N is the number of ticks in
        // one interval, giving an expected wait of min_interval once
        // the cooldowns have lapsed.
        let ticks_per_interval = self.min_interval / tick_duration;
        if rng.gen::<f64>() * ticks_per_interval < 1.0 {
            self.last_reassignment = now;
            TriggerDecision::Trigger
        } else {
            TriggerDecision::NoTrigger
        }
    }

    pub fn last_reassignment(&self) -> f64 {
        self.last_reassignment
    }

    pub fn last_burn(&self) -> f64 {
        self.last_burn
    }

    pub fn min_interval(&self) -> f64 {
        self.min_interval
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
