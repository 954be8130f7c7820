//! Addon lifecycle - the object the host driver loop talks to
//!
//! Owns the scheduler, the RNG (seeded once), and the single-slot
//! deferred respawn flag. The driver calls `on_init` when a flight
//! loads, `on_tick` every fixed step, and `on_teardown` when the
//! flight ends; no callback registration exists.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::host::Vessel;
use crate::reassign::{self, ReassignmentOutcome};
use crate::scheduler::{Scheduler, TriggerDecision, DEFAULT_MIN_INTERVAL};

/// Addon configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotSeatConfig {
    /// Cooldown and expected wait between reassignments, seconds
    pub min_interval: f64,
    /// Pin the RNG for reproducible runs; `None` seeds from entropy
    pub rng_seed: Option<u64>,
}

impl Default for HotSeatConfig {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_INTERVAL,
            rng_seed: None,
        }
    }
}

/// The crew shuffle addon.
pub struct HotSeat {
    scheduler: Scheduler,
    rng: StdRng,
    respawn_pending: bool,
}

impl HotSeat {
    pub fn new(config: HotSeatConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            scheduler: Scheduler::new(config.min_interval),
            rng,
            respawn_pending: false,
        }
    }

    /// Call once when a flight session starts. Startup counts as a
    /// fresh reassignment, so nobody moves straight away.
    pub fn on_init(&mut self, vessel: &impl Vessel) {
        self.scheduler.on_init(vessel.universal_time());
    }

    /// Call once per fixed simulation step.
    ///
    /// Returns the reassignment outcome when the scheduler fired this
    /// tick, `None` otherwise. A pending visual respawn from the
    /// previous tick's swap is consumed first, before any new decision.
    pub fn on_tick(
        &mut self,
        vessel: &mut impl Vessel,
        tick_duration: f64,
    ) -> Option<ReassignmentOutcome> {
        if self.respawn_pending {
            vessel.respawn_crew();
            self.respawn_pending = false;
        }

        let decision = self.scheduler.tick(
            vessel.universal_time(),
            vessel.main_throttle(),
            vessel.situation(),
            tick_duration,
            &mut self.rng,
        );
        if decision == TriggerDecision::NoTrigger {
            return None;
        }

        let available = vessel.connectivity_available();
        let snapshot = if available {
            vessel.connectivity_snapshot()
        } else {
            Default::default()
        };
        let outcome = reassign::run_cycle(available, &snapshot, &mut *vessel, &mut self.rng);

        if outcome.is_swap() {
            vessel.notify_layout_changed();
            self.respawn_pending = true;
        }
        Some(outcome)
    }

    /// Call when the flight session ends.
    pub fn on_teardown(&mut self) {
        self.respawn_pending = false;
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn respawn_pending(&self) -> bool {
        self.respawn_pending
    }
}

impl Default for HotSeat {
    fn default() -> Self {
        Self::new(HotSeatConfig::default())
    }
}
