//! HotSeat Core - Crew Seat Shuffle Engine
//!
//! Periodically relocates crew members between seats inside a vessel's
//! connected living spaces, so long flights don't leave everyone frozen
//! in the chair they launched in.
//!
//! # Architecture
//!
//! Two layers drive the behavior:
//! - **Scheduler**: runs once per fixed simulation tick and decides,
//!   via cooldown gates and a per-tick probability trial, whether this
//!   tick fires a reassignment. The expected wait between firings equals
//!   the configured interval, so moves feel random rather than periodic.
//! - **Reassignment engine**: picks one occupant and one destination
//!   seat uniformly at random within that occupant's connected space and
//!   performs an atomic two-way swap through the host's crew mutation
//!   sink.
//!
//! The host supplies clock, throttle, flight situation, and a
//! [`ConnectivitySnapshot`](snapshot::ConnectivitySnapshot) of spaces,
//! parts, and seated crew each tick via the [`Vessel`](host::Vessel)
//! trait; the core owns only its cooldown timestamps, its RNG, and a
//! one-slot deferred respawn flag.
//!
//! # Example
//!
//! ```rust,no_run
//! use hotseat_core::prelude::*;
//!
//! let mut addon = HotSeat::new(HotSeatConfig::default());
//! // A driver loop calls addon.on_init(&vessel) once, then
//! // addon.on_tick(&mut vessel, fixed_delta) every fixed step.
//! ```

pub mod addon;
pub mod host;
pub mod reassign;
pub mod scheduler;
pub mod snapshot;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::addon::{HotSeat, HotSeatConfig};
    pub use crate::host::{CrewError, CrewSink, Vessel};
    pub use crate::reassign::{OccupantMove, ReassignmentOutcome};
    pub use crate::scheduler::{Scheduler, Situation, TriggerDecision};
    pub use crate::snapshot::{ConnectivitySnapshot, Occupant, Part, SeatRef, Space};
}
