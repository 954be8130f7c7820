//! Host collaborator boundary
//!
//! Everything the core needs from the surrounding simulation: the
//! clock, control state, flight situation, connectivity snapshots, and
//! the crew mutation sink. The host implements [`Vessel`]; the core
//! never holds occupant or seat storage of its own.

use crate::scheduler::Situation;
use crate::snapshot::ConnectivitySnapshot;

/// Errors the host's crew mutation sink may report.
///
/// The engine validates a swap against the snapshot before issuing any
/// mutation, so in practice these indicate the host's state drifted
/// from the snapshot it provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrewError {
    MissingOccupant { occupant_id: u32 },
    MissingPart { part_id: u32 },
    SeatOutOfRange { part_id: u32, seat_index: u32 },
    SeatOccupied { part_id: u32, seat_index: u32 },
}

impl std::fmt::Display for CrewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrewError::MissingOccupant { occupant_id } => {
                write!(f, "occupant {} not found", occupant_id)
            }
            CrewError::MissingPart { part_id } => write!(f, "part {} not found", part_id),
            CrewError::SeatOutOfRange {
                part_id,
                seat_index,
            } => write!(f, "part {} has no seat {}", part_id, seat_index),
            CrewError::SeatOccupied {
                part_id,
                seat_index,
            } => write!(f, "seat {} of part {} is already taken", seat_index, part_id),
        }
    }
}

impl std::error::Error for CrewError {}

/// Crew mutation sink.
///
/// The two calls must be atomic from the engine's point of view: no
/// other collaborator may observe a half-moved occupant between them
/// (guaranteed by the single-threaded tick model).
pub trait CrewSink {
    /// Unseat an occupant from the given part
    fn remove_occupant(&mut self, part_id: u32, occupant_id: u32) -> Result<(), CrewError>;

    /// Seat an occupant at a specific seat of a part
    fn add_occupant(
        &mut self,
        part_id: u32,
        occupant_id: u32,
        seat_index: u32,
    ) -> Result<(), CrewError>;
}

/// Full host surface consumed by the addon each tick.
pub trait Vessel: CrewSink {
    /// Simulated clock, seconds, monotonic within a flight session
    fn universal_time(&self) -> f64;

    /// Main throttle; 0.0 means no thrust
    fn main_throttle(&self) -> f64;

    fn situation(&self) -> Situation;

    /// False when the connectivity collaborator is absent; the engine
    /// then no-ops unconditionally.
    fn connectivity_available(&self) -> bool;

    /// Current partition of the vessel into connected spaces. Must
    /// reflect any mutation from the previous tick.
    fn connectivity_snapshot(&self) -> ConnectivitySnapshot;

    /// Crew layout changed; connectivity must be recomputed before the
    /// next snapshot is served.
    fn notify_layout_changed(&mut self);

    /// Respawn crew visuals. Called at most once per tick, on the tick
    /// after a swap.
    fn respawn_crew(&mut self);
}
