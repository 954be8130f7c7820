//! Reassignment engine - picks one occupant and swaps seats
//!
//! Given a trigger and the current connectivity snapshot, selects one
//! crewed space, one occupant in it, and one destination seat among
//! every seat of that space (the occupant's own seat included, so
//! selection stays uniform), then performs an atomic two-way swap
//! through the host's crew mutation sink. Destinations are scoped to
//! the source occupant's own space; crew never teleport across
//! disconnected spaces.

use log::{debug, error, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::host::CrewSink;
use crate::snapshot::{ConnectivitySnapshot, Occupant, SeatRef, Space};

/// One occupant's relocation, for observers and logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupantMove {
    pub occupant_id: u32,
    pub name: String,
    pub from: SeatRef,
    pub to: SeatRef,
}

/// What a reassignment cycle did. Every variant counts as a completed
/// cycle; only `Swapped` mutated anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReassignmentOutcome {
    /// Connectivity collaborator absent - feature unavailable, not a fault
    Unavailable,
    /// No space holds any crew (or the snapshot is empty)
    NoCrewedSpaces,
    /// The drawn destination was the source's own seat
    StayedPut { occupant_id: u32 },
    /// A real move: `moved` took the target seat, `displaced` (if the
    /// seat was taken) took `moved`'s former seat
    Swapped {
        moved: OccupantMove,
        displaced: Option<OccupantMove>,
    },
    /// Snapshot and host state disagree; aborted without mutating
    Inconsistent { detail: String },
}

impl ReassignmentOutcome {
    /// True only when seats actually changed hands
    pub fn is_swap(&self) -> bool {
        matches!(self, ReassignmentOutcome::Swapped { .. })
    }
}

/// Selects one occupant and one destination uniformly at random and
/// relocates the occupant.
pub fn select_and_move(
    snapshot: &ConnectivitySnapshot,
    sink: &mut impl CrewSink,
    rng: &mut impl Rng,
) -> ReassignmentOutcome {
    let crewed: Vec<&Space> = snapshot.crewed_spaces().collect();
    if crewed.is_empty() {
        debug!("no crewed spaces - empty reassignment cycle");
        return ReassignmentOutcome::NoCrewedSpaces;
    }

    let space = crewed[rng.gen_range(0..crewed.len())];
    let source = &space.crew[rng.gen_range(0..space.crew.len())];

    let seats: Vec<SeatRef> = space.all_seats().collect();
    if seats.is_empty() {
        error!(
            "space {} has crew but no seats - skipping reassignment",
            space.id
        );
        return ReassignmentOutcome::Inconsistent {
            detail: format!("space {} has crew but zero seats", space.id),
        };
    }

    let target = seats[rng.gen_range(0..seats.len())];
    move_occupant(space, sink, source, target)
}

/// Relocates `source` to `target`, swapping with whoever sits there.
///
/// Exposed separately from [`select_and_move`] so hosts and tests can
/// drive an explicit pick through the exact same swap path.
pub fn move_occupant(
    space: &Space,
    sink: &mut impl CrewSink,
    source: &Occupant,
    target: SeatRef,
) -> ReassignmentOutcome {
    if target == source.seat {
        debug!("{} drew their own seat - staying put", source.name);
        return ReassignmentOutcome::StayedPut {
            occupant_id: source.id,
        };
    }

    // Fail closed: both seats must be real seats of this space before
    // any mutation is issued.
    if !space.seat_exists(source.seat) {
        let detail = format!(
            "{} is recorded in seat {}/{} which space {} does not contain",
            source.name, source.seat.part_id, source.seat.seat_index, space.id
        );
        error!("{} - aborting swap", detail);
        return ReassignmentOutcome::Inconsistent { detail };
    }
    if !space.seat_exists(target) {
        let detail = format!(
            "target seat {}/{} is not a seat of space {}",
            target.part_id, target.seat_index, space.id
        );
        error!("{} - aborting swap", detail);
        return ReassignmentOutcome::Inconsistent { detail };
    }
    if let Some(seat) = space.duplicated_seat() {
        let detail = format!(
            "space {} records more than one occupant in seat {}/{}",
            space.id, seat.part_id, seat.seat_index
        );
        error!("{} - aborting swap", detail);
        return ReassignmentOutcome::Inconsistent { detail };
    }

    let former = source.seat;
    let displaced = space.occupant_in_seat(target).cloned();

    // Unseat both, then reseat both: the displaced occupant (if any)
    // gets the source's former seat, a true two-way swap. A sink
    // failure partway through rolls the earlier steps back so nobody
    // is left unseated.
    if let Err(e) = sink.remove_occupant(former.part_id, source.id) {
        error!("failed to unseat {}: {} - aborting swap", source.name, e);
        return ReassignmentOutcome::Inconsistent {
            detail: e.to_string(),
        };
    }
    if let Some(ref other) = displaced {
        if let Err(e) = sink.remove_occupant(target.part_id, other.id) {
            error!("failed to unseat {}: {} - aborting swap", other.name, e);
            reseat(sink, source, former);
            return ReassignmentOutcome::Inconsistent {
                detail: e.to_string(),
            };
        }
    }
    if let Err(e) = sink.add_occupant(target.part_id, source.id, target.seat_index) {
        error!("failed to seat {}: {} - aborting swap", source.name, e);
        if let Some(ref other) = displaced {
            reseat(sink, other, target);
        }
        reseat(sink, source, former);
        return ReassignmentOutcome::Inconsistent {
            detail: e.to_string(),
        };
    }
    if let Some(ref other) = displaced {
        if let Err(e) = sink.add_occupant(former.part_id, other.id, former.seat_index) {
            error!("failed to seat {}: {} - aborting swap", other.name, e);
            if let Err(e) = sink.remove_occupant(target.part_id, source.id) {
                error!("rollback failed to unseat {}: {}", source.name, e);
            } else {
                reseat(sink, source, former);
            }
            reseat(sink, other, target);
            return ReassignmentOutcome::Inconsistent {
                detail: e.to_string(),
            };
        }
    }

    match &displaced {
        Some(other) => info!(
            "{} swapped seats with {} via {}/{}",
            source.name, other.name, target.part_id, target.seat_index
        ),
        None => info!(
            "{} moved to empty seat {}/{}",
            source.name, target.part_id, target.seat_index
        ),
    }

    ReassignmentOutcome::Swapped {
        moved: OccupantMove {
            occupant_id: source.id,
            name: source.name.clone(),
            from: former,
            to: target,
        },
        displaced: displaced.map(|other| OccupantMove {
            occupant_id: other.id,
            name: other.name.clone(),
            from: target,
            to: former,
        }),
    }
}

/// Best-effort rollback step. A failure here means the host state was
/// already diverging on its own; all we can do is log it.
fn reseat(sink: &mut impl CrewSink, occupant: &Occupant, seat: SeatRef) {
    if let Err(e) = sink.add_occupant(seat.part_id, occupant.id, seat.seat_index) {
        error!("rollback failed to reseat {}: {}", occupant.name, e);
    }
}

/// Convenience wrapper used by the addon: reports `Unavailable` when
/// the host says the connectivity feature is missing.
pub fn run_cycle(
    available: bool,
    snapshot: &ConnectivitySnapshot,
    sink: &mut impl CrewSink,
    rng: &mut impl Rng,
) -> ReassignmentOutcome {
    if !available {
        warn!("not moving crew - connectivity feature is unavailable");
        return ReassignmentOutcome::Unavailable;
    }
    select_and_move(snapshot, sink, rng)
}
