//! Connectivity snapshot: read-only view of spaces, parts, seats, and crew
//!
//! The host recomputes connectivity externally (which parts form a
//! connected living space) and hands the core a fresh snapshot each
//! tick. The core never mutates these structures; all crew movement
//! goes through the host's mutation sink.

use serde::{Deserialize, Serialize};

/// A single seat, identified by the part that carries it and the seat
/// index within that part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatRef {
    pub part_id: u32,
    pub seat_index: u32,
}

impl SeatRef {
    pub fn new(part_id: u32, seat_index: u32) -> Self {
        Self {
            part_id,
            seat_index,
        }
    }
}

/// A crew member currently seated somewhere in the vessel.
///
/// Lifecycle (creation, destruction, naming) belongs to the host; the
/// core only reads the seat reference and rewrites it via the mutation
/// sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occupant {
    pub id: u32,
    pub name: String,
    /// Seat this occupant currently holds
    pub seat: SeatRef,
}

impl Occupant {
    pub fn new(id: u32, name: impl Into<String>, seat: SeatRef) -> Self {
        Self {
            id,
            name: name.into(),
            seat,
        }
    }
}

/// A physical part (pod, cabin, lab module...) contributing seats to a
/// space. Seats are implicit: indices `0..seat_capacity`, each holding
/// at most one occupant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: u32,
    pub title: String,
    pub seat_capacity: u32,
}

impl Part {
    pub fn new(id: u32, title: impl Into<String>, seat_capacity: u32) -> Self {
        Self {
            id,
            title: title.into(),
            seat_capacity,
        }
    }

    /// All seats in this part
    pub fn seats(&self) -> impl Iterator<Item = SeatRef> + '_ {
        (0..self.seat_capacity).map(|idx| SeatRef::new(self.id, idx))
    }
}

/// A maximal connected set of parts, plus the crew currently seated in
/// any of its seats.
///
/// Invariant: every occupant in `crew` sits in exactly one seat of a
/// part listed in `parts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Space {
    pub id: u32,
    pub parts: Vec<Part>,
    /// Occupants seated in this space, in host order
    pub crew: Vec<Occupant>,
}

impl Space {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            parts: Vec::new(),
            crew: Vec::new(),
        }
    }

    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    pub fn with_occupant(mut self, occupant: Occupant) -> Self {
        self.crew.push(occupant);
        self
    }

    /// Total seat count across all parts in this space
    pub fn total_seats(&self) -> u32 {
        self.parts.iter().map(|p| p.seat_capacity).sum()
    }

    /// Every seat in this space, enumerated part by part
    pub fn all_seats(&self) -> impl Iterator<Item = SeatRef> + '_ {
        self.parts.iter().flat_map(|p| p.seats())
    }

    pub fn contains_part(&self, part_id: u32) -> bool {
        self.parts.iter().any(|p| p.id == part_id)
    }

    pub fn part(&self, part_id: u32) -> Option<&Part> {
        self.parts.iter().find(|p| p.id == part_id)
    }

    /// Whoever currently holds the given seat, if anyone
    pub fn occupant_in_seat(&self, seat: SeatRef) -> Option<&Occupant> {
        self.crew.iter().find(|o| o.seat == seat)
    }

    /// Checks that a seat reference points at a real seat of this space
    pub fn seat_exists(&self, seat: SeatRef) -> bool {
        self.part(seat.part_id)
            .map(|p| seat.seat_index < p.seat_capacity)
            .unwrap_or(false)
    }

    /// First seat recorded as held by more than one occupant, if any
    pub fn duplicated_seat(&self) -> Option<SeatRef> {
        for (i, occupant) in self.crew.iter().enumerate() {
            if self.crew[i + 1..].iter().any(|o| o.seat == occupant.seat) {
                return Some(occupant.seat);
            }
        }
        None
    }
}

/// Read-only partition of the vessel into connected spaces, refreshed
/// by the host every tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectivitySnapshot {
    pub spaces: Vec<Space>,
}

impl ConnectivitySnapshot {
    pub fn new(spaces: Vec<Space>) -> Self {
        Self { spaces }
    }

    /// Spaces with at least one seated occupant
    pub fn crewed_spaces(&self) -> impl Iterator<Item = &Space> {
        self.spaces.iter().filter(|s| !s.crew.is_empty())
    }

    /// Total occupants across all spaces
    pub fn crew_count(&self) -> usize {
        self.spaces.iter().map(|s| s.crew.len()).sum()
    }
}
