//! HotSeat Headless Validation Harness
//!
//! Sweeps the scheduler gates, the swap engine, and long randomized
//! soak runs entirely in-process — no game host, no rendering.
//!
//! Usage:
//!   cargo run -p hotseat-simtest
//!   cargo run -p hotseat-simtest -- --verbose
//!   cargo run -p hotseat-simtest -- --json

use std::collections::HashMap;

use hotseat_core::prelude::*;
use hotseat_core::reassign;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: String) -> Self {
        Self {
            name: name.into(),
            passed,
            detail,
        }
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    let json = std::env::args().any(|a| a == "--json");
    if !json {
        println!("=== HotSeat Simulation Harness ===\n");
    }

    let mut results = Vec::new();

    // 1. Scheduler gating sweep
    results.extend(validate_scheduler_gates(verbose, json));

    // 2. Swap mechanics on the reference layout
    results.extend(validate_swap_mechanics(verbose, json));

    // 3. Long randomized soak over a multi-space vessel
    results.extend(validate_soak_run(verbose, json));

    // 4. Expected-wait calibration
    results.extend(validate_calibration(verbose, json));

    // 5. Destination uniformity
    results.extend(validate_uniformity(verbose, json));

    // ── Summary ──
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&results).expect("results serialize")
        );
    } else {
        println!();
        for r in &results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || verbose {
                println!("  {} {}: {}", icon, r.name, r.detail);
            }
        }
        println!(
            "\n=== RESULT: {}/{} passed, {} failed ===",
            passed, total, failed
        );
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

fn banner(json: bool, title: &str) {
    if !json {
        println!("--- {} ---", title);
    }
}

// ── Mock vessel ─────────────────────────────────────────────────────────

/// Stand-in host: fixed layout, mutable seat assignments, call counters.
struct SimVessel {
    now: f64,
    throttle: f64,
    situation: Situation,
    /// (space id, part) in layout order
    layout: Vec<(u32, Part)>,
    /// occupant id -> (name, seat); None only mid-swap
    crew: HashMap<u32, (String, Option<SeatRef>)>,
    respawn_calls: u32,
    layout_change_calls: u32,
}

impl SimVessel {
    fn new(layout: Vec<(u32, Part)>) -> Self {
        Self {
            now: 0.0,
            throttle: 0.0,
            situation: Situation::Orbiting,
            layout,
            crew: HashMap::new(),
            respawn_calls: 0,
            layout_change_calls: 0,
        }
    }

    fn board(&mut self, id: u32, name: &str, seat: SeatRef) {
        self.crew.insert(id, (name.to_string(), Some(seat)));
    }

    fn seat_of(&self, id: u32) -> Option<SeatRef> {
        self.crew.get(&id).and_then(|(_, s)| *s)
    }

    /// None when consistent, otherwise a description of the violation
    fn violation(&self) -> Option<String> {
        let mut taken: HashMap<SeatRef, u32> = HashMap::new();
        for (id, (name, seat)) in &self.crew {
            let seat = match seat {
                Some(s) => *s,
                None => return Some(format!("{} left unseated", name)),
            };
            let part = self.layout.iter().map(|(_, p)| p).find(|p| p.id == seat.part_id);
            match part {
                None => return Some(format!("{} in unknown part {}", name, seat.part_id)),
                Some(p) if seat.seat_index >= p.seat_capacity => {
                    return Some(format!("{} past capacity of {}", name, p.title))
                }
                _ => {}
            }
            if let Some(other) = taken.insert(seat, *id) {
                return Some(format!("{} and {} share a seat", other, id));
            }
        }
        None
    }
}

impl CrewSink for SimVessel {
    fn remove_occupant(&mut self, part_id: u32, occupant_id: u32) -> Result<(), CrewError> {
        match self.crew.get_mut(&occupant_id) {
            Some((_, seat)) if seat.map(|s| s.part_id) == Some(part_id) => {
                *seat = None;
                Ok(())
            }
            _ => Err(CrewError::MissingOccupant { occupant_id }),
        }
    }

    fn add_occupant(
        &mut self,
        part_id: u32,
        occupant_id: u32,
        seat_index: u32,
    ) -> Result<(), CrewError> {
        let seat = SeatRef::new(part_id, seat_index);
        if !self.crew.contains_key(&occupant_id) {
            return Err(CrewError::MissingOccupant { occupant_id });
        }
        if self.crew.values().any(|(_, s)| *s == Some(seat)) {
            return Err(CrewError::SeatOccupied {
                part_id,
                seat_index,
            });
        }
        self.crew.get_mut(&occupant_id).unwrap().1 = Some(seat);
        Ok(())
    }
}

impl Vessel for SimVessel {
    fn universal_time(&self) -> f64 {
        self.now
    }

    fn main_throttle(&self) -> f64 {
        self.throttle
    }

    fn situation(&self) -> Situation {
        self.situation
    }

    fn connectivity_available(&self) -> bool {
        true
    }

    fn connectivity_snapshot(&self) -> ConnectivitySnapshot {
        let mut spaces: Vec<Space> = Vec::new();
        for (space_id, part) in &self.layout {
            if !spaces.iter().any(|s| s.id == *space_id) {
                spaces.push(Space::new(*space_id));
            }
            let space = spaces.iter_mut().find(|s| s.id == *space_id).unwrap();
            space.parts.push(part.clone());
        }
        for (id, (name, seat)) in &self.crew {
            let seat = seat.expect("snapshot taken mid-swap");
            if let Some(space) = spaces
                .iter_mut()
                .find(|s| s.parts.iter().any(|p| p.id == seat.part_id))
            {
                space.crew.push(Occupant::new(*id, name.clone(), seat));
            }
        }
        for space in &mut spaces {
            space.crew.sort_by_key(|o| o.id);
        }
        ConnectivitySnapshot::new(spaces)
    }

    fn notify_layout_changed(&mut self) {
        self.layout_change_calls += 1;
    }

    fn respawn_crew(&mut self) {
        self.respawn_calls += 1;
    }
}

/// Part 1 "Crew Cabin" (2 seats: Kim@0, Val@1) + part 2 "Science Lab"
/// (1 empty seat), one connected space.
fn cabin_and_lab() -> SimVessel {
    let mut vessel = SimVessel::new(vec![
        (0, Part::new(1, "Crew Cabin", 2)),
        (0, Part::new(2, "Science Lab", 1)),
    ]);
    vessel.board(100, "Kim", SeatRef::new(1, 0));
    vessel.board(101, "Val", SeatRef::new(1, 1));
    vessel
}

// ── 1. Scheduler gates ──────────────────────────────────────────────────

fn validate_scheduler_gates(verbose: bool, json: bool) -> Vec<TestResult> {
    banner(json, "Scheduler Gates");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(1);

    // Non-free-flight situations never trigger, even with every
    // cooldown long lapsed.
    let mut sched = Scheduler::new(30.0);
    sched.on_init(0.0);
    let mut blocked = true;
    for situation in [
        Situation::PreLaunch,
        Situation::Landed,
        Situation::Splashed,
        Situation::Flying,
        Situation::SubOrbital,
    ] {
        for step in 0..10_000 {
            let now = 10_000.0 + step as f64 * 0.02;
            if sched.tick(now, 0.0, situation, 0.02, &mut rng) == TriggerDecision::Trigger {
                blocked = false;
            }
        }
    }
    results.push(TestResult::new(
        "situation_gate",
        blocked,
        "50k ticks outside free flight, zero triggers".into(),
    ));

    // Throttle suppresses and stamps the burn time.
    let mut sched = Scheduler::new(30.0);
    sched.on_init(0.0);
    let d = sched.tick(5_000.0, 0.75, Situation::Orbiting, 0.02, &mut rng);
    let stamped = d == TriggerDecision::NoTrigger && sched.last_burn() == 5_000.0;
    results.push(TestResult::new(
        "thrust_suppression",
        stamped,
        format!("last_burn stamped at {}", sched.last_burn()),
    ));

    // Degenerate tick durations never divide badly.
    let mut sched = Scheduler::new(30.0);
    sched.on_init(0.0);
    let mut safe = true;
    for bad in [0.0, -0.02, f64::NAN, f64::INFINITY] {
        if sched.tick(9_000.0, 0.0, Situation::Orbiting, bad, &mut rng)
            == TriggerDecision::Trigger
        {
            safe = false;
        }
    }
    results.push(TestResult::new(
        "degenerate_tick_duration",
        safe,
        "0/negative/NaN/inf tick durations all NoTrigger".into(),
    ));

    // Cooldown monotonicity over a long run.
    let mut sched = Scheduler::new(30.0);
    sched.on_init(0.0);
    let mut now = 0.0;
    let mut last_trigger = 0.0;
    let mut min_gap = f64::MAX;
    let mut triggers = 0;
    while triggers < 200 && now < 1e7 {
        now += 0.5;
        if sched.tick(now, 0.0, Situation::Escaping, 0.5, &mut rng) == TriggerDecision::Trigger {
            if triggers > 0 {
                min_gap = min_gap.min(now - last_trigger);
            }
            last_trigger = now;
            triggers += 1;
        }
    }
    results.push(TestResult::new(
        "cooldown_monotonicity",
        triggers == 200 && min_gap >= 30.0,
        format!("{} triggers, smallest gap {:.2}s (floor 30s)", triggers, min_gap),
    ));

    if verbose && !json {
        println!("  scheduler gate sweep done");
    }
    results
}

// ── 2. Swap mechanics ───────────────────────────────────────────────────

fn validate_swap_mechanics(_verbose: bool, json: bool) -> Vec<TestResult> {
    banner(json, "Swap Mechanics");
    let mut results = Vec::new();

    // Forced pick: Kim to the empty lab seat.
    let mut vessel = cabin_and_lab();
    let snapshot = vessel.connectivity_snapshot();
    let space = snapshot.spaces[0].clone();
    let kim = space.occupant_in_seat(SeatRef::new(1, 0)).unwrap().clone();
    let outcome = reassign::move_occupant(&space, &mut vessel, &kim, SeatRef::new(2, 0));
    let ok = outcome.is_swap()
        && vessel.seat_of(100) == Some(SeatRef::new(2, 0))
        && vessel.seat_of(101) == Some(SeatRef::new(1, 1))
        && vessel.violation().is_none();
    results.push(TestResult::new(
        "move_to_empty_seat",
        ok,
        "Kim -> lab, Val untouched".into(),
    ));

    // Forced pick: Val onto Kim's seat, a true two-way swap.
    let mut vessel = cabin_and_lab();
    let snapshot = vessel.connectivity_snapshot();
    let space = snapshot.spaces[0].clone();
    let val = space.occupant_in_seat(SeatRef::new(1, 1)).unwrap().clone();
    let outcome = reassign::move_occupant(&space, &mut vessel, &val, SeatRef::new(1, 0));
    let displaced_ok = matches!(
        &outcome,
        ReassignmentOutcome::Swapped { displaced: Some(d), .. } if d.occupant_id == 100
    );
    let ok = displaced_ok
        && vessel.seat_of(101) == Some(SeatRef::new(1, 0))
        && vessel.seat_of(100) == Some(SeatRef::new(1, 1))
        && vessel.violation().is_none();
    results.push(TestResult::new(
        "swap_occupied_seat",
        ok,
        "Val <-> Kim, both reseated".into(),
    ));

    // Self-seat draw is a no-op.
    let mut vessel = cabin_and_lab();
    let snapshot = vessel.connectivity_snapshot();
    let space = snapshot.spaces[0].clone();
    let kim = space.occupant_in_seat(SeatRef::new(1, 0)).unwrap().clone();
    let outcome = reassign::move_occupant(&space, &mut vessel, &kim, kim.seat);
    let ok = outcome == ReassignmentOutcome::StayedPut { occupant_id: 100 }
        && vessel.seat_of(100) == Some(SeatRef::new(1, 0));
    results.push(TestResult::new(
        "self_seat_no_op",
        ok,
        "own-seat draw mutates nothing".into(),
    ));

    // A single-seat space can never produce a real swap.
    let mut vessel = SimVessel::new(vec![(0, Part::new(1, "Lone Pod", 1))]);
    vessel.board(100, "Kim", SeatRef::new(1, 0));
    let snapshot = vessel.connectivity_snapshot();
    let mut rng = StdRng::seed_from_u64(2);
    let mut only_no_ops = true;
    for _ in 0..500 {
        if reassign::select_and_move(&snapshot, &mut vessel, &mut rng).is_swap() {
            only_no_ops = false;
        }
    }
    results.push(TestResult::new(
        "single_seat_space",
        only_no_ops && vessel.seat_of(100) == Some(SeatRef::new(1, 0)),
        "500 draws in a 1-seat space, zero swaps".into(),
    ));

    // Inconsistent seat reference aborts before mutating.
    let mut vessel = cabin_and_lab();
    let snapshot = vessel.connectivity_snapshot();
    let space = snapshot.spaces[0].clone();
    let stray = Occupant::new(100, "Kim", SeatRef::new(99, 0));
    let outcome = reassign::move_occupant(&space, &mut vessel, &stray, SeatRef::new(2, 0));
    let ok = matches!(outcome, ReassignmentOutcome::Inconsistent { .. })
        && vessel.seat_of(100) == Some(SeatRef::new(1, 0))
        && vessel.violation().is_none();
    results.push(TestResult::new(
        "inconsistent_fails_closed",
        ok,
        "bad seat reference aborts with no mutation".into(),
    ));

    results
}

// ── 3. Soak run ─────────────────────────────────────────────────────────

fn validate_soak_run(verbose: bool, json: bool) -> Vec<TestResult> {
    banner(json, "Soak Run");
    let mut results = Vec::new();

    let mut vessel = SimVessel::new(vec![
        (0, Part::new(1, "Command Pod", 3)),
        (0, Part::new(2, "Hab Ring", 4)),
        (0, Part::new(3, "Cupola", 1)),
        (1, Part::new(4, "Escape Pod", 2)),
    ]);
    vessel.board(100, "Kim", SeatRef::new(1, 0));
    vessel.board(101, "Val", SeatRef::new(1, 2));
    vessel.board(102, "Sam", SeatRef::new(2, 1));
    vessel.board(103, "Ada", SeatRef::new(4, 0));

    let mut addon = HotSeat::new(HotSeatConfig {
        min_interval: 30.0,
        rng_seed: Some(3),
    });
    addon.on_init(&vessel);

    let mut swaps = 0u32;
    let mut cycles = 0u32;
    let mut first_violation = None;
    let mut cross_space_leak = false;
    while swaps < 500 && vessel.now < 1e8 {
        vessel.now += 0.5;
        if let Some(outcome) = addon.on_tick(&mut vessel, 0.5) {
            cycles += 1;
            if outcome.is_swap() {
                swaps += 1;
            }
            if first_violation.is_none() {
                first_violation = vessel.violation();
            }
            if vessel.seat_of(103).map(|s| s.part_id) != Some(4) {
                cross_space_leak = true;
            }
        }
    }

    results.push(TestResult::new(
        "soak_consistency",
        first_violation.is_none() && swaps == 500,
        first_violation.unwrap_or_else(|| format!("{} swaps / {} cycles, no violations", swaps, cycles)),
    ));
    results.push(TestResult::new(
        "soak_space_scoping",
        !cross_space_leak,
        "detached-pod occupant never crossed spaces".into(),
    ));
    results.push(TestResult::new(
        "soak_respawn_accounting",
        vessel.layout_change_calls == swaps
            && vessel.respawn_calls + 1 >= swaps
            && vessel.respawn_calls <= swaps,
        format!(
            "{} layout changes, {} respawns for {} swaps",
            vessel.layout_change_calls, vessel.respawn_calls, swaps
        ),
    ));

    if verbose && !json {
        println!("  soak: {} cycles over {:.0}s sim time", cycles, vessel.now);
    }
    results
}

// ── 4. Calibration ──────────────────────────────────────────────────────

fn validate_calibration(verbose: bool, json: bool) -> Vec<TestResult> {
    banner(json, "Expected-Wait Calibration");
    let mut results = Vec::new();

    let interval = 30.0;
    let dt = 0.25;
    let mut sched = Scheduler::new(interval);
    let mut rng = StdRng::seed_from_u64(4);
    sched.on_init(0.0);

    let mut now = 0.0;
    let mut last = 0.0;
    let mut gaps = Vec::new();
    while gaps.len() < 1000 && now < 1e8 {
        now += dt;
        if sched.tick(now, 0.0, Situation::Orbiting, dt, &mut rng) == TriggerDecision::Trigger {
            gaps.push(now - last);
            last = now;
        }
    }

    let mean = gaps.iter().sum::<f64>() / gaps.len() as f64;
    // Cooldown of one interval plus a geometric wait averaging one
    // interval: the gap mean should sit near 2x.
    let ok = gaps.len() == 1000 && mean > 1.6 * interval && mean < 2.5 * interval;
    results.push(TestResult::new(
        "mean_gap_calibration",
        ok,
        format!(
            "mean gap {:.1}s over {} cycles (expected ~{:.0}s)",
            mean,
            gaps.len(),
            2.0 * interval
        ),
    ));

    if verbose && !json {
        let min = gaps.iter().cloned().fold(f64::MAX, f64::min);
        let max = gaps.iter().cloned().fold(0.0, f64::max);
        println!("  gaps: min {:.1}s / mean {:.1}s / max {:.1}s", min, mean, max);
    }
    results
}

// ── 5. Uniformity ───────────────────────────────────────────────────────

fn validate_uniformity(verbose: bool, json: bool) -> Vec<TestResult> {
    banner(json, "Destination Uniformity");
    let mut results = Vec::new();

    // Reset the 2-person cabin+lab layout before every draw and count
    // where Kim and Val end up; each of the three outcomes per source
    // (two seats + staying put) should appear about equally often.
    let mut vessel = cabin_and_lab();
    let snapshot = vessel.connectivity_snapshot();
    let mut rng = StdRng::seed_from_u64(5);

    let trials = 6000;
    let mut stayed = 0u32;
    let mut to_lab = 0u32;
    let mut swapped_within_cabin = 0u32;
    for _ in 0..trials {
        vessel.board(100, "Kim", SeatRef::new(1, 0));
        vessel.board(101, "Val", SeatRef::new(1, 1));
        match reassign::select_and_move(&snapshot, &mut vessel, &mut rng) {
            ReassignmentOutcome::StayedPut { .. } => stayed += 1,
            ReassignmentOutcome::Swapped { moved, .. } => {
                if moved.to.part_id == 2 {
                    to_lab += 1;
                } else {
                    swapped_within_cabin += 1;
                }
            }
            other => panic!("unexpected outcome in uniformity sweep: {:?}", other),
        }
    }

    // Each bucket has expected probability 1/3; allow a wide band.
    let third = trials as f64 / 3.0;
    let within = |count: u32| {
        let c = count as f64;
        c > third * 0.85 && c < third * 1.15
    };
    let ok = within(stayed) && within(to_lab) && within(swapped_within_cabin);
    results.push(TestResult::new(
        "destination_uniformity",
        ok,
        format!(
            "stayed {} / to lab {} / cabin swap {} of {} (expect ~{:.0} each)",
            stayed, to_lab, swapped_within_cabin, trials, third
        ),
    ));

    if verbose && !json {
        println!("  uniformity counts collected over {} trials", trials);
    }
    results
}
