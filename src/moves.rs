//! Move values and per-class move generation
//!
//! Generators answer one question: given the board as it stands, where can
//! this piece physically go? The shared preconditions (ownership, top of
//! stack, movement locks, the one-hive rule for the lifted piece) are
//! applied by the state machine before a generator runs.
//!
//! Throughout a generated move the moving piece's origin is treated as
//! vacated: gates and hive-contact checks see the board as it would be
//! with the piece already lifted.

use crate::board::Board;
use crate::hex::Hex;
use crate::pieces::{Bug, Piece};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// A move submitted to, or produced by, the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    /// Place an in-hand piece
    Place { piece: Piece, at: Hex },
    /// Move an in-play piece under its own power (climbs included)
    Slide { piece: Piece, to: Hex },
    /// Relocate an adjacent piece with the Pill Bug ability
    Carry { acting: Piece, target: Piece, to: Hex },
    /// Forced turn skip; generated by the engine, never submitted
    Pass,
}

impl Move {
    /// The piece that changes position, if any
    pub fn moved_piece(&self) -> Option<Piece> {
        match *self {
            Move::Place { piece, .. } | Move::Slide { piece, .. } => Some(piece),
            Move::Carry { target, .. } => Some(target),
            Move::Pass => None,
        }
    }

    /// The position the moved piece ends on, if any
    pub fn destination(&self) -> Option<Hex> {
        match *self {
            Move::Place { at, .. } => Some(at),
            Move::Slide { to, .. } | Move::Carry { to, .. } => Some(to),
            Move::Pass => None,
        }
    }
}

// ============================================================================
// FREEDOM OF MOVEMENT
// ============================================================================

/// Stack height at a position, with the mover's origin counted as one lower
fn effective_height(board: &Board, hex: Hex, origin: Hex) -> usize {
    let height = board.stack_height(hex);
    if hex == origin {
        height.saturating_sub(1)
    } else {
        height
    }
}

fn is_effectively_empty(board: &Board, hex: Hex, origin: Hex) -> bool {
    effective_height(board, hex, origin) == 0
}

/// Ground-level gate: a slide from `from` to `to` is open when at least one
/// of the two positions adjacent to both carries no stack.
fn ground_gate_open(board: &Board, from: Hex, to: Hex, origin: Hex) -> bool {
    from.common_neighbors(to)
        .into_iter()
        .any(|gate| is_effectively_empty(board, gate, origin))
}

/// Height-aware gate for climbing pieces: the slide is blocked only when
/// both gate positions stack at least as high as the greater of the mover's
/// pre-move height and the destination's post-move height.
fn climb_gate_open(board: &Board, from: Hex, to: Hex, origin: Hex, mover_height: usize) -> bool {
    let clearance = mover_height.max(effective_height(board, to, origin) + 1);
    from.common_neighbors(to)
        .into_iter()
        .any(|gate| effective_height(board, gate, origin) < clearance)
}

/// True if `hex` touches the hive with the mover lifted out of `origin`
fn touches_hive(board: &Board, hex: Hex, origin: Hex) -> bool {
    hex.adjacent()
        .into_iter()
        .any(|n| effective_height(board, n, origin) > 0)
}

/// Elementary ground slides available from `from` for a piece whose real
/// position is `origin`: adjacent, empty, gate-passing, still touching the
/// hive. Shared by the Queen, Spider, Ant, and Pill Bug generators.
fn slide_steps(board: &Board, from: Hex, origin: Hex) -> Vec<Hex> {
    from.adjacent()
        .into_iter()
        .filter(|&to| {
            to != origin
                && is_effectively_empty(board, to, origin)
                && ground_gate_open(board, from, to, origin)
                && touches_hive(board, to, origin)
        })
        .collect()
}

// ============================================================================
// GENERATORS
// ============================================================================

/// Destinations for a piece moved as the given class. The class is passed
/// separately so the Mosquito can borrow another class's generator.
pub(crate) fn destinations(board: &Board, piece: Piece, as_bug: Bug) -> FxHashSet<Hex> {
    let origin = match board.position_of(piece) {
        Some(hex) => hex,
        None => return FxHashSet::default(),
    };

    let mut out = FxHashSet::default();
    match as_bug {
        // The Pill Bug's own locomotion mirrors the Queen's
        Bug::Queen | Bug::PillBug => out.extend(slide_steps(board, origin, origin)),
        Bug::Ant => ant_destinations(board, origin, &mut out),
        Bug::Spider => spider_destinations(board, origin, &mut out),
        Bug::Beetle => beetle_destinations(board, origin, &mut out),
        Bug::Hopper => hopper_destinations(board, origin, &mut out),
        Bug::LadyBug => lady_bug_destinations(board, origin, &mut out),
        Bug::Mosquito => mosquito_destinations(board, piece, origin, &mut out),
    }
    out
}

/// Ant: every position reachable by chained ground slides around the
/// perimeter.
fn ant_destinations(board: &Board, origin: Hex, out: &mut FxHashSet<Hex>) {
    let mut frontier = slide_steps(board, origin, origin);
    out.extend(frontier.iter().copied());

    while let Some(hex) = frontier.pop() {
        for next in slide_steps(board, hex, origin) {
            if out.insert(next) {
                frontier.push(next);
            }
        }
    }
}

/// Spider: exactly three chained ground slides with no revisited position;
/// only third positions count.
fn spider_destinations(board: &Board, origin: Hex, out: &mut FxHashSet<Hex>) {
    fn walk(board: &Board, origin: Hex, path: &mut Vec<Hex>, out: &mut FxHashSet<Hex>) {
        let from = *path.last().expect("path starts at the origin");
        if path.len() == 4 {
            out.insert(from);
            return;
        }
        for next in slide_steps(board, from, origin) {
            if !path.contains(&next) {
                path.push(next);
                walk(board, origin, path, out);
                path.pop();
            }
        }
    }

    let mut path = vec![origin];
    walk(board, origin, &mut path, out);
}

/// Beetle: one height-aware step onto any neighbor, empty or occupied.
fn beetle_destinations(board: &Board, origin: Hex, out: &mut FxHashSet<Hex>) {
    let mover_height = board.stack_height(origin);
    for to in origin.adjacent() {
        if !climb_gate_open(board, origin, to, origin, mover_height) {
            continue;
        }
        if board.is_occupied(to) || touches_hive(board, to, origin) {
            out.insert(to);
        }
    }
}

/// Hopper: jump in a straight line over at least one occupied position,
/// landing on the first empty one. The gate does not apply.
fn hopper_destinations(board: &Board, origin: Hex, out: &mut FxHashSet<Hex>) {
    for direction in 0..6u8 {
        let mut hex = origin.neighbor(direction);
        if !board.is_occupied(hex) {
            continue;
        }
        while board.is_occupied(hex) {
            hex = hex.neighbor(direction);
        }
        out.insert(hex);
    }
}

/// Lady Bug: two climbing steps across occupied positions, then one
/// descent to an adjacent empty position. No position repeats.
fn lady_bug_destinations(board: &Board, origin: Hex, out: &mut FxHashSet<Hex>) {
    for first in origin.adjacent() {
        if !board.is_occupied(first) || !climb_gate_open(board, origin, first, origin, 1) {
            continue;
        }
        for second in first.adjacent() {
            if second == origin || second == first || !board.is_occupied(second) {
                continue;
            }
            let atop_first = board.stack_height(first) + 1;
            if !climb_gate_open(board, first, second, origin, atop_first) {
                continue;
            }
            for last in second.adjacent() {
                if last == origin || last == first || !is_effectively_empty(board, last, origin) {
                    continue;
                }
                let atop_second = board.stack_height(second) + 1;
                if climb_gate_open(board, second, last, origin, atop_second) {
                    out.insert(last);
                }
            }
        }
    }
}

/// Mosquito: at ground level, the union of the generators of each distinct
/// class adjacent to it (another Mosquito contributes nothing); once atop
/// the hive, exactly a Beetle.
fn mosquito_destinations(board: &Board, piece: Piece, origin: Hex, out: &mut FxHashSet<Hex>) {
    if board.height_of(piece) > Some(1) {
        beetle_destinations(board, origin, out);
        return;
    }

    let mut copied: Vec<Bug> = board
        .pieces_adjacent_to_hex(origin)
        .into_iter()
        .map(|p| p.bug)
        .filter(|&bug| bug != Bug::Mosquito)
        .collect();
    copied.sort_unstable();
    copied.dedup();

    for bug in copied {
        out.extend(destinations(board, piece, bug));
    }
}

// ============================================================================
// CARRY ("YOINK")
// ============================================================================

/// Destinations a piece with the Pill Bug ability at `acting_pos` may carry
/// `target` to. Covers the physical constraints only: a ground-level
/// target whose removal keeps the hive whole, with open ground gates both
/// onto the acting piece's position and down to the destination. Movement
/// locks on the two pieces are the state machine's concern.
pub(crate) fn carry_destinations(board: &Board, acting_pos: Hex, target: Piece) -> Vec<Hex> {
    let target_pos = match board.position_of(target) {
        Some(hex) => hex,
        None => return vec![],
    };

    // Carried pieces travel over the acting piece: stacked targets would
    // leave their stack behind, so only lone pieces qualify.
    if board.stack_height(target_pos) != 1 {
        return vec![];
    }

    if !board.is_connected(Some(target)) {
        return vec![];
    }

    // Climbing onto the acting piece
    if !ground_gate_open(board, target_pos, acting_pos, target_pos) {
        return vec![];
    }

    // Descending to an empty neighbor of the acting piece
    acting_pos
        .adjacent()
        .into_iter()
        .filter(|&to| {
            to != target_pos
                && !board.is_occupied(to)
                && ground_gate_open(board, acting_pos, to, target_pos)
        })
        .collect()
}
