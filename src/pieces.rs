//! Piece identity and per-player rosters

use crate::options::Options;
use serde::{Deserialize, Serialize};

/// Player color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    White = 0,
    Black = 1,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }
}

/// Bug class, determining how a piece moves
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Bug {
    Queen,
    Spider,
    Beetle,
    Hopper,
    Ant,
    LadyBug,
    Mosquito,
    PillBug,
}

/// A piece: immutable identity by (bug, owner, serial index).
///
/// `index` is 1-based within the (owner, bug) pair, so the two white
/// spiders are `(Spider, White, 1)` and `(Spider, White, 2)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Piece {
    pub bug: Bug,
    pub owner: Player,
    pub index: u8,
}

impl Piece {
    pub const fn new(bug: Bug, owner: Player, index: u8) -> Self {
        Self { bug, owner, index }
    }
}

/// Bug classes in a single player's base set, with multiplicity
const BASE_SET: [(Bug, u8); 5] = [
    (Bug::Queen, 1),
    (Bug::Spider, 2),
    (Bug::Beetle, 2),
    (Bug::Hopper, 3),
    (Bug::Ant, 3),
];

/// Build one player's full roster for the given options.
pub fn roster(owner: Player, options: &Options) -> Vec<Piece> {
    let mut pieces = Vec::new();
    for (bug, count) in BASE_SET {
        for index in 1..=count {
            pieces.push(Piece::new(bug, owner, index));
        }
    }
    if options.lady_bug {
        pieces.push(Piece::new(Bug::LadyBug, owner, 1));
    }
    if options.mosquito {
        pieces.push(Piece::new(Bug::Mosquito, owner, 1));
    }
    if options.pill_bug {
        pieces.push(Piece::new(Bug::PillBug, owner, 1));
    }
    pieces
}
