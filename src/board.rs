//! Placement data: piece positions, stacks, and derived queries
//!
//! The board tracks where pieces are and nothing else. Legality is decided
//! by the game state machine; the mutators here only assert structural
//! contracts (a placed piece must come from hand, a lifted piece must be
//! top of its stack). Contract violations panic.

use crate::hex::Hex;
use crate::pieces::{Piece, Player};
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Board {
    /// Positions of in-play pieces
    positions: FxHashMap<Piece, Hex>,
    /// Stacks at occupied positions, bottom-first and never empty
    stacks: FxHashMap<Hex, Vec<Piece>>,
    /// Pieces not yet placed
    in_hand: FxHashSet<Piece>,
}

impl Board {
    /// Create a board with every rostered piece in hand
    pub fn new(rostered: impl IntoIterator<Item = Piece>) -> Self {
        Self {
            positions: FxHashMap::default(),
            stacks: FxHashMap::default(),
            in_hand: rostered.into_iter().collect(),
        }
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Position of a piece, or `None` while it is in hand
    pub fn position_of(&self, piece: Piece) -> Option<Hex> {
        self.positions.get(&piece).copied()
    }

    pub fn is_in_hand(&self, piece: Piece) -> bool {
        self.in_hand.contains(&piece)
    }

    /// Unplayed pieces belonging to a player, in deterministic order
    pub fn in_hand_pieces(&self, player: Player) -> Vec<Piece> {
        let mut pieces: Vec<Piece> = self
            .in_hand
            .iter()
            .filter(|p| p.owner == player)
            .copied()
            .collect();
        pieces.sort_unstable();
        pieces
    }

    /// In-play pieces belonging to a player, in deterministic order
    pub fn in_play_pieces(&self, player: Player) -> Vec<Piece> {
        let mut pieces: Vec<Piece> = self
            .positions
            .keys()
            .filter(|p| p.owner == player)
            .copied()
            .collect();
        pieces.sort_unstable();
        pieces
    }

    /// True if no piece has been placed yet
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn is_occupied(&self, hex: Hex) -> bool {
        self.stacks.contains_key(&hex)
    }

    pub fn stack(&self, hex: Hex) -> Option<&[Piece]> {
        self.stacks.get(&hex).map(|s| s.as_slice())
    }

    /// Number of pieces stacked at a position (0 when unoccupied)
    pub fn stack_height(&self, hex: Hex) -> usize {
        self.stacks.get(&hex).map_or(0, |s| s.len())
    }

    pub fn top_of_stack(&self, hex: Hex) -> Option<Piece> {
        self.stacks.get(&hex).and_then(|s| s.last()).copied()
    }

    /// Height of a piece within its stack, 1-based; `None` while in hand
    pub fn height_of(&self, piece: Piece) -> Option<usize> {
        let hex = self.position_of(piece)?;
        let stack = &self.stacks[&hex];
        stack.iter().position(|p| *p == piece).map(|i| i + 1)
    }

    pub fn is_top_of_stack(&self, piece: Piece) -> bool {
        self.position_of(piece)
            .and_then(|hex| self.top_of_stack(hex))
            == Some(piece)
    }

    /// Top-of-stack pieces occupying the 6 neighbors of a position
    pub fn pieces_adjacent_to_hex(&self, hex: Hex) -> Vec<Piece> {
        hex.adjacent()
            .into_iter()
            .filter_map(|n| self.top_of_stack(n))
            .collect()
    }

    /// Top-of-stack pieces occupying the 6 neighbors of a piece's position
    pub fn pieces_adjacent_to(&self, piece: Piece) -> Vec<Piece> {
        match self.position_of(piece) {
            Some(hex) => self.pieces_adjacent_to_hex(hex),
            None => vec![],
        }
    }

    /// True if the piece is in play with all 6 neighbors occupied
    pub fn is_surrounded(&self, piece: Piece) -> bool {
        match self.position_of(piece) {
            Some(hex) => hex.adjacent().into_iter().all(|n| self.is_occupied(n)),
            None => false,
        }
    }

    /// Unoccupied positions adjacent to at least one in-play piece.
    ///
    /// `excluding` treats one piece as absent. `own_side_only` further
    /// removes positions adjacent to any opposing top-of-stack piece,
    /// which is the placement-adjacency rule after the opening.
    pub fn placement_candidates(
        &self,
        excluding: Option<Piece>,
        own_side_only: Option<Player>,
    ) -> FxHashSet<Hex> {
        let occupied = self.occupied_positions(excluding);

        let mut spaces: FxHashSet<Hex> = occupied
            .iter()
            .flat_map(|hex| hex.adjacent())
            .filter(|hex| !occupied.contains(hex))
            .collect();

        if let Some(player) = own_side_only {
            for (&hex, stack) in &self.stacks {
                let top = *stack.last().expect("stacks are never empty");
                if Some(top) == excluding || top.owner == player {
                    continue;
                }
                for n in hex.adjacent() {
                    spaces.remove(&n);
                }
            }
        }

        spaces
    }

    /// Positions held by in-play pieces, optionally treating one as absent
    fn occupied_positions(&self, excluding: Option<Piece>) -> FxHashSet<Hex> {
        self.positions
            .iter()
            .filter(|(piece, _)| Some(**piece) != excluding)
            .map(|(_, &hex)| hex)
            .collect()
    }

    // ========================================================================
    // ONE-HIVE RULE
    // ========================================================================

    /// Check that the in-play pieces form a single connected group,
    /// optionally as if one piece had been lifted off the board.
    ///
    /// Only the fully-lifted configuration is checked, never intermediate
    /// sliding positions; callers rely on that exact behavior.
    pub fn is_connected(&self, excluding: Option<Piece>) -> bool {
        let all = self.occupied_positions(excluding);
        let start = match all.iter().next() {
            Some(&hex) => hex,
            None => return true,
        };

        let mut found = FxHashSet::default();
        found.insert(start);
        let mut frontier = vec![start];

        while let Some(hex) = frontier.pop() {
            for n in hex.adjacent() {
                if all.contains(&n) && found.insert(n) {
                    frontier.push(n);
                }
            }
        }

        found.len() == all.len()
    }

    // ========================================================================
    // MUTATORS
    // ========================================================================

    /// Place an in-hand piece on the board
    pub fn place(&mut self, piece: Piece, at: Hex) {
        assert!(
            self.in_hand.remove(&piece),
            "placed piece must be in hand: {piece:?}"
        );
        self.stacks.entry(at).or_default().push(piece);
        self.positions.insert(piece, at);
    }

    /// Move a top-of-stack piece to another position, stacking on arrival
    pub fn move_piece(&mut self, piece: Piece, to: Hex) {
        let from = self
            .position_of(piece)
            .expect("moved piece must be in play");
        let stack = self.stacks.get_mut(&from).expect("stacks track positions");
        assert_eq!(
            stack.last(),
            Some(&piece),
            "moved piece must be top of stack: {piece:?}"
        );
        stack.pop();
        if stack.is_empty() {
            self.stacks.remove(&from);
        }
        self.stacks.entry(to).or_default().push(piece);
        self.positions.insert(piece, to);
    }

    /// Return a placed piece to hand; it must be alone at its position.
    /// Used to reverse a placement.
    pub fn unplace(&mut self, piece: Piece) {
        let hex = self
            .position_of(piece)
            .expect("unplaced piece must be in play");
        assert_eq!(
            self.stacks.get(&hex).map(|s| s.as_slice()),
            Some([piece].as_slice()),
            "unplaced piece must be alone at its position: {piece:?}"
        );
        self.stacks.remove(&hex);
        self.positions.remove(&piece);
        self.in_hand.insert(piece);
    }
}
