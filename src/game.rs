//! Game state, legal move assembly, apply/undo

use crate::board::Board;
use crate::hex::{Hex, ORIGIN};
use crate::moves::{carry_destinations, destinations, Move};
use crate::options::Options;
use crate::pieces::{roster, Bug, Piece, Player};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    Win(Player),
    Draw,
}

/// Rule-level rejection of a submitted move. The state is left untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("the game has already concluded")]
    GameOver,
    #[error("move is not legal for the side to move")]
    Illegal,
}

/// One applied half-move plus what is needed to reverse it exactly
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct HistoryEntry {
    mv: Move,
    /// Origin of the moved piece, for Slide and Carry
    from: Option<Hex>,
    /// Locks as they stood before the half-move
    last_moved: Option<Piece>,
    last_carried: Option<Piece>,
}

/// Full game state (clone for lookahead; clones share nothing mutable)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    options: Options,
    /// The test/search escape hatch; togglable at any time
    validate_moves: bool,

    current_player: Player,
    /// Half-moves applied so far, auto-passes included
    move_number: u16,
    /// Placements and moves taken per player, indexed by `Player`;
    /// forced passes do not count
    turns_taken: [u16; 2],

    /// Piece that slid or climbed on the last half-move
    last_moved: Option<Piece>,
    /// Piece that was carried on the last half-move
    last_carried: Option<Piece>,

    history: Vec<HistoryEntry>,
    result: GameResult,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl GameState {
    /// Create a game with every piece in hand. The options are frozen for
    /// the lifetime of the game.
    pub fn new(options: Options) -> Self {
        let mut pieces = roster(Player::White, &options);
        pieces.extend(roster(Player::Black, &options));
        Self {
            board: Board::new(pieces),
            options,
            validate_moves: true,
            current_player: Player::White,
            move_number: 0,
            turns_taken: [0, 0],
            last_moved: None,
            last_carried: None,
            history: Vec::new(),
            result: GameResult::Ongoing,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn move_number(&self) -> u16 {
        self.move_number
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn is_over(&self) -> bool {
        self.result != GameResult::Ongoing
    }

    pub fn last_moved(&self) -> Option<Piece> {
        self.last_moved
    }

    pub fn last_carried(&self) -> Option<Piece> {
        self.last_carried
    }

    /// Applied half-moves in order, auto-passes included
    pub fn history(&self) -> impl ExactSizeIterator<Item = Move> + '_ {
        self.history.iter().map(|entry| entry.mv)
    }

    pub fn position_of(&self, piece: Piece) -> Option<Hex> {
        self.board.position_of(piece)
    }

    pub fn is_connected(&self, excluding: Option<Piece>) -> bool {
        self.board.is_connected(excluding)
    }

    /// Enable or disable legality checking in `apply`. Disabling is an
    /// escape hatch for constructing arbitrary positions; applied moves
    /// must still be structurally possible.
    pub fn set_move_validation(&mut self, validate: bool) {
        self.validate_moves = validate;
    }

    // ========================================================================
    // LEGAL MOVES
    // ========================================================================

    /// Legal moves for the side to move
    pub fn legal_moves(&self) -> Vec<Move> {
        self.moves_for(self.current_player)
    }

    /// Legal moves for a player, as if it were their turn. Pure with
    /// respect to (board, options, side, locks); never includes `Pass`.
    pub fn moves_for(&self, player: Player) -> Vec<Move> {
        if self.is_over() {
            return vec![];
        }

        // The entire first half-move is a placement at the origin
        if self.board.is_empty() {
            return self
                .placeable_pieces(player)
                .into_iter()
                .map(|piece| Move::Place { piece, at: ORIGIN })
                .collect();
        }

        // Queen must be on the board by a side's 4th turn; until it is,
        // nothing else may be played
        let queen = Piece::new(Bug::Queen, player, 1);
        if self.board.is_in_hand(queen) && self.turns_taken[player as usize] >= 3 {
            return self
                .placement_candidates(player)
                .into_iter()
                .map(|at| Move::Place { piece: queen, at })
                .collect();
        }

        let mut moves = Vec::new();

        let spaces = self.placement_candidates(player);
        for piece in self.placeable_pieces(player) {
            for &at in &spaces {
                moves.push(Move::Place { piece, at });
            }
        }

        for piece in self.board.in_play_pieces(player) {
            if !self.board.is_top_of_stack(piece) {
                continue;
            }
            let locked = self.is_locked(piece);

            if !locked && self.board.is_connected(Some(piece)) {
                for to in destinations(&self.board, piece, piece.bug) {
                    moves.push(Move::Slide { piece, to });
                }
            }

            if self.has_carry_ability(piece)
                && (!locked || self.options.allow_special_ability_after_yoink)
            {
                self.carry_moves(piece, &mut moves);
            }
        }

        moves
    }

    /// Unoccupied positions where the player may place a piece right now
    pub fn placement_candidates(&self, player: Player) -> Vec<Hex> {
        // The second half-move may touch opposing pieces; afterwards
        // placements touch only the player's own, unless relaxed
        let own_side_only = if self.move_number > 1 && !self.options.relaxed_placement {
            Some(player)
        } else {
            None
        };
        let mut spaces: Vec<Hex> = self
            .board
            .placement_candidates(None, own_side_only)
            .into_iter()
            .collect();
        spaces.sort_unstable();
        spaces
    }

    fn placeable_pieces(&self, player: Player) -> Vec<Piece> {
        let mut pieces = self.board.in_hand_pieces(player);
        if self.options.no_first_move_queen && self.board.in_play_pieces(player).is_empty() {
            pieces.retain(|p| p.bug != Bug::Queen);
        }
        pieces
    }

    fn is_locked(&self, piece: Piece) -> bool {
        self.last_moved == Some(piece) || self.last_carried == Some(piece)
    }

    /// True if the piece may act as a Pill Bug: it is one, or it is a
    /// ground-level Mosquito next to one
    fn has_carry_ability(&self, piece: Piece) -> bool {
        match piece.bug {
            Bug::PillBug => true,
            Bug::Mosquito => {
                self.board.height_of(piece) == Some(1)
                    && self
                        .board
                        .pieces_adjacent_to(piece)
                        .iter()
                        .any(|p| p.bug == Bug::PillBug)
            }
            _ => false,
        }
    }

    fn carry_moves(&self, acting: Piece, moves: &mut Vec<Move>) {
        let acting_pos = match self.board.position_of(acting) {
            Some(hex) => hex,
            None => return,
        };
        for target in self.board.pieces_adjacent_to_hex(acting_pos) {
            // A just-moved or just-carried piece may never be carried
            if self.is_locked(target) {
                continue;
            }
            for to in carry_destinations(&self.board, acting_pos, target) {
                moves.push(Move::Carry { acting, target, to });
            }
        }
    }

    // ========================================================================
    // APPLY / UNDO
    // ========================================================================

    /// Apply a move for the side to move. Rejected moves leave the state
    /// untouched; accepted moves fully commit, then any shut-out turns are
    /// passed automatically.
    pub fn apply(&mut self, mv: Move) -> Result<(), MoveError> {
        if self.validate_moves {
            if self.is_over() {
                return Err(MoveError::GameOver);
            }
            if !self.legal_moves().contains(&mv) {
                return Err(MoveError::Illegal);
            }
        }

        self.commit(mv);

        // Auto-pass on shutout. Passing clears the locks, so a position
        // repeats exactly after two consecutive passes; stop there.
        let mut passes = 0;
        while self.result == GameResult::Ongoing
            && passes < 2
            && self.moves_for(self.current_player).is_empty()
        {
            self.commit(Move::Pass);
            passes += 1;
        }

        Ok(())
    }

    fn commit(&mut self, mv: Move) {
        let mut entry = HistoryEntry {
            mv,
            from: None,
            last_moved: self.last_moved,
            last_carried: self.last_carried,
        };

        match mv {
            Move::Place { piece, at } => {
                self.board.place(piece, at);
                // Placement locks nothing; a just-placed piece may be
                // carried on the very next half-move
                self.last_moved = None;
                self.last_carried = None;
            }
            Move::Slide { piece, to } => {
                entry.from = self.board.position_of(piece);
                self.board.move_piece(piece, to);
                self.last_moved = Some(piece);
                self.last_carried = None;
            }
            Move::Carry { target, to, .. } => {
                entry.from = self.board.position_of(target);
                self.board.move_piece(target, to);
                // The carried piece, not the acting one, is locked next turn
                self.last_carried = Some(target);
                self.last_moved = None;
            }
            Move::Pass => {
                self.last_moved = None;
                self.last_carried = None;
            }
        }

        self.history.push(entry);
        // A forced pass is not a turn the player got to use
        if mv != Move::Pass {
            self.turns_taken[self.current_player as usize] += 1;
        }
        self.move_number += 1;
        self.current_player = self.current_player.opponent();
        self.result = self.compute_result();
    }

    /// Reverse exactly one applied half-move, auto-passes included.
    /// Undoing with an empty history is a contract violation.
    pub fn undo(&mut self) {
        let entry = self
            .history
            .pop()
            .expect("undo requires at least one applied half-move");

        self.current_player = self.current_player.opponent();
        self.move_number -= 1;
        if entry.mv != Move::Pass {
            self.turns_taken[self.current_player as usize] -= 1;
        }

        match entry.mv {
            Move::Place { piece, .. } => self.board.unplace(piece),
            Move::Slide { piece, .. } | Move::Carry { target: piece, .. } => {
                let from = entry.from.expect("movement history entries record an origin");
                self.board.move_piece(piece, from);
            }
            Move::Pass => {}
        }

        self.last_moved = entry.last_moved;
        self.last_carried = entry.last_carried;
        self.result = self.compute_result();
    }

    // ========================================================================
    // RESULT
    // ========================================================================

    /// A Queen with all 6 neighbors occupied loses for its owner; both at
    /// once is a draw.
    fn compute_result(&self) -> GameResult {
        let white_queen = Piece::new(Bug::Queen, Player::White, 1);
        let black_queen = Piece::new(Bug::Queen, Player::Black, 1);
        match (
            self.board.is_surrounded(white_queen),
            self.board.is_surrounded(black_queen),
        ) {
            (true, true) => GameResult::Draw,
            (true, false) => GameResult::Win(Player::Black),
            (false, true) => GameResult::Win(Player::White),
            (false, false) => GameResult::Ongoing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(bug: Bug) -> Piece {
        Piece::new(bug, Player::White, 1)
    }

    fn black(bug: Bug) -> Piece {
        Piece::new(bug, Player::Black, 1)
    }

    #[test]
    fn test_opening_moves_all_at_origin() {
        let state = GameState::default();
        let moves = state.legal_moves();
        assert_eq!(moves.len(), 11);
        for mv in &moves {
            assert!(matches!(mv, Move::Place { at, .. } if *at == ORIGIN));
        }
    }

    #[test]
    fn test_no_first_move_queen_option() {
        let state = GameState::new(Options {
            no_first_move_queen: true,
            ..Options::default()
        });
        let moves = state.legal_moves();
        assert_eq!(moves.len(), 10);
        assert!(moves
            .iter()
            .all(|mv| mv.moved_piece().unwrap().bug != Bug::Queen));
    }

    #[test]
    fn test_second_placement_may_touch_opponent() {
        let mut state = GameState::default();
        state
            .apply(Move::Place { piece: white(Bug::Spider), at: ORIGIN })
            .unwrap();
        let moves = state.legal_moves();
        // Every placement is adjacent to the lone white spider
        assert!(moves
            .iter()
            .all(|mv| mv.destination().unwrap().distance_to(ORIGIN) == 1));
        assert_eq!(moves.len(), 11 * 6);
    }

    #[test]
    fn test_later_placements_touch_own_side_only() {
        let mut state = GameState::default();
        state
            .apply(Move::Place { piece: white(Bug::Spider), at: ORIGIN })
            .unwrap();
        state
            .apply(Move::Place { piece: black(Bug::Queen), at: Hex::new(0, 1, -1) })
            .unwrap();

        for at in state.placement_candidates(Player::White) {
            assert!(at.adjacent().contains(&ORIGIN));
            assert!(!at.adjacent().contains(&Hex::new(0, 1, -1)));
        }
    }

    #[test]
    fn test_queen_forced_by_fourth_turn() {
        let mut state = GameState::default();
        let moves = [
            Move::Place { piece: white(Bug::Spider), at: ORIGIN },
            Move::Place { piece: black(Bug::Queen), at: Hex::new(0, 1, -1) },
            Move::Place { piece: Piece::new(Bug::Spider, Player::White, 2), at: Hex::new(0, -1, 1) },
            Move::Place { piece: black(Bug::Ant), at: Hex::new(0, 2, -2) },
            Move::Place { piece: white(Bug::Beetle), at: Hex::new(0, -2, 2) },
            Move::Place { piece: Piece::new(Bug::Ant, Player::Black, 2), at: Hex::new(0, 3, -3) },
        ];
        for mv in moves {
            state.apply(mv).unwrap();
        }

        // White's 4th turn: only queen placements remain
        let forced = state.legal_moves();
        assert!(!forced.is_empty());
        for mv in &forced {
            assert!(matches!(mv, Move::Place { piece, .. } if *piece == white(Bug::Queen)));
        }
    }

    #[test]
    fn test_illegal_move_rejected_without_effect() {
        let mut state = GameState::default();
        let before = state.clone();

        let err = state.apply(Move::Place {
            piece: white(Bug::Queen),
            at: Hex::new(3, -3, 0),
        });
        assert_eq!(err, Err(MoveError::Illegal));
        assert_eq!(state, before);

        // Pass is never accepted from a caller
        assert_eq!(state.apply(Move::Pass), Err(MoveError::Illegal));
        assert_eq!(state, before);
    }

    #[test]
    fn test_apply_undo_round_trip() {
        let mut state = GameState::default();
        state
            .apply(Move::Place { piece: white(Bug::Queen), at: ORIGIN })
            .unwrap();
        state
            .apply(Move::Place { piece: black(Bug::Queen), at: Hex::new(0, 1, -1) })
            .unwrap();

        let before = state.clone();
        let mv = Move::Slide { piece: white(Bug::Queen), to: Hex::new(1, 0, -1) };
        assert!(state.legal_moves().contains(&mv));
        state.apply(mv).unwrap();
        assert_ne!(state, before);
        state.undo();
        assert_eq!(state, before);
    }

    #[test]
    #[should_panic(expected = "at least one applied half-move")]
    fn test_undo_empty_history_panics() {
        let mut state = GameState::default();
        state.undo();
    }

    #[test]
    fn test_moved_piece_locked_for_one_turn() {
        let mut state = GameState::default();
        state
            .apply(Move::Place { piece: white(Bug::Queen), at: ORIGIN })
            .unwrap();
        state
            .apply(Move::Place { piece: black(Bug::Queen), at: Hex::new(0, 1, -1) })
            .unwrap();
        state
            .apply(Move::Slide { piece: white(Bug::Queen), to: Hex::new(1, 0, -1) })
            .unwrap();
        state
            .apply(Move::Slide { piece: black(Bug::Queen), to: Hex::new(1, 1, -2) })
            .unwrap();

        // The black queen moved last half-turn and may not move again now,
        // but the white queen is free again
        assert_eq!(state.last_moved(), Some(black(Bug::Queen)));
        let moves = state.legal_moves();
        assert!(moves
            .iter()
            .any(|mv| matches!(mv, Move::Slide { piece, .. } if *piece == white(Bug::Queen))));
    }

    #[test]
    fn test_just_placed_piece_may_be_carried() {
        let mut state = GameState::new(Options { pill_bug: true, ..Options::default() });
        state
            .apply(Move::Place { piece: white(Bug::PillBug), at: ORIGIN })
            .unwrap();
        state
            .apply(Move::Place { piece: black(Bug::Queen), at: Hex::new(0, 1, -1) })
            .unwrap();

        // Placement sets no movement lock
        assert_eq!(state.last_moved(), None);
        assert_eq!(state.last_carried(), None);

        // So the pill bug may carry the queen black just placed
        let carry = Move::Carry {
            acting: white(Bug::PillBug),
            target: black(Bug::Queen),
            to: Hex::new(1, 0, -1),
        };
        assert!(state.legal_moves().contains(&carry));
    }

    #[test]
    fn test_passes_do_not_advance_queen_deadline() {
        let mut state = GameState::default();
        state.set_move_validation(false);
        state
            .apply(Move::Place { piece: white(Bug::Spider), at: ORIGIN })
            .unwrap();
        state
            .apply(Move::Place { piece: black(Bug::Queen), at: Hex::new(0, 1, -1) })
            .unwrap();
        state.apply(Move::Pass).unwrap();
        state
            .apply(Move::Place { piece: black(Bug::Ant), at: Hex::new(0, 2, -2) })
            .unwrap();
        state.apply(Move::Pass).unwrap();
        state
            .apply(Move::Place { piece: Piece::new(Bug::Ant, Player::Black, 2), at: Hex::new(0, 3, -3) })
            .unwrap();
        state.set_move_validation(true);

        // White has had three half-moves but used only one turn, so the
        // queen deadline is still two turns away
        assert_eq!(state.current_player(), Player::White);
        assert!(state
            .legal_moves()
            .iter()
            .any(|mv| matches!(mv, Move::Place { piece, .. } if piece.bug != Bug::Queen)));
    }

    fn carry_setup(options: Options) -> GameState {
        let mut state = GameState::new(options);
        let moves = [
            Move::Place { piece: white(Bug::Queen), at: ORIGIN },
            Move::Place { piece: black(Bug::Queen), at: Hex::new(0, 1, -1) },
            Move::Place { piece: white(Bug::PillBug), at: Hex::new(1, -1, 0) },
            Move::Place { piece: black(Bug::PillBug), at: Hex::new(1, 1, -2) },
            Move::Slide { piece: white(Bug::PillBug), to: Hex::new(1, 0, -1) },
            Move::Place { piece: black(Bug::Ant), at: Hex::new(-1, 2, -1) },
            Move::Carry {
                acting: white(Bug::PillBug),
                target: black(Bug::PillBug),
                to: Hex::new(1, -1, 0),
            },
        ];
        for mv in moves {
            state.apply(mv).unwrap();
        }
        state
    }

    #[test]
    fn test_carried_piece_is_locked_not_the_actor() {
        let state = carry_setup(Options { pill_bug: true, ..Options::default() });

        assert_eq!(state.last_carried(), Some(black(Bug::PillBug)));
        assert_eq!(state.last_moved(), None);

        // The carried black pill bug can neither move nor act this turn,
        // and nobody may carry it again
        for mv in state.moves_for(Player::Black) {
            assert!(!matches!(mv, Move::Slide { piece, .. } if piece == black(Bug::PillBug)));
            assert!(!matches!(mv, Move::Carry { acting, .. } if acting == black(Bug::PillBug)));
        }
        for mv in state.moves_for(Player::White) {
            assert!(!matches!(mv, Move::Carry { target, .. } if target == black(Bug::PillBug)));
        }
    }

    #[test]
    fn test_carry_back_requires_option() {
        let counter_carry = Move::Carry {
            acting: black(Bug::PillBug),
            target: white(Bug::PillBug),
            to: Hex::new(0, -1, 1),
        };

        let without = carry_setup(Options { pill_bug: true, ..Options::default() });
        assert!(!without.legal_moves().contains(&counter_carry));

        let with = carry_setup(Options {
            pill_bug: true,
            allow_special_ability_after_yoink: true,
            ..Options::default()
        });
        assert!(with.legal_moves().contains(&counter_carry));
    }

    #[test]
    fn test_shutout_auto_passes() {
        let mut state = GameState::default();
        state.set_move_validation(false);

        // White queen walled in on five sides; the sixth is gated shut
        state.apply(Move::Place { piece: white(Bug::Queen), at: ORIGIN }).unwrap();
        let ring = [
            Hex::new(0, 1, -1),
            Hex::new(1, 0, -1),
            Hex::new(1, -1, 0),
            Hex::new(-1, 0, 1),
            Hex::new(-1, 1, 0),
        ];
        let fillers = [
            black(Bug::Ant),
            Piece::new(Bug::Ant, Player::Black, 2),
            Piece::new(Bug::Ant, Player::Black, 3),
            black(Bug::Hopper),
            Piece::new(Bug::Hopper, Player::Black, 2),
        ];
        for (i, (&piece, &at)) in fillers.iter().zip(ring.iter()).enumerate() {
            state.apply(Move::Place { piece, at }).unwrap();
            if i < ring.len() - 1 {
                state.apply(Move::Pass).unwrap(); // dummy white turn
            }
        }
        state.set_move_validation(true);

        // White was shut out, so a pass was recorded and black moves again
        assert_eq!(state.history().last(), Some(Move::Pass));
        assert_eq!(state.current_player(), Player::Black);
        assert!(state.moves_for(Player::White).is_empty());
        assert!(!state.legal_moves().is_empty());

        let err = state.apply(Move::Slide {
            piece: white(Bug::Queen),
            to: Hex::new(0, -1, 1),
        });
        assert_eq!(err, Err(MoveError::Illegal));
    }

    #[test]
    fn test_simultaneous_surround_is_a_draw() {
        let mut state = GameState::default();
        state.set_move_validation(false);

        state.apply(Move::Place { piece: white(Bug::Queen), at: ORIGIN }).unwrap();
        state.apply(Move::Place { piece: black(Bug::Queen), at: Hex::new(0, 1, -1) }).unwrap();

        // Fill every neighbor of both queens except one shared cell
        let fillers = [
            (white(Bug::Ant), Hex::new(1, -1, 0)),
            (black(Bug::Ant), Hex::new(0, -1, 1)),
            (Piece::new(Bug::Ant, Player::White, 2), Hex::new(-1, 0, 1)),
            (Piece::new(Bug::Ant, Player::Black, 2), Hex::new(-1, 1, 0)),
            (white(Bug::Hopper), Hex::new(0, 2, -2)),
            (black(Bug::Hopper), Hex::new(1, 1, -2)),
            (white(Bug::Spider), Hex::new(-1, 2, -1)),
        ];
        for (piece, at) in fillers {
            state.apply(Move::Place { piece, at }).unwrap();
        }
        assert_eq!(state.result(), GameResult::Ongoing);

        // The last shared cell surrounds both queens at once
        state
            .apply(Move::Place { piece: black(Bug::Spider), at: Hex::new(1, 0, -1) })
            .unwrap();
        assert_eq!(state.result(), GameResult::Draw);
        assert!(state.is_over());
        assert!(state.legal_moves().is_empty());

        state.set_move_validation(true);
        let err = state.apply(Move::Slide {
            piece: white(Bug::Ant),
            to: Hex::new(2, -1, -1),
        });
        assert_eq!(err, Err(MoveError::GameOver));
    }

    #[test]
    fn test_win_by_surround() {
        let mut state = GameState::default();
        state.set_move_validation(false);

        state.apply(Move::Place { piece: white(Bug::Queen), at: ORIGIN }).unwrap();
        let ring = [
            Hex::new(0, 1, -1),
            Hex::new(1, 0, -1),
            Hex::new(1, -1, 0),
            Hex::new(0, -1, 1),
            Hex::new(-1, 0, 1),
            Hex::new(-1, 1, 0),
        ];
        let fillers = [
            black(Bug::Ant),
            Piece::new(Bug::Ant, Player::Black, 2),
            Piece::new(Bug::Ant, Player::Black, 3),
            black(Bug::Hopper),
            Piece::new(Bug::Hopper, Player::Black, 2),
            Piece::new(Bug::Hopper, Player::Black, 3),
        ];
        for (&piece, &at) in fillers.iter().zip(ring.iter()) {
            assert_eq!(state.result(), GameResult::Ongoing);
            state.apply(Move::Place { piece, at }).unwrap();
        }

        assert_eq!(state.result(), GameResult::Win(Player::Black));
    }
}
