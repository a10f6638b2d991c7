//! Hive rules engine
//!
//! This crate provides the core game logic for Hive:
//! - Hex grid geometry (cube coordinates)
//! - Piece identity and per-player rosters
//! - Board placement data with stacking
//! - The one-hive connectivity rule and the freedom-of-movement gate
//! - Per-class move generation, including the Pill Bug carry ability
//! - Turn sequencing with apply/undo, auto-pass, and win/draw detection
//!
//! The engine enumerates legal moves and applies single moves; search,
//! notation, and persistence are left to callers built on this surface.

pub mod board;
pub mod game;
pub mod hex;
pub mod moves;
pub mod options;
pub mod pieces;

// Re-exports for convenient access
pub use board::Board;
pub use game::{GameResult, GameState, MoveError};
pub use hex::{Hex, DIRECTIONS, ORIGIN};
pub use moves::Move;
pub use options::Options;
pub use pieces::{roster, Bug, Piece, Player};
