//! ChessMaster core
//!
//! Game session state for a single two-player chess game. Chess rules are delegated to a
//! [`RulesEngine`]; this crate adds move/capture statistics on top.

mod census;
mod rules;
mod session;
mod stats;
mod types;

pub use crate::census::{CaptureCounts, PieceCensus};
pub use crate::rules::{
    AppliedMove, DrawReason, RulesEngine, RulesError, ShakmatyEngine, TerminalState,
    STARTING_FEN,
};
pub use crate::session::{GameSession, MoveOutcome};
pub use crate::stats::{unix_millis, GameStats};
pub use crate::types::{Color, MoveRequest, PieceKind};
