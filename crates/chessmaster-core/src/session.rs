//! The single authoritative game record.
//!
//! `GameSession` pairs a [`RulesEngine`] with the statistics the relay broadcasts. It owns
//! no connections and performs no I/O; the relay controller drives it.

use crate::rules::{RulesEngine, RulesError, ShakmatyEngine, TerminalState};
use crate::stats::{unix_millis, GameStats};
use crate::types::{Color, MoveRequest};

/// Result of submitting a move to the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move was legal and has been applied.
    Applied {
        /// FEN after the move.
        position: String,
        capture: bool,
        san: String,
    },
    /// The rules engine refused the move; nothing changed.
    Rejected(RulesError),
}

/// Current position plus statistics for one game.
#[derive(Debug)]
pub struct GameSession<E = ShakmatyEngine> {
    engine: E,
    stats: GameStats,
}

impl GameSession<ShakmatyEngine> {
    /// A fresh game from the standard initial position.
    pub fn new() -> Self {
        Self::with_engine(ShakmatyEngine::new())
    }
}

impl Default for GameSession<ShakmatyEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RulesEngine> GameSession<E> {
    /// Wrap an engine in whatever position it currently holds.
    pub fn with_engine(engine: E) -> Self {
        Self {
            engine,
            stats: GameStats::new(unix_millis()),
        }
    }

    pub fn current_position(&self) -> String {
        self.engine.position()
    }

    pub fn turn(&self) -> Color {
        self.engine.turn()
    }

    pub fn stats(&self) -> GameStats {
        self.stats
    }

    /// Validate and apply a move, refreshing statistics on success.
    pub fn apply_move(&mut self, request: &MoveRequest) -> MoveOutcome {
        match self.engine.apply(request) {
            Ok(applied) => {
                self.stats.record_move(self.engine.census().captures());
                MoveOutcome::Applied {
                    position: self.engine.position(),
                    capture: applied.capture,
                    san: applied.san,
                }
            }
            Err(err) => MoveOutcome::Rejected(err),
        }
    }

    /// Back to the initial position with zeroed statistics and a fresh start time.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.stats.restart(unix_millis());
    }

    pub fn terminal_state(&self) -> TerminalState {
        self.engine.terminal_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::STARTING_FEN;

    fn mv(from: &str, to: &str) -> MoveRequest {
        MoveRequest::coordinates(from, to)
    }

    #[test]
    fn applied_move_increments_counter() {
        let mut session = GameSession::new();
        let outcome = session.apply_move(&mv("e2", "e4"));

        assert!(matches!(
            outcome,
            MoveOutcome::Applied { capture: false, .. }
        ));
        let stats = session.stats();
        assert_eq!(stats.moves, 1);
        assert_eq!(stats.white_captures, 0);
        assert_eq!(stats.black_captures, 0);
        assert_eq!(session.turn(), Color::Black);
    }

    #[test]
    fn rejected_move_changes_nothing() {
        let mut session = GameSession::new();
        let before = session.stats();

        let outcome = session.apply_move(&mv("e2", "e5"));
        assert!(matches!(
            outcome,
            MoveOutcome::Rejected(RulesError::IllegalMove(_))
        ));
        assert_eq!(session.stats(), before);
        assert_eq!(session.current_position(), STARTING_FEN);
    }

    #[test]
    fn captures_match_removed_pieces() {
        let mut session = GameSession::new();
        // 1. e4 d5 2. exd5 Qxd5 3. Nc3 Qxa2 4. Rxa2
        for (from, to) in [
            ("e2", "e4"),
            ("d7", "d5"),
            ("e4", "d5"),
            ("d8", "d5"),
            ("b1", "c3"),
            ("d5", "a2"),
            ("a1", "a2"),
        ] {
            assert!(matches!(
                session.apply_move(&mv(from, to)),
                MoveOutcome::Applied { .. }
            ));
        }

        let stats = session.stats();
        assert_eq!(stats.moves, 7);
        // White took a pawn and the queen; black took two pawns.
        assert_eq!(stats.white_captures, 2);
        assert_eq!(stats.black_captures, 2);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut session = GameSession::new();
        let started = session.stats().start_time;
        session.apply_move(&mv("e2", "e4"));
        session.apply_move(&mv("d7", "d5"));
        session.apply_move(&mv("e4", "d5"));

        session.reset();

        assert_eq!(session.current_position(), STARTING_FEN);
        let stats = session.stats();
        assert_eq!(stats.moves, 0);
        assert_eq!(stats.white_captures, 0);
        assert_eq!(stats.black_captures, 0);
        assert!(stats.start_time >= started);
    }

    #[test]
    fn checkmate_is_reported_after_the_mating_move() {
        let mut session = GameSession::new();
        for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4")] {
            session.apply_move(&mv(from, to));
            assert_eq!(session.terminal_state(), TerminalState::None);
        }
        session.apply_move(&mv("d8", "h4"));
        assert_eq!(
            session.terminal_state(),
            TerminalState::Checkmate {
                winner: Color::Black
            }
        );
    }
}
