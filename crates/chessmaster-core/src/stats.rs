//! Per-game statistics broadcast alongside every position update.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::census::CaptureCounts;

/// Move and capture tally for the current game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub moves: u32,
    pub white_captures: u32,
    pub black_captures: u32,
    /// Milliseconds since the Unix epoch.
    pub start_time: u64,
}

impl GameStats {
    pub fn new(start_time: u64) -> Self {
        Self {
            moves: 0,
            white_captures: 0,
            black_captures: 0,
            start_time,
        }
    }

    /// Count one applied move and replace the capture tally.
    pub fn record_move(&mut self, captures: CaptureCounts) {
        self.moves += 1;
        self.white_captures = captures.white;
        self.black_captures = captures.black;
    }

    /// Zero everything and start a new clock no earlier than the previous one.
    pub fn restart(&mut self, now: u64) {
        *self = Self::new(now.max(self.start_time));
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_move_counts_and_replaces_captures() {
        let mut stats = GameStats::new(1_000);
        stats.record_move(CaptureCounts { white: 1, black: 0 });
        stats.record_move(CaptureCounts { white: 1, black: 1 });

        assert_eq!(stats.moves, 2);
        assert_eq!(stats.white_captures, 1);
        assert_eq!(stats.black_captures, 1);
        assert_eq!(stats.start_time, 1_000);
    }

    #[test]
    fn restart_never_moves_the_clock_backwards() {
        let mut stats = GameStats::new(5_000);
        stats.record_move(CaptureCounts { white: 2, black: 3 });

        stats.restart(4_000);
        assert_eq!(stats, GameStats::new(5_000));

        stats.restart(6_000);
        assert_eq!(stats.start_time, 6_000);
    }

    #[test]
    fn wire_field_names() {
        let json = serde_json::to_value(GameStats::new(42)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "moves": 0,
                "whiteCaptures": 0,
                "blackCaptures": 0,
                "startTime": 42
            })
        );
    }
}
