//! Piece census and capture-count derivation.
//!
//! Captures are not tracked move by move. After every applied move the board is counted
//! and compared to the standard starting census; whatever an opponent is missing is
//! credited as captures. A promoted piece offsets the pawn it replaced, so promotions
//! make the tally undercount.

use serde::{Deserialize, Serialize};

use crate::types::{Color, PieceKind};

/// Count of pieces on the board per color and kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PieceCensus {
    counts: [[u8; 6]; 2],
}

impl PieceCensus {
    /// The census of the standard initial position.
    #[must_use]
    pub fn starting() -> Self {
        let mut census = Self::default();
        for color in Color::ALL {
            for kind in PieceKind::ALL {
                census.set(color, kind, kind.starting_count());
            }
        }
        census
    }

    #[must_use]
    pub fn count(&self, color: Color, kind: PieceKind) -> u8 {
        self.counts[color.index()][kind.index()]
    }

    pub fn set(&mut self, color: Color, kind: PieceKind, count: u8) {
        self.counts[color.index()][kind.index()] = count;
    }

    /// Signed shortfall of `color`'s non-king pieces against the starting census.
    fn deficit(&self, color: Color) -> i32 {
        PieceKind::ALL
            .iter()
            .filter(|kind| **kind != PieceKind::King)
            .map(|&kind| i32::from(kind.starting_count()) - i32::from(self.count(color, kind)))
            .sum()
    }

    /// Derive capture counts from this census.
    #[must_use]
    pub fn captures(&self) -> CaptureCounts {
        // Each extra promoted piece consumed a pawn, so the signed sum never drops below zero
        // for a reachable position. Clamp anyway for hand-built boards.
        let clamp = |deficit: i32| u32::try_from(deficit).unwrap_or(0);
        CaptureCounts {
            white: clamp(self.deficit(Color::Black)),
            black: clamp(self.deficit(Color::White)),
        }
    }
}

/// Pieces captured by each side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureCounts {
    /// Black pieces missing from the board.
    pub white: u32,
    /// White pieces missing from the board.
    pub black: u32,
}
