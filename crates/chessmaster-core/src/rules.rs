//! Rules engine seam and its shakmaty-backed implementation.
//!
//! The relay never reasons about chess itself. Everything it needs (legality, applying a
//! move, the FEN snapshot, terminal classification and a piece census) goes through
//! [`RulesEngine`].

use shakmaty::{
    fen::Fen,
    san::{San, SanPlus},
    uci::UciMove,
    CastlingMode, Chess, EnPassantMode, Move, Piece, Position, Role, Square,
};
use thiserror::Error;

use crate::census::PieceCensus;
use crate::types::{Color, MoveRequest, PieceKind};

/// FEN of the standard initial position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Halfmove clock value at which the fifty-move rule ends the game.
const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// Reasons the rules engine refuses a move or a position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("invalid square: {0:?}")]
    InvalidSquare(String),

    #[error("invalid promotion piece: {0:?}")]
    InvalidPromotion(String),

    #[error("invalid SAN: {0:?}")]
    InvalidSan(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("invalid FEN: {0}")]
    InvalidFen(String),
}

/// Why a drawn game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawReason {
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
}

/// Terminal classification of the current position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminalState {
    None,
    Checkmate { winner: Color },
    Stalemate,
    Draw(DrawReason),
}

impl TerminalState {
    #[must_use]
    pub fn is_over(self) -> bool {
        self != Self::None
    }
}

/// A move the engine accepted and applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedMove {
    /// Standard algebraic notation, computed before the move was played.
    pub san: String,
    pub capture: bool,
}

/// Chess rules collaborator.
pub trait RulesEngine {
    /// FEN of the current position.
    fn position(&self) -> String;

    /// Side to move.
    fn turn(&self) -> Color;

    /// Validate and apply `request`. On error the position is unchanged.
    fn apply(&mut self, request: &MoveRequest) -> Result<AppliedMove, RulesError>;

    fn terminal_state(&self) -> TerminalState;

    fn census(&self) -> PieceCensus;

    /// Return to the standard initial position.
    fn reset(&mut self);
}

/// [`RulesEngine`] backed by `shakmaty`.
#[derive(Debug, Clone)]
pub struct ShakmatyEngine {
    position: Chess,
    /// Repetition keys of every position reached in this game, current one last.
    history: Vec<String>,
}

impl ShakmatyEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::with_position(Chess::default())
    }

    /// Start from an arbitrary position.
    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        let fen: Fen = fen
            .parse()
            .map_err(|e| RulesError::InvalidFen(format!("{e}")))?;
        let position: Chess = fen
            .into_position(CastlingMode::Standard)
            .map_err(|e| RulesError::InvalidFen(format!("{e}")))?;
        Ok(Self::with_position(position))
    }

    fn with_position(position: Chess) -> Self {
        let history = vec![repetition_key(&position)];
        Self { position, history }
    }

    /// Resolve a request to one of the current legal moves.
    fn resolve(&self, request: &MoveRequest) -> Result<Move, RulesError> {
        match request {
            MoveRequest::Coordinates {
                from,
                to,
                promotion,
            } => {
                let from_sq = parse_square(from)?;
                let to_sq = parse_square(to)?;
                let promotion = promotion.as_deref().map(parse_promotion).transpose()?;
                self.find_legal(from_sq, to_sq, promotion)
                    .ok_or_else(|| RulesError::IllegalMove(request.to_string()))
            }
            MoveRequest::San(text) => {
                let san: SanPlus = text
                    .parse()
                    .map_err(|_| RulesError::InvalidSan(text.clone()))?;
                san.san
                    .to_move(&self.position)
                    .map_err(|_| RulesError::IllegalMove(text.clone()))
            }
        }
    }

    /// Match a from/to pair against the legal moves. Castling is given as the king's
    /// two-square move. A promotion piece only matters for promoting moves, and those
    /// require one.
    fn find_legal(&self, from: Square, to: Square, promotion: Option<Role>) -> Option<Move> {
        self.position.legal_moves().into_iter().find(|m| {
            match UciMove::from_move(m, CastlingMode::Standard) {
                UciMove::Normal {
                    from: f,
                    to: t,
                    promotion: p,
                } => f == from && t == to && (p.is_none() || p == promotion),
                _ => false,
            }
        })
    }

    fn repetitions(&self) -> usize {
        let Some(current) = self.history.last() else {
            return 0;
        };
        self.history.iter().filter(|key| *key == current).count()
    }
}

impl Default for ShakmatyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesEngine for ShakmatyEngine {
    /// The en passant square is written after every double push, capturable or not.
    fn position(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Always).to_string()
    }

    fn turn(&self) -> Color {
        self.position.turn().into()
    }

    fn apply(&mut self, request: &MoveRequest) -> Result<AppliedMove, RulesError> {
        let m = self.resolve(request)?;
        let san = San::from_move(&self.position, &m).to_string();
        let capture = m.is_capture();

        self.position.play_unchecked(&m);
        self.history.push(repetition_key(&self.position));

        Ok(AppliedMove { san, capture })
    }

    fn terminal_state(&self) -> TerminalState {
        if self.position.is_checkmate() {
            // The side to move is mated.
            TerminalState::Checkmate {
                winner: Color::from(self.position.turn()).opposite(),
            }
        } else if self.position.is_stalemate() {
            TerminalState::Stalemate
        } else if self.position.is_insufficient_material() {
            TerminalState::Draw(DrawReason::InsufficientMaterial)
        } else if self.position.halfmoves() >= FIFTY_MOVE_HALFMOVES {
            TerminalState::Draw(DrawReason::FiftyMoveRule)
        } else if self.repetitions() >= 3 {
            TerminalState::Draw(DrawReason::ThreefoldRepetition)
        } else {
            TerminalState::None
        }
    }

    fn census(&self) -> PieceCensus {
        let board = self.position.board();
        let mut census = PieceCensus::default();
        for color in Color::ALL {
            for kind in PieceKind::ALL {
                let piece = Piece {
                    color: color.into(),
                    role: kind.into(),
                };
                let count = board.by_piece(piece).count();
                census.set(color, kind, u8::try_from(count).unwrap_or(u8::MAX));
            }
        }
        census
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

fn parse_square(text: &str) -> Result<Square, RulesError> {
    text.parse()
        .map_err(|_| RulesError::InvalidSquare(text.to_string()))
}

fn parse_promotion(text: &str) -> Result<Role, RulesError> {
    let mut chars = text.chars();
    let role = match (chars.next(), chars.next()) {
        (Some(c), None) => Role::from_char(c.to_ascii_lowercase()),
        _ => None,
    };
    match role {
        Some(role @ (Role::Queen | Role::Rook | Role::Bishop | Role::Knight)) => Ok(role),
        _ => Err(RulesError::InvalidPromotion(text.to_string())),
    }
}

/// Board, side to move, castling rights and en passant square: the FEN fields that
/// identify a position for repetition purposes. Only a capturable en passant square
/// distinguishes positions here.
fn repetition_key(position: &Chess) -> String {
    Fen::from_position(position.clone(), EnPassantMode::Legal)
        .to_string()
        .split(' ')
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}
