//! Shared chess vocabulary used by the session and the relay.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Side color. Serialized as the single-letter form used on the wire (`"w"` / `"b"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "w")]
    White,
    #[serde(rename = "b")]
    Black,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Long lowercase name (`"white"` / `"black"`).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::White => 0,
            Self::Black => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<shakmaty::Color> for Color {
    fn from(color: shakmaty::Color) -> Self {
        match color {
            shakmaty::Color::White => Self::White,
            shakmaty::Color::Black => Self::Black,
        }
    }
}

impl From<Color> for shakmaty::Color {
    fn from(color: Color) -> Self {
        match color {
            Color::White => shakmaty::Color::White,
            Color::Black => shakmaty::Color::Black,
        }
    }
}

/// Piece type, independent of color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Number of pieces of this kind each side starts with.
    #[must_use]
    pub fn starting_count(self) -> u8 {
        match self {
            Self::Pawn => 8,
            Self::Knight | Self::Bishop | Self::Rook => 2,
            Self::Queen | Self::King => 1,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Pawn => 0,
            Self::Knight => 1,
            Self::Bishop => 2,
            Self::Rook => 3,
            Self::Queen => 4,
            Self::King => 5,
        }
    }
}

impl From<PieceKind> for shakmaty::Role {
    fn from(kind: PieceKind) -> Self {
        match kind {
            PieceKind::Pawn => shakmaty::Role::Pawn,
            PieceKind::Knight => shakmaty::Role::Knight,
            PieceKind::Bishop => shakmaty::Role::Bishop,
            PieceKind::Rook => shakmaty::Role::Rook,
            PieceKind::Queen => shakmaty::Role::Queen,
            PieceKind::King => shakmaty::Role::King,
        }
    }
}

/// A move as submitted by a client.
///
/// Either explicit coordinates (`{"from": "e2", "to": "e4", "promotion": "q"}`) or a
/// bare SAN string (`"e4"`). Squares and promotion letters are validated by the rules
/// engine, not here, so a well-shaped request can still be malformed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MoveRequest {
    Coordinates {
        from: String,
        to: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        promotion: Option<String>,
    },
    San(String),
}

impl MoveRequest {
    pub fn coordinates(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Coordinates {
            from: from.into(),
            to: to.into(),
            promotion: None,
        }
    }

    pub fn promoting(
        from: impl Into<String>,
        to: impl Into<String>,
        promotion: impl Into<String>,
    ) -> Self {
        Self::Coordinates {
            from: from.into(),
            to: to.into(),
            promotion: Some(promotion.into()),
        }
    }

    pub fn san(san: impl Into<String>) -> Self {
        Self::San(san.into())
    }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coordinates {
                from,
                to,
                promotion: Some(promotion),
            } => write!(f, "{from}{to}={promotion}"),
            Self::Coordinates { from, to, .. } => write!(f, "{from}{to}"),
            Self::San(san) => f.write_str(san),
        }
    }
}
