//! Wire messages exchanged over the WebSocket.
//!
//! Every frame is one JSON text message of the form `{"event": "<name>", "data": <payload>}`.
//! Events without a payload omit `data`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use chessmaster_core::{Color, DrawReason, GameStats, TerminalState};

/// Client-to-server messages
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Move attempt. Kept as raw JSON so a rejection can echo exactly what was sent.
    Move(Value),
    /// Restart the game from the initial position
    ResetGame,
}

/// Server-to-client messages
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Seat granted to the receiving connection
    PlayerRole(Color),
    /// Both seats were taken; the receiver watches
    SpectatorRole,
    /// The receiver's move was refused; carries the submitted payload
    InvalidMove(Value),
    /// Current position as FEN
    BoardState(String),
    /// Seat occupancy changed
    PlayerUpdate(PlayerUpdate),
    /// A move was applied; carries the payload exactly as the mover sent it
    Move(Value),
    /// Statistics after a move or reset
    GameStats(GameStats),
    /// The last move ended the game
    GameOver(GameOver),
    /// The game was restarted
    GameReset,
}

/// Seat occupancy, with statistics on connect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdate {
    pub white: bool,
    pub black: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_stats: Option<GameStats>,
}

/// Why the game ended. Stalemate is reported as `Draw`; `Stalemate` and the generic
/// `gameOver` reason are part of the wire vocabulary but never sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOverReason {
    Checkmate,
    Draw,
    Stalemate,
    #[serde(rename = "gameOver")]
    GameOver,
}

/// Winning side, spelled out (`"white"` / `"black"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    White,
    Black,
}

impl From<Color> for Winner {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Self::White,
            Color::Black => Self::Black,
        }
    }
}

/// Game over payload
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    pub reason: GameOverReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Winner>,
}

impl GameOver {
    /// Payload for a terminal position, `None` while play continues.
    pub fn from_terminal(state: TerminalState) -> Option<Self> {
        let (reason, winner) = match state {
            TerminalState::None => return None,
            TerminalState::Checkmate { winner } => {
                (GameOverReason::Checkmate, Some(winner.into()))
            }
            TerminalState::Stalemate
            | TerminalState::Draw(
                DrawReason::InsufficientMaterial
                | DrawReason::FiftyMoveRule
                | DrawReason::ThreefoldRepetition,
            ) => (GameOverReason::Draw, None),
        };
        Some(Self { reason, winner })
    }
}

/// Protocol errors
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialize a client message for network transmission
pub fn encode_client_message(msg: &ClientMessage) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(msg)?)
}

/// Deserialize a client message from a text frame
pub fn decode_client_message(text: &str) -> Result<ClientMessage, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

/// Serialize a server message for network transmission
pub fn encode_server_message(msg: &ServerMessage) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(msg)?)
}

/// Deserialize a server message from a text frame
pub fn decode_server_message(text: &str) -> Result<ServerMessage, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chessmaster_core::MoveRequest;
    use serde_json::json;

    fn wire(msg: &ServerMessage) -> Value {
        serde_json::from_str(&encode_server_message(msg).unwrap()).unwrap()
    }

    #[test]
    fn client_move_keeps_raw_payload() {
        let msg = decode_client_message(r#"{"event":"move","data":{"from":"e2","to":"e4"}}"#)
            .unwrap();
        assert_eq!(msg, ClientMessage::Move(json!({"from": "e2", "to": "e4"})));

        let msg = decode_client_message(r#"{"event":"move","data":[1,2,3]}"#).unwrap();
        assert_eq!(msg, ClientMessage::Move(json!([1, 2, 3])));
    }

    #[test]
    fn client_reset_has_no_payload() {
        let msg = decode_client_message(r#"{"event":"resetGame"}"#).unwrap();
        assert_eq!(msg, ClientMessage::ResetGame);
        assert_eq!(
            encode_client_message(&ClientMessage::ResetGame).unwrap(),
            r#"{"event":"resetGame"}"#
        );
    }

    #[test]
    fn unknown_events_are_errors() {
        assert!(decode_client_message(r#"{"event":"chat","data":"hi"}"#).is_err());
        assert!(decode_client_message("not json").is_err());
    }

    #[test]
    fn role_events() {
        assert_eq!(
            wire(&ServerMessage::PlayerRole(Color::White)),
            json!({"event": "playerRole", "data": "w"})
        );
        assert_eq!(
            wire(&ServerMessage::SpectatorRole),
            json!({"event": "spectatorRole"})
        );
    }

    #[test]
    fn player_update_stats_are_optional() {
        let without = ServerMessage::PlayerUpdate(PlayerUpdate {
            white: true,
            black: false,
            game_stats: None,
        });
        assert_eq!(
            wire(&without),
            json!({"event": "playerUpdate", "data": {"white": true, "black": false}})
        );

        let with = ServerMessage::PlayerUpdate(PlayerUpdate {
            white: true,
            black: true,
            game_stats: Some(GameStats::new(7)),
        });
        assert_eq!(
            wire(&with)["data"]["gameStats"],
            json!({"moves": 0, "whiteCaptures": 0, "blackCaptures": 0, "startTime": 7})
        );
    }

    #[test]
    fn game_over_payloads() {
        let mate = GameOver::from_terminal(TerminalState::Checkmate {
            winner: Color::Black,
        })
        .unwrap();
        assert_eq!(
            wire(&ServerMessage::GameOver(mate)),
            json!({"event": "gameOver", "data": {"reason": "checkmate", "winner": "black"}})
        );

        // Stalemate goes out as a plain draw.
        let stalemate = GameOver::from_terminal(TerminalState::Stalemate).unwrap();
        assert_eq!(
            wire(&ServerMessage::GameOver(stalemate))["data"],
            json!({"reason": "draw"})
        );

        let draw =
            GameOver::from_terminal(TerminalState::Draw(DrawReason::ThreefoldRepetition)).unwrap();
        assert_eq!(draw.reason, GameOverReason::Draw);
        assert!(GameOver::from_terminal(TerminalState::None).is_none());
    }

    #[test]
    fn server_messages_decode() {
        let request = MoveRequest::promoting("a7", "a8", "q");
        let msg = ServerMessage::Move(serde_json::to_value(&request).unwrap());
        let text = encode_server_message(&msg).unwrap();
        assert_eq!(
            text,
            r#"{"event":"move","data":{"from":"a7","to":"a8","promotion":"q"}}"#
        );
        assert_eq!(decode_server_message(&text).unwrap(), msg);

        let generic: GameOver = serde_json::from_value(json!({"reason": "gameOver"})).unwrap();
        assert_eq!(generic.reason, GameOverReason::GameOver);

        let reset = decode_server_message(r#"{"event":"gameReset"}"#).unwrap();
        assert_eq!(reset, ServerMessage::GameReset);
    }
}
