//! Relay controller: the connection/role/turn state machine.
//!
//! Handlers mutate the registry and the game session, then return the messages to deliver.
//! They never touch the network, so a whole game can be driven from a unit test.

use serde_json::Value;
use tracing::{debug, info};

use chessmaster_core::{GameSession, MoveOutcome, MoveRequest, RulesEngine, ShakmatyEngine};

use crate::protocol::{ClientMessage, GameOver, PlayerUpdate, ServerMessage};
use crate::registry::{ConnectionId, Role, SessionRegistry};

/// Recipient of an outbound message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Connection(ConnectionId),
    All,
}

/// A message and where it goes.
#[derive(Clone, Debug, PartialEq)]
pub struct Outbound {
    pub target: Target,
    pub message: ServerMessage,
}

impl Outbound {
    pub fn to(connection: ConnectionId, message: ServerMessage) -> Self {
        Self {
            target: Target::Connection(connection),
            message,
        }
    }

    pub fn all(message: ServerMessage) -> Self {
        Self {
            target: Target::All,
            message,
        }
    }
}

/// Owns the seats and the game; turns inbound events into outbound messages.
#[derive(Debug)]
pub struct RelayController<E = ShakmatyEngine> {
    registry: SessionRegistry,
    game: GameSession<E>,
}

impl RelayController<ShakmatyEngine> {
    pub fn new() -> Self {
        Self::with_session(GameSession::new())
    }
}

impl Default for RelayController<ShakmatyEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RulesEngine> RelayController<E> {
    pub fn with_session(game: GameSession<E>) -> Self {
        Self {
            registry: SessionRegistry::new(),
            game,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn game(&self) -> &GameSession<E> {
        &self.game
    }

    /// Dispatch a decoded client message.
    pub fn handle_message(
        &mut self,
        connection: ConnectionId,
        message: ClientMessage,
    ) -> Vec<Outbound> {
        match message {
            ClientMessage::Move(payload) => self.on_move(connection, payload),
            ClientMessage::ResetGame => self.on_reset(connection),
        }
    }

    /// Seat the newcomer, tell it its role and the position, and announce occupancy.
    pub fn on_connect(&mut self, connection: ConnectionId) -> Vec<Outbound> {
        info!("New connection: {}", connection);

        let role_message = match self.registry.assign_role(connection) {
            Role::Player(color) => {
                info!("{} player assigned to {}", color, connection);
                ServerMessage::PlayerRole(color)
            }
            Role::Spectator => {
                info!("Spectator assigned to {}", connection);
                ServerMessage::SpectatorRole
            }
        };

        vec![
            Outbound::to(connection, role_message),
            Outbound::to(
                connection,
                ServerMessage::BoardState(self.game.current_position()),
            ),
            Outbound::all(self.player_update(true)),
        ]
    }

    /// Free the leaver's seat and announce occupancy. Statistics are not resent here.
    pub fn on_disconnect(&mut self, connection: ConnectionId) -> Vec<Outbound> {
        match self.registry.release(connection) {
            Some(color) => info!("{} player disconnected ({})", color, connection),
            None => info!("Connection {} closed", connection),
        }

        vec![Outbound::all(self.player_update(false))]
    }

    /// Authorize, validate and apply a move attempt.
    pub fn on_move(&mut self, connection: ConnectionId, payload: Value) -> Vec<Outbound> {
        let turn = self.game.turn();
        if self.registry.holder(turn) != Some(connection) {
            debug!("Rejected move from {}: not {}'s seat", connection, turn);
            return vec![Outbound::to(connection, ServerMessage::InvalidMove(payload))];
        }

        let request: MoveRequest = match serde_json::from_value(payload.clone()) {
            Ok(request) => request,
            Err(e) => {
                debug!("Malformed move from {}: {}", connection, e);
                return vec![Outbound::to(connection, ServerMessage::InvalidMove(payload))];
            }
        };

        match self.game.apply_move(&request) {
            MoveOutcome::Applied { position, san, .. } => {
                info!("{} played {}", turn, san);
                let mut out = vec![
                    Outbound::all(ServerMessage::Move(payload)),
                    Outbound::all(ServerMessage::BoardState(position)),
                    Outbound::all(ServerMessage::GameStats(self.game.stats())),
                ];
                if let Some(game_over) = GameOver::from_terminal(self.game.terminal_state()) {
                    info!("Game over: {:?}", game_over);
                    out.push(Outbound::all(ServerMessage::GameOver(game_over)));
                }
                out
            }
            MoveOutcome::Rejected(err) => {
                debug!("Invalid move from {}: {}", connection, err);
                vec![Outbound::to(connection, ServerMessage::InvalidMove(payload))]
            }
        }
    }

    /// Restart the game. Any connection may ask, spectators included.
    pub fn on_reset(&mut self, connection: ConnectionId) -> Vec<Outbound> {
        self.game.reset();
        info!("Game reset by {}", connection);

        vec![
            Outbound::all(ServerMessage::BoardState(self.game.current_position())),
            Outbound::all(ServerMessage::GameReset),
            Outbound::all(ServerMessage::GameStats(self.game.stats())),
        ]
    }

    fn player_update(&self, with_stats: bool) -> ServerMessage {
        let occupancy = self.registry.occupancy();
        ServerMessage::PlayerUpdate(PlayerUpdate {
            white: occupancy.white,
            black: occupancy.black,
            game_stats: with_stats.then(|| self.game.stats()),
        })
    }
}
