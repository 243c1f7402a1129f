//! Seat assignment for the two player roles.
//!
//! First connection takes white, second takes black, everyone else watches. A seat is
//! freed only when its holder disconnects and is then open to the next newcomer.

use std::fmt;

use chessmaster_core::Color;
use serde::{Deserialize, Serialize};

/// Opaque id of one live network session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a connection may do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Player(Color),
    Spectator,
}

/// Which seats are taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    pub white: bool,
    pub black: bool,
}

/// White and black seats.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    white: Option<ConnectionId>,
    black: Option<ConnectionId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seat `connection` in the first free slot, white before black.
    pub fn assign_role(&mut self, connection: ConnectionId) -> Role {
        if let Role::Player(color) = self.role_of(connection) {
            return Role::Player(color);
        }
        for color in Color::ALL {
            let slot = self.slot_mut(color);
            if slot.is_none() {
                *slot = Some(connection);
                return Role::Player(color);
            }
        }
        Role::Spectator
    }

    /// Free whatever seat `connection` holds. Returns the freed color, if any.
    pub fn release(&mut self, connection: ConnectionId) -> Option<Color> {
        let Role::Player(color) = self.role_of(connection) else {
            return None;
        };
        *self.slot_mut(color) = None;
        Some(color)
    }

    pub fn role_of(&self, connection: ConnectionId) -> Role {
        Color::ALL
            .into_iter()
            .find(|&color| self.holder(color) == Some(connection))
            .map_or(Role::Spectator, Role::Player)
    }

    /// Connection seated as `color`.
    pub fn holder(&self, color: Color) -> Option<ConnectionId> {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    pub fn occupancy(&self) -> Occupancy {
        Occupancy {
            white: self.white.is_some(),
            black: self.black.is_some(),
        }
    }

    fn slot_mut(&mut self, color: Color) -> &mut Option<ConnectionId> {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ConnectionId = ConnectionId(1);
    const B: ConnectionId = ConnectionId(2);
    const C: ConnectionId = ConnectionId(3);
    const D: ConnectionId = ConnectionId(4);

    #[test]
    fn first_come_first_served() {
        let mut registry = SessionRegistry::new();
        assert_eq!(registry.assign_role(A), Role::Player(Color::White));
        assert_eq!(registry.assign_role(B), Role::Player(Color::Black));
        assert_eq!(registry.assign_role(C), Role::Spectator);

        assert_eq!(registry.role_of(A), Role::Player(Color::White));
        assert_eq!(registry.role_of(C), Role::Spectator);
        assert_eq!(
            registry.occupancy(),
            Occupancy {
                white: true,
                black: true
            }
        );
    }

    #[test]
    fn released_seat_goes_to_next_newcomer() {
        let mut registry = SessionRegistry::new();
        registry.assign_role(A);
        registry.assign_role(B);
        registry.assign_role(C);

        assert_eq!(registry.release(A), Some(Color::White));
        assert_eq!(
            registry.occupancy(),
            Occupancy {
                white: false,
                black: true
            }
        );

        // The existing spectator is not promoted.
        assert_eq!(registry.role_of(C), Role::Spectator);
        assert_eq!(registry.assign_role(D), Role::Player(Color::White));
    }

    #[test]
    fn black_reopens_while_white_stays() {
        let mut registry = SessionRegistry::new();
        registry.assign_role(A);
        registry.assign_role(B);
        registry.release(B);
        assert_eq!(registry.assign_role(C), Role::Player(Color::Black));
        assert_eq!(registry.holder(Color::White), Some(A));
    }

    #[test]
    fn release_is_idempotent_and_ignores_spectators() {
        let mut registry = SessionRegistry::new();
        registry.assign_role(A);
        assert_eq!(registry.release(C), None);
        assert_eq!(registry.release(A), Some(Color::White));
        assert_eq!(registry.release(A), None);
        assert_eq!(registry.occupancy(), Occupancy::default());
    }

    #[test]
    fn a_connection_holds_at_most_one_seat() {
        let mut registry = SessionRegistry::new();
        registry.assign_role(A);
        assert_eq!(registry.assign_role(A), Role::Player(Color::White));
        assert_eq!(registry.holder(Color::Black), None);
    }

    #[test]
    fn seats_stay_unique_over_churn() {
        let mut registry = SessionRegistry::new();
        for id in 0..50u64 {
            registry.assign_role(ConnectionId(id));
            if id % 3 == 0 {
                registry.release(ConnectionId(id / 2));
            }
            let white = registry.holder(Color::White);
            let black = registry.holder(Color::Black);
            if let (Some(w), Some(b)) = (white, black) {
                assert_ne!(w, b);
            }
        }
    }
}
