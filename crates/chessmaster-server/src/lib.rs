//! ChessMaster relay server
//!
//! Authoritative two-player chess relay over WebSockets.
//! First two connections play white and black; everyone else spectates.

pub mod config;
pub mod hub;
pub mod protocol;
pub mod registry;
pub mod relay;
pub mod transport;

pub use config::{ConfigError, ServerConfig};
pub use hub::{HubClosed, HubEvent, HubHandle, RelayHub};
pub use protocol::*;
pub use registry::{ConnectionId, Occupancy, Role, SessionRegistry};
pub use relay::{Outbound, RelayController, Target};
pub use transport::{router, ServerError, ServerRunner};
