//! HTTP and WebSocket transport using axum.
//!
//! Serves the client page and assets from the static directory and upgrades `/ws` to a
//! WebSocket. Each socket gets a reader loop feeding the hub and a writer task draining
//! the connection's outbound queue.

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::hub::{HubHandle, RelayHub};
use crate::protocol::{decode_client_message, encode_server_message};
use crate::registry::ConnectionId;
use crate::relay::RelayController;

/// Build the application router around a running hub.
pub fn router(hub: HubHandle, static_dir: &Path) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(hub)
}

async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<HubHandle>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: HubHandle) {
    let (id, mut inbox) = match hub.connect().await {
        Ok(registered) => registered,
        Err(e) => {
            warn!("Refusing socket: {}", e);
            return;
        }
    };
    let (mut sender, mut receiver) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(message) = inbox.recv().await {
            let text = match encode_server_message(&message) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to encode {:?}: {}", message, e);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = receiver.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                debug!("Socket error on {}: {}", id, e);
                break;
            }
        };

        match decode_client_message(text.as_str()) {
            Ok(message) => {
                if hub.send(id, message).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!("Failed to decode message from {}: {}", id, e),
        }
    }

    release(&hub, id).await;
    writer.abort();
}

async fn release(hub: &HubHandle, id: ConnectionId) {
    if let Err(e) = hub.disconnect(id).await {
        debug!("Could not report disconnect of {}: {}", id, e);
    }
}

/// Transport error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {0}: {1}")]
    BindFailed(SocketAddr, std::io::Error),

    #[error("Failed to determine bound address: {0}")]
    LocalAddrFailed(std::io::Error),

    #[error("Server error: {0}")]
    Serve(std::io::Error),
}

/// Bound listener plus the hub task serving it.
pub struct ServerRunner {
    listener: TcpListener,
    app: Router,
    hub: JoinHandle<()>,
}

impl ServerRunner {
    /// Bind the listener and start the hub with a fresh game.
    pub async fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        let address = config.bind_address();
        let listener = TcpListener::bind(address)
            .await
            .map_err(|e| ServerError::BindFailed(address, e))?;

        let (hub, handle) = RelayHub::new(
            RelayController::new(),
            config.inbound_queue,
            config.outbound_queue,
        );
        let hub = tokio::spawn(hub.run());
        let app = router(handle, &config.static_dir);

        info!(
            "Bound to {} (static files from {})",
            address,
            config.static_dir.display()
        );
        Ok(Self { listener, app, hub })
    }

    /// Get the bound address
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener
            .local_addr()
            .map_err(ServerError::LocalAddrFailed)
    }

    /// Serve until `shutdown` resolves.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let result = axum::serve(self.listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(ServerError::Serve);
        self.hub.abort();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn release_tolerates_stopped_hub() {
        let (hub, handle) = RelayHub::new(RelayController::new(), 4, 4);
        drop(hub);

        assert_eq!(
            handle.disconnect(ConnectionId(1)).await,
            Err(crate::hub::HubClosed)
        );
        release(&handle, ConnectionId(1)).await;
    }

    #[tokio::test]
    async fn bind_ephemeral_port() {
        let config = ServerConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            ..Default::default()
        };

        match ServerRunner::bind(&config).await {
            Ok(runner) => {
                let addr = runner.local_addr().unwrap();
                assert_ne!(addr.port(), 0);
            }
            Err(ServerError::BindFailed(_, err))
                if err.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                // Some sandboxed environments disallow socket binds.
            }
            Err(err) => panic!("bind error: {err:?}"),
        }
    }
}
