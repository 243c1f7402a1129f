//! ChessMaster relay server
//!
//! Serves the board page and relays one shared game between two players and any number of
//! spectators.

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chessmaster_server::{ServerConfig, ServerRunner};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chessmaster_server=info")),
        )
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let runner = match ServerRunner::bind(&config).await {
        Ok(runner) => runner,
        Err(e) => {
            error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    info!("ChessMaster server v{}", env!("CARGO_PKG_VERSION"));
    info!("Open http://localhost:{} in your browser", config.port);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutting down");
    };

    if let Err(e) = runner.run_until(shutdown).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
