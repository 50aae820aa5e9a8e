use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

use bomb_core::WordValidator;
use bomb_persistence::{GameRepository, connection::connect_and_migrate};
use bomb_server::{config::Config, create_routes, game_manager::GameManager, websocket::ConnectionManager};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Word Bomb server...");

    let config = Config::new();
    let connection_manager = Arc::new(ConnectionManager::new());

    // Dictionary: an external list when configured, the bundled one otherwise
    let word_validator = match std::env::var("WORD_LIST_FILE") {
        Ok(path) => {
            info!("Loading word list from {}", path);
            match WordValidator::from_file(&path) {
                Ok(validator) => validator,
                Err(e) => {
                    tracing::error!("Failed to load word list '{}': {}", path, e);
                    std::process::exit(1);
                }
            }
        }
        Err(_) => WordValidator::built_in(),
    };
    info!("Dictionary loaded with {} words", word_validator.word_count());

    // Initialize database connection and run migrations
    let db = match connect_and_migrate().await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to connect to database and run migrations: {}", e);
            std::process::exit(1);
        }
    };
    let repository = Arc::new(GameRepository::new(db));

    let game_manager = Arc::new(
        GameManager::new(connection_manager.clone(), word_validator, config.rules())
            .with_default_max_players(config.max_players_per_game)
            .with_repository(repository),
    );

    let routes = create_routes(connection_manager.clone(), game_manager.clone());

    // Start cleanup task
    let cleanup_connection_manager = connection_manager.clone();
    let cleanup_game_manager = game_manager.clone();
    let cleanup_config = config.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));
        loop {
            interval.tick().await;
            let connection_timeout = Duration::from_secs(cleanup_config.connection_timeout_seconds);
            let game_timeout = Duration::from_secs(cleanup_config.game_timeout_minutes * 60);

            cleanup_connection_manager
                .cleanup_inactive_connections(connection_timeout)
                .await;
            cleanup_game_manager
                .cleanup_abandoned_games(game_timeout)
                .await;
        }
    });

    info!("Server starting on {}:{}", config.host, config.port);

    let addr = (
        config.host.parse::<std::net::IpAddr>().expect("Invalid HOST"),
        config.port,
    );

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt()).unwrap();
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).unwrap();

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
