use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{error, info, warn};
use warp::ws::{Message, WebSocket};

use crate::game_manager::GameManager;
use bomb_types::{ClientMessage, ServerMessage};

pub mod connection;
pub mod handlers;
pub mod rate_limiter;

use connection::ConnectionId;
pub use connection::ConnectionManager;
use handlers::MessageHandler;
use rate_limiter::RateLimiter;

/// Drives one socket for its whole lifetime: an inbound loop feeding client
/// commands to the handler and an outbound loop draining the connection's
/// mailbox back to the wire. Whichever loop stops first ends the connection.
pub async fn handle_connection(
    websocket: WebSocket,
    connection_manager: Arc<ConnectionManager>,
    game_manager: Arc<GameManager>,
) {
    let connection_id = ConnectionId::new();
    info!("WebSocket connected: {}", connection_id);

    let (mut ws_tx, mut ws_rx) = websocket.split();
    let mut mailbox = connection_manager.create_connection(connection_id).await;

    let handler = MessageHandler::new(
        connection_id,
        connection_manager.clone(),
        game_manager.clone(),
    );

    let inbound = {
        let handler = handler.clone();
        let connection_manager = connection_manager.clone();
        let mut rate_limiter = RateLimiter::new();

        async move {
            while let Some(frame) = ws_rx.next().await {
                let msg = match frame {
                    Ok(msg) => msg,
                    Err(e) => {
                        warn!("WebSocket error for {}: {}", connection_id, e);
                        break;
                    }
                };

                if !rate_limiter.check_rate_limit().await {
                    warn!("Rate limit exceeded for connection {}", connection_id);
                    break;
                }

                // Pings, pongs and close frames need no application reply.
                let Ok(text) = msg.to_str() else { continue };

                match serde_json::from_str::<ClientMessage>(text) {
                    Ok(command) => {
                        if let Err(e) = handler.handle_message(command).await {
                            error!("Dropping connection {}: {}", connection_id, e);
                            break;
                        }
                    }
                    Err(e) => {
                        // Malformed input gets reported, not disconnected;
                        // the rate limiter deals with floods of it.
                        let report = ServerMessage::Error {
                            message: format!("Invalid JSON message: {}", e),
                        };
                        if connection_manager
                            .send_to_connection(connection_id, report)
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                }
            }
        }
    };

    let outbound = async move {
        while let Some(message) = mailbox.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    error!("Unserializable server message: {:?}", e);
                    continue;
                }
            };

            if let Err(e) = ws_tx.send(Message::text(json)).await {
                warn!("Send to {} failed: {:?}", connection_id, e);
                break;
            }
        }
    };

    tokio::select! {
        _ = inbound => {},
        _ = outbound => {},
    }

    info!("WebSocket disconnected: {}", connection_id);
    handler.handle_disconnect().await;
    connection_manager.remove_connection(connection_id).await;
}
