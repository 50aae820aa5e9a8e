use std::sync::Arc;
use tracing::{error, info};

use crate::game_manager::GameManager;
use crate::websocket::connection::{ConnectionId, ConnectionManager};
use bomb_types::{ClientMessage, GameId, PlayerIdentity, ServerMessage};

#[derive(Clone)]
pub struct MessageHandler {
    connection_id: ConnectionId,
    connection_manager: Arc<ConnectionManager>,
    game_manager: Arc<GameManager>,
}

impl MessageHandler {
    pub fn new(
        connection_id: ConnectionId,
        connection_manager: Arc<ConnectionManager>,
        game_manager: Arc<GameManager>,
    ) -> Self {
        Self {
            connection_id,
            connection_manager,
            game_manager,
        }
    }

    pub async fn handle_message(&self, message: ClientMessage) -> Result<(), String> {
        self.connection_manager
            .update_activity(self.connection_id)
            .await;

        match message {
            ClientMessage::Hello { identity } => self.handle_hello(identity).await,
            ClientMessage::CreateGame { max_players } => self.handle_create_game(max_players).await,
            ClientMessage::JoinGame { room_code } => self.handle_join_game(room_code).await,
            ClientMessage::StartCountdown => self.handle_start_countdown().await,
            ClientMessage::SubmitWord { word } => self.handle_submit_word(word).await,
            ClientMessage::LeaveGame => self.handle_leave_game().await,
            ClientMessage::Heartbeat => Ok(()),
        }
    }

    pub async fn handle_disconnect(&self) {
        info!("Handling disconnect for connection {}", self.connection_id);

        if let Some(connection) = self
            .connection_manager
            .get_connection(self.connection_id)
            .await
        {
            if let (Some(game_id), Some(player_id)) = (connection.game_id, connection.player_id()) {
                self.game_manager
                    .handle_player_disconnect(game_id, player_id)
                    .await;
            }
        }
    }

    async fn handle_hello(&self, identity: PlayerIdentity) -> Result<(), String> {
        info!(
            "Connection {} identified as {} ({})",
            self.connection_id, identity.name, identity.id
        );

        let player_id = identity.id;
        self.connection_manager
            .identify_connection(self.connection_id, identity)
            .await?;
        self.send_message(ServerMessage::HelloAck { player_id }).await
    }

    async fn handle_create_game(&self, max_players: Option<u32>) -> Result<(), String> {
        let identity = match self.require_identity().await? {
            Some(identity) => identity,
            None => return Ok(()),
        };
        if self.current_game().await.is_some() {
            return self.send_error("Already in a game").await;
        }

        match self.game_manager.create_game(&identity, max_players).await {
            Ok(game) => {
                self.connection_manager
                    .set_connection_game(self.connection_id, Some(game.id))
                    .await;
                self.send_message(ServerMessage::GameCreated { game }).await
            }
            Err(error) => self.send_message(ServerMessage::Rejected { error }).await,
        }
    }

    async fn handle_join_game(&self, room_code: String) -> Result<(), String> {
        let identity = match self.require_identity().await? {
            Some(identity) => identity,
            None => return Ok(()),
        };

        match self.game_manager.join_game(&room_code, &identity).await {
            Ok(game) => {
                self.connection_manager
                    .set_connection_game(self.connection_id, Some(game.id))
                    .await;
                self.send_message(ServerMessage::GameJoined { game }).await
            }
            Err(error) => self.send_message(ServerMessage::Rejected { error }).await,
        }
    }

    async fn handle_start_countdown(&self) -> Result<(), String> {
        let (game_id, player_id) = match self.require_game().await? {
            Some(ids) => ids,
            None => return Ok(()),
        };

        match self.game_manager.start_countdown(game_id, player_id).await {
            // The new state reaches everyone through the broadcast.
            Ok(_) => Ok(()),
            Err(error) => self.send_message(ServerMessage::Rejected { error }).await,
        }
    }

    async fn handle_submit_word(&self, word: String) -> Result<(), String> {
        let (game_id, player_id) = match self.require_game().await? {
            Some(ids) => ids,
            None => return Ok(()),
        };

        match self
            .game_manager
            .submit_word(game_id, player_id, &word)
            .await
        {
            Ok(_) => Ok(()),
            Err(error) => self.send_message(ServerMessage::Rejected { error }).await,
        }
    }

    async fn handle_leave_game(&self) -> Result<(), String> {
        let (game_id, player_id) = match self.require_game().await? {
            Some(ids) => ids,
            None => return Ok(()),
        };

        match self.game_manager.leave_game(game_id, player_id).await {
            Ok(()) => {
                self.connection_manager
                    .set_connection_game(self.connection_id, None)
                    .await;
                self.send_message(ServerMessage::GameLeft).await
            }
            Err(error) => {
                error!(
                    "Failed to remove {} from game {}: {}",
                    player_id, game_id, error
                );
                self.send_message(ServerMessage::Rejected { error }).await
            }
        }
    }

    /// Returns the connection's identity, or sends an error and yields None
    /// when the client never said hello.
    async fn require_identity(&self) -> Result<Option<PlayerIdentity>, String> {
        let connection = self
            .connection_manager
            .get_connection(self.connection_id)
            .await
            .ok_or("Connection not found")?;

        match connection.player {
            Some(identity) => Ok(Some(identity)),
            None => {
                self.send_error("Introduce yourself with Hello first").await?;
                Ok(None)
            }
        }
    }

    async fn require_game(&self) -> Result<Option<(GameId, bomb_types::PlayerId)>, String> {
        let connection = self
            .connection_manager
            .get_connection(self.connection_id)
            .await
            .ok_or("Connection not found")?;

        match (connection.game_id, connection.player_id()) {
            (Some(game_id), Some(player_id)) => Ok(Some((game_id, player_id))),
            (None, Some(_)) => {
                self.send_error("Not in a game").await?;
                Ok(None)
            }
            _ => {
                self.send_error("Introduce yourself with Hello first").await?;
                Ok(None)
            }
        }
    }

    async fn current_game(&self) -> Option<GameId> {
        self.connection_manager
            .get_connection(self.connection_id)
            .await
            .and_then(|conn| conn.game_id)
    }

    async fn send_message(&self, message: ServerMessage) -> Result<(), String> {
        self.connection_manager
            .send_to_connection(self.connection_id, message)
            .await
    }

    async fn send_error(&self, error_message: &str) -> Result<(), String> {
        self.send_message(ServerMessage::Error {
            message: error_message.to_string(),
        })
        .await
    }
}
