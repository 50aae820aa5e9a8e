use bomb_types::{GameId, PlayerId, PlayerIdentity, ServerMessage};
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub player: Option<PlayerIdentity>,
    pub game_id: Option<GameId>,
    pub connected_at: Instant,
    pub last_activity: Instant,
    pub sender: mpsc::UnboundedSender<ServerMessage>,
}

impl Connection {
    pub fn new(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let now = Instant::now();

        let connection = Self {
            id,
            player: None,
            game_id: None,
            connected_at: now,
            last_activity: now,
            sender,
        };

        (connection, receiver)
    }

    pub fn update_activity(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn player_id(&self) -> Option<PlayerId> {
        self.player.as_ref().map(|p| p.id)
    }

    pub fn send_message(&self, message: ServerMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .map_err(|_| "Connection closed".to_string())
    }

    pub fn is_inactive(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() > timeout
    }
}

/// Tracks every live WebSocket and which player and game it belongs to.
/// Game state lives elsewhere; this layer only routes outgoing messages.
pub struct ConnectionManager {
    connections: RwLock<HashMap<ConnectionId, Connection>>,
    player_to_connection: RwLock<HashMap<PlayerId, ConnectionId>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            player_to_connection: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create_connection(
        &self,
        id: ConnectionId,
    ) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (conn, receiver) = Connection::new(id);

        {
            let mut connections = self.connections.write().await;
            connections.insert(id, conn);
        }

        receiver
    }

    pub async fn remove_connection(&self, id: ConnectionId) {
        let player_id = {
            let mut connections = self.connections.write().await;
            connections.remove(&id).and_then(|conn| conn.player_id())
        };

        if let Some(player_id) = player_id {
            let mut player_to_connection = self.player_to_connection.write().await;
            // Only unmap if this connection still owns the player; a
            // reconnect may have claimed the id already.
            if player_to_connection.get(&player_id) == Some(&id) {
                player_to_connection.remove(&player_id);
            }
        }
    }

    pub async fn get_connection(&self, id: ConnectionId) -> Option<Connection> {
        let connections = self.connections.read().await;
        connections.get(&id).cloned()
    }

    /// Bind an identity to a connection. A player reconnecting on a fresh
    /// socket takes the mapping over from the stale one.
    pub async fn identify_connection(
        &self,
        id: ConnectionId,
        identity: PlayerIdentity,
    ) -> Result<(), String> {
        let player_id = identity.id;

        {
            let mut connections = self.connections.write().await;
            let connection = connections.get_mut(&id).ok_or("Connection not found")?;
            connection.player = Some(identity);
        }

        {
            let mut player_to_connection = self.player_to_connection.write().await;
            player_to_connection.insert(player_id, id);
        }

        Ok(())
    }

    pub async fn update_activity(&self, id: ConnectionId) {
        let mut connections = self.connections.write().await;
        if let Some(connection) = connections.get_mut(&id) {
            connection.update_activity();
        }
    }

    pub async fn send_to_connection(
        &self,
        id: ConnectionId,
        message: ServerMessage,
    ) -> Result<(), String> {
        let connections = self.connections.read().await;
        if let Some(connection) = connections.get(&id) {
            connection.send_message(message)
        } else {
            Err("Connection not found".to_string())
        }
    }

    pub async fn send_to_player(
        &self,
        player_id: PlayerId,
        message: ServerMessage,
    ) -> Result<(), String> {
        let connection_id = {
            let player_to_connection = self.player_to_connection.read().await;
            player_to_connection.get(&player_id).copied()
        };

        if let Some(connection_id) = connection_id {
            self.send_to_connection(connection_id, message).await
        } else {
            Err("Player not connected".to_string())
        }
    }

    pub async fn send_to_game(&self, game_id: GameId, message: ServerMessage) {
        let connections = self.connections.read().await;
        for connection in connections.values() {
            if connection.game_id == Some(game_id) {
                let _ = connection.send_message(message.clone());
            }
        }
    }

    pub async fn set_connection_game(&self, id: ConnectionId, game_id: Option<GameId>) {
        let mut connections = self.connections.write().await;
        if let Some(connection) = connections.get_mut(&id) {
            connection.game_id = game_id;
        }
    }

    pub async fn get_connections_in_game(&self, game_id: GameId) -> Vec<ConnectionId> {
        let connections = self.connections.read().await;
        connections
            .values()
            .filter(|conn| conn.game_id == Some(game_id))
            .map(|conn| conn.id)
            .collect()
    }

    /// Drop every connection assigned to a game, used when the game ends.
    pub async fn clear_game(&self, game_id: GameId) {
        let mut connections = self.connections.write().await;
        for connection in connections.values_mut() {
            if connection.game_id == Some(game_id) {
                connection.game_id = None;
            }
        }
    }

    pub async fn cleanup_inactive_connections(&self, timeout: Duration) {
        let inactive_connections: Vec<ConnectionId> = {
            let connections = self.connections.read().await;
            connections
                .values()
                .filter(|conn| conn.is_inactive(timeout))
                .map(|conn| conn.id)
                .collect()
        };

        for connection_id in inactive_connections {
            tracing::info!("Removing inactive connection: {}", connection_id);
            self.remove_connection(connection_id).await;
        }
    }

    // Test helper methods
    pub async fn connection_count(&self) -> usize {
        let connections = self.connections.read().await;
        connections.len()
    }

    pub async fn player_connection_count(&self) -> usize {
        let player_connections = self.player_to_connection.read().await;
        player_connections.len()
    }
}
