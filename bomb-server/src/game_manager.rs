use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::websocket::connection::ConnectionManager;
use bomb_core::{Game, GameRules, LeaveOutcome, TimeoutOutcome, WordValidator, generate_room_code};
use bomb_persistence::GameRepository;
use bomb_types::{GameError, GameId, GamePhase, GameSnapshot, PlayerId, PlayerIdentity, ServerMessage};

#[derive(Debug)]
struct ActiveGame {
    game: Game,
    created_at: Instant,
    last_activity: Instant,
}

impl ActiveGame {
    fn new(game: Game) -> Self {
        let now = Instant::now();
        Self {
            game,
            created_at: now,
            last_activity: now,
        }
    }

    fn update_activity(&mut self) {
        self.last_activity = Instant::now();
    }

    fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() > timeout
    }
}

/// Owns every live game and is the only place game state changes. Clients
/// submit intents; each accepted mutation happens under the write lock, the
/// resulting snapshot is broadcast to the game's connections and mirrored to
/// storage. Countdown ticks and turn deadlines run on the server clock as
/// spawned tasks, so a stalled client cannot stall the game.
pub struct GameManager {
    active_games: RwLock<HashMap<GameId, ActiveGame>>,
    room_codes: RwLock<HashMap<String, GameId>>,
    word_validator: Arc<WordValidator>,
    connection_manager: Arc<ConnectionManager>,
    repository: Option<Arc<GameRepository>>,
    rules: GameRules,
    default_max_players: u32,
}

impl GameManager {
    pub fn new(
        connection_manager: Arc<ConnectionManager>,
        word_validator: WordValidator,
        rules: GameRules,
    ) -> Self {
        Self {
            active_games: RwLock::new(HashMap::new()),
            room_codes: RwLock::new(HashMap::new()),
            word_validator: Arc::new(word_validator),
            connection_manager,
            repository: None,
            rules,
            default_max_players: 4,
        }
    }

    /// Mirror snapshots to a database so finished games survive restarts.
    pub fn with_repository(mut self, repository: Arc<GameRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Room capacity used when a create request does not name one.
    pub fn with_default_max_players(mut self, max_players: u32) -> Self {
        self.default_max_players = max_players.max(1);
        self
    }

    pub async fn create_game(
        &self,
        host: &PlayerIdentity,
        max_players: Option<u32>,
    ) -> Result<GameSnapshot, GameError> {
        let max_players = max_players.unwrap_or(self.default_max_players).max(1);
        let game_id = Uuid::new_v4();
        let room_code = self.reserve_room_code(game_id).await;

        let game = Game::create(game_id, room_code.clone(), host, max_players, self.rules);
        let snapshot = game.snapshot();

        {
            let mut games = self.active_games.write().await;
            games.insert(game_id, ActiveGame::new(game));
        }

        self.persist_insert(&snapshot).await;
        info!(
            "Created game {} with room code {} for host {}",
            game_id, room_code, host.name
        );
        Ok(snapshot)
    }

    pub async fn join_game(
        &self,
        room_code: &str,
        identity: &PlayerIdentity,
    ) -> Result<GameSnapshot, GameError> {
        let code = room_code.trim().to_uppercase();
        let game_id = {
            let room_codes = self.room_codes.read().await;
            room_codes
                .get(&code)
                .copied()
                .ok_or_else(|| GameError::RoomNotFound { code: code.clone() })?
        };

        let mut games = self.active_games.write().await;
        let active_game = games
            .get_mut(&game_id)
            .ok_or(GameError::GameNotFound {
                game_id: game_id.to_string(),
            })?;

        let added = active_game.game.add_player(identity)?;
        active_game.update_activity();
        let snapshot = active_game.game.snapshot();
        drop(games);

        if added {
            info!("Player {} joined game {}", identity.name, game_id);
            self.persist_update(&snapshot).await;
            self.broadcast_state(&snapshot).await;
        }
        Ok(snapshot)
    }

    /// Host-only. Starts the pre-game countdown; when it reaches zero the
    /// game begins and the first turn deadline is armed.
    pub async fn start_countdown(
        self: &Arc<Self>,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<GameSnapshot, GameError> {
        let snapshot = {
            let mut games = self.active_games.write().await;
            let active_game = games.get_mut(&game_id).ok_or(GameError::GameNotFound {
                game_id: game_id.to_string(),
            })?;

            if active_game.game.state.player(player_id).is_none() {
                return Err(GameError::PlayerNotInGame {
                    player_id: player_id.to_string(),
                });
            }
            if active_game.game.state.host_id != player_id {
                return Err(GameError::NotHost);
            }

            active_game.game.begin_countdown()?;
            active_game.update_activity();
            active_game.game.snapshot()
        };

        self.persist_update(&snapshot).await;
        self.broadcast_state(&snapshot).await;

        if snapshot.countdown == 0 {
            self.start_playing(game_id).await?;
        } else {
            self.spawn_countdown(game_id);
        }
        Ok(snapshot)
    }

    fn spawn_countdown(self: &Arc<Self>, game_id: GameId) {
        let manager = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                match manager.tick_countdown(game_id).await {
                    Ok(remaining) if remaining > 0 => continue,
                    Ok(_) => {
                        if let Err(e) = manager.start_playing(game_id).await {
                            debug!("Countdown for {} ended without a start: {}", game_id, e);
                        }
                        break;
                    }
                    // Game removed or no longer counting down.
                    Err(e) => {
                        debug!("Countdown for {} stopped: {}", game_id, e);
                        break;
                    }
                }
            }
        });
    }

    async fn tick_countdown(&self, game_id: GameId) -> Result<u32, GameError> {
        let snapshot = {
            let mut games = self.active_games.write().await;
            let active_game = games.get_mut(&game_id).ok_or(GameError::GameNotFound {
                game_id: game_id.to_string(),
            })?;
            active_game.game.tick_countdown()?;
            active_game.game.snapshot()
        };

        self.broadcast_state(&snapshot).await;
        Ok(snapshot.countdown)
    }

    async fn start_playing(self: &Arc<Self>, game_id: GameId) -> Result<(), GameError> {
        let snapshot = {
            let mut games = self.active_games.write().await;
            let active_game = games.get_mut(&game_id).ok_or(GameError::GameNotFound {
                game_id: game_id.to_string(),
            })?;
            active_game.game.begin_playing()?;
            active_game.update_activity();
            active_game.game.snapshot()
        };

        info!("Game {} started with {} players", game_id, snapshot.players.len());
        self.persist_update(&snapshot).await;
        self.broadcast_state(&snapshot).await;
        self.arm_turn_deadline(&snapshot);
        Ok(())
    }

    pub async fn submit_word(
        self: &Arc<Self>,
        game_id: GameId,
        player_id: PlayerId,
        word: &str,
    ) -> Result<GameSnapshot, GameError> {
        let (accepted, snapshot) = {
            let mut games = self.active_games.write().await;
            let active_game = games.get_mut(&game_id).ok_or(GameError::GameNotFound {
                game_id: game_id.to_string(),
            })?;

            let accepted = active_game
                .game
                .submit_word(player_id, word, &self.word_validator)?;
            active_game.update_activity();
            (accepted, active_game.game.snapshot())
        };

        let score = snapshot.player(player_id).map(|p| p.score).unwrap_or(0);
        debug!("Game {}: {} accepted for {}", game_id, accepted, player_id);

        self.connection_manager
            .send_to_game(
                game_id,
                ServerMessage::WordAccepted {
                    player_id,
                    word: accepted,
                    score,
                },
            )
            .await;
        self.persist_update(&snapshot).await;
        self.broadcast_state(&snapshot).await;
        self.arm_turn_deadline(&snapshot);
        Ok(snapshot)
    }

    /// Resolve a turn deadline. `round` identifies the turn the deadline was
    /// armed for; if the game has moved on the call is a stale no-op.
    pub async fn handle_timeout(
        self: &Arc<Self>,
        game_id: GameId,
        player_id: PlayerId,
        round: u32,
    ) -> Result<(), GameError> {
        let (outcome, snapshot) = {
            let mut games = self.active_games.write().await;
            let active_game = games.get_mut(&game_id).ok_or(GameError::GameNotFound {
                game_id: game_id.to_string(),
            })?;

            let outcome = active_game.game.timeout(player_id, round)?;
            active_game.update_activity();
            (outcome, active_game.game.snapshot())
        };

        match outcome {
            TimeoutOutcome::Continued => {
                self.persist_update(&snapshot).await;
                self.broadcast_state(&snapshot).await;
                self.arm_turn_deadline(&snapshot);
            }
            TimeoutOutcome::Finished { winner } => {
                info!("Game {} finished, winner: {:?}", game_id, winner);
                self.finish_game(&snapshot).await;
            }
        }
        Ok(())
    }

    pub async fn leave_game(
        self: &Arc<Self>,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<(), GameError> {
        let (outcome, turn_passed, snapshot) = {
            let mut games = self.active_games.write().await;
            let active_game = games.get_mut(&game_id).ok_or(GameError::GameNotFound {
                game_id: game_id.to_string(),
            })?;

            let had_turn = active_game.game.state.current_player_id == Some(player_id);
            let outcome = active_game.game.remove_player(player_id)?;
            active_game.update_activity();
            let snapshot = active_game.game.snapshot();

            if outcome == LeaveOutcome::Deleted {
                games.remove(&game_id);
            }
            (outcome, had_turn, snapshot)
        };

        match outcome {
            LeaveOutcome::Deleted => {
                info!("Game {} discarded after {} left", game_id, player_id);
                self.release_room_code(&snapshot.room_code).await;
                self.persist_delete(game_id).await;
                // Anyone still in the lobby learns the game is gone.
                self.connection_manager
                    .send_to_game(
                        game_id,
                        ServerMessage::GameOver {
                            winner_id: None,
                            players: snapshot.players,
                        },
                    )
                    .await;
                self.connection_manager.clear_game(game_id).await;
            }
            LeaveOutcome::Finished { winner } => {
                info!(
                    "Game {} finished after {} left, winner: {:?}",
                    game_id, player_id, winner
                );
                self.finish_game(&snapshot).await;
            }
            LeaveOutcome::Continued => {
                self.persist_update(&snapshot).await;
                self.broadcast_state(&snapshot).await;
                if turn_passed {
                    self.arm_turn_deadline(&snapshot);
                }
            }
        }
        Ok(())
    }

    /// A socket dropped without a leave. The player stays in the game so
    /// they can rejoin; the turn deadline eliminates them if they never do,
    /// and the cleanup sweep reclaims games nobody comes back to.
    pub async fn handle_player_disconnect(&self, game_id: GameId, player_id: PlayerId) {
        info!("Player {} disconnected from game {}", player_id, game_id);
        let mut games = self.active_games.write().await;
        if let Some(active_game) = games.get_mut(&game_id) {
            active_game.update_activity();
        }
    }

    pub async fn get_game(&self, game_id: GameId) -> Option<GameSnapshot> {
        let games = self.active_games.read().await;
        games.get(&game_id).map(|g| g.game.snapshot())
    }

    pub async fn get_game_by_room_code(&self, room_code: &str) -> Option<GameSnapshot> {
        let code = room_code.trim().to_uppercase();
        let game_id = {
            let room_codes = self.room_codes.read().await;
            room_codes.get(&code).copied()?
        };
        self.get_game(game_id).await
    }

    pub async fn is_player_in_game(&self, game_id: GameId, player_id: PlayerId) -> bool {
        let games = self.active_games.read().await;
        games
            .get(&game_id)
            .map(|g| g.game.state.player(player_id).is_some())
            .unwrap_or(false)
    }

    pub async fn active_game_count(&self) -> usize {
        let games = self.active_games.read().await;
        games.len()
    }

    pub async fn cleanup_abandoned_games(&self, timeout: Duration) {
        let candidates: Vec<GameId> = {
            let games = self.active_games.read().await;
            games
                .iter()
                .filter(|(_, game)| game.is_expired(timeout))
                .map(|(id, _)| *id)
                .collect()
        };

        for game_id in candidates {
            let removed = {
                let mut games = self.active_games.write().await;
                // Activity may have landed between the scan and this point.
                match games.get(&game_id) {
                    Some(game) if game.is_expired(timeout) => games.remove(&game_id),
                    _ => None,
                }
            };
            let Some(removed) = removed else {
                continue;
            };

            let snapshot = removed.game.snapshot();
            self.release_room_code(&snapshot.room_code).await;
            self.connection_manager.clear_game(game_id).await;

            // Finished rows stay as an archive; abandoned ones are dropped.
            if snapshot.phase == GamePhase::Finished {
                self.persist_update(&snapshot).await;
            } else {
                self.persist_delete(game_id).await;
            }
            info!("Removed abandoned game {}", game_id);
        }
    }

    fn arm_turn_deadline(self: &Arc<Self>, snapshot: &GameSnapshot) {
        if snapshot.phase != GamePhase::Playing {
            return;
        }
        let Some(player_id) = snapshot.current_player_id else {
            return;
        };
        let game_id = snapshot.id;
        let round = snapshot.round_number;
        let secs = snapshot.time_left as u64;

        let manager = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            match manager.handle_timeout(game_id, player_id, round).await {
                Ok(()) => {}
                Err(GameError::StaleRound) => {}
                Err(e) => debug!("Deadline for game {} round {}: {}", game_id, round, e),
            }
        });
    }

    async fn finish_game(&self, snapshot: &GameSnapshot) {
        self.persist_update(snapshot).await;
        self.connection_manager
            .send_to_game(
                snapshot.id,
                ServerMessage::GameOver {
                    winner_id: snapshot.winner_id,
                    players: snapshot.players.clone(),
                },
            )
            .await;
        self.broadcast_state(snapshot).await;
        self.connection_manager.clear_game(snapshot.id).await;
    }

    async fn broadcast_state(&self, snapshot: &GameSnapshot) {
        self.connection_manager
            .send_to_game(
                snapshot.id,
                ServerMessage::GameStateUpdate {
                    game: snapshot.clone(),
                },
            )
            .await;
    }

    async fn reserve_room_code(&self, game_id: GameId) -> String {
        let mut room_codes = self.room_codes.write().await;
        loop {
            let code = generate_room_code();
            if !room_codes.contains_key(&code) {
                room_codes.insert(code.clone(), game_id);
                return code;
            }
        }
    }

    async fn release_room_code(&self, room_code: &str) {
        let mut room_codes = self.room_codes.write().await;
        room_codes.remove(room_code);
    }

    async fn persist_insert(&self, snapshot: &GameSnapshot) {
        if let Some(repository) = &self.repository {
            if let Err(e) = repository.insert_game(snapshot).await {
                warn!("Failed to store game {}: {}", snapshot.id, e);
            }
        }
    }

    async fn persist_update(&self, snapshot: &GameSnapshot) {
        if let Some(repository) = &self.repository {
            if let Err(e) = repository.update_game(snapshot).await {
                warn!("Failed to update stored game {}: {}", snapshot.id, e);
            }
        }
    }

    async fn persist_delete(&self, game_id: GameId) {
        if let Some(repository) = &self.repository {
            if let Err(e) = repository.delete_game(game_id).await {
                warn!("Failed to delete stored game {}: {}", game_id, e);
            }
        }
    }
}
