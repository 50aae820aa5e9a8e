use std::collections::HashSet;

use bomb_types::{GameError, GameId, GamePhase, GameSnapshot, Player, PlayerId, PlayerIdentity};
use tracing::debug;

use crate::letters;
use crate::word_validation::WordValidator;

/// Points for every accepted word.
pub const WORD_SCORE: i32 = 10;
/// Bonus awarded to the last player standing in a multiplayer game.
pub const SURVIVOR_BONUS: i32 = 20;

/// Tunable per-game rules. Defaults match the classic ruleset: two lives,
/// fifteen seconds per turn, a five second pre-game countdown.
#[derive(Debug, Clone, Copy)]
pub struct GameRules {
    pub starting_lives: u32,
    pub turn_seconds: u32,
    pub countdown_start: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            starting_lives: 2,
            turn_seconds: 15,
            countdown_start: 5,
        }
    }
}

/// Outcome of a timeout applied to the active player.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeoutOutcome {
    Continued,
    Finished { winner: Option<PlayerId> },
}

/// Outcome of a player leaving.
#[derive(Debug, Clone, PartialEq)]
pub enum LeaveOutcome {
    /// The game should be discarded entirely (empty, or still in the lobby).
    Deleted,
    Finished { winner: Option<PlayerId> },
    Continued,
}

/// Authoritative state of one match. Every transition happens here, in
/// process; callers broadcast the resulting snapshot and never derive state
/// themselves. Each accepted mutation bumps `state.version` exactly once.
#[derive(Debug)]
pub struct Game {
    pub state: GameSnapshot,
    rules: GameRules,
    used_set: HashSet<String>,
}

impl Game {
    pub fn create(
        id: GameId,
        room_code: String,
        host: &PlayerIdentity,
        max_players: u32,
        rules: GameRules,
    ) -> Self {
        let host_player = Player::new(
            host.id,
            &host.name,
            host.avatar_url.clone(),
            rules.starting_lives,
        );
        let now = chrono::Utc::now().to_rfc3339();

        let state = GameSnapshot {
            id,
            room_code,
            host_id: host.id,
            players: vec![host_player],
            phase: GamePhase::Lobby,
            current_letters: String::new(),
            current_player_id: None,
            time_left: rules.turn_seconds,
            max_players,
            round_number: 0,
            used_words: Vec::new(),
            winner_id: None,
            countdown: 0,
            version: 1,
            created_at: now.clone(),
            updated_at: now,
        };

        Self {
            state,
            rules,
            used_set: HashSet::new(),
        }
    }

    pub fn rules(&self) -> GameRules {
        self.rules
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.state.clone()
    }

    /// Add a player to the lobby. Re-joining with an id already in the game
    /// succeeds without mutating anything and returns `false`, so a client
    /// that reconnects can re-attach in any phase.
    pub fn add_player(&mut self, identity: &PlayerIdentity) -> Result<bool, GameError> {
        if self.state.player(identity.id).is_some() {
            return Ok(false);
        }
        if self.state.phase != GamePhase::Lobby {
            return Err(GameError::JoinAfterStart);
        }
        if self.state.players.len() as u32 >= self.state.max_players {
            return Err(GameError::GameFull);
        }

        self.state.players.push(Player::new(
            identity.id,
            &identity.name,
            identity.avatar_url.clone(),
            self.rules.starting_lives,
        ));
        self.touch();
        Ok(true)
    }

    /// Lobby -> Countdown. The caller enforces that only the host triggers it.
    pub fn begin_countdown(&mut self) -> Result<u32, GameError> {
        self.ensure_phase(GamePhase::Lobby)?;
        self.state.phase = GamePhase::Countdown;
        self.state.countdown = self.rules.countdown_start;
        self.touch();
        Ok(self.state.countdown)
    }

    /// One countdown tick, 5 -> 0. Driven by the server's clock.
    pub fn tick_countdown(&mut self) -> Result<u32, GameError> {
        self.ensure_phase(GamePhase::Countdown)?;
        self.state.countdown = self.state.countdown.saturating_sub(1);
        self.touch();
        Ok(self.state.countdown)
    }

    /// Enter the Playing phase: first player's turn, fresh prompt, round 1.
    /// A single player is allowed (practice mode).
    pub fn begin_playing(&mut self) -> Result<(), GameError> {
        match self.state.phase {
            GamePhase::Lobby | GamePhase::Countdown => {}
            GamePhase::Finished => return Err(GameError::GameFinished),
            phase => {
                return Err(GameError::InvalidPhase {
                    phase: phase.as_str().to_string(),
                });
            }
        }
        if self.state.players.is_empty() {
            return Err(GameError::NotEnoughPlayers);
        }

        let first = self.state.players[0].id;
        for player in &mut self.state.players {
            player.is_current_turn = player.id == first;
        }
        self.state.current_player_id = Some(first);
        self.state.current_letters = letters::random_letters();
        self.state.time_left = self.rules.turn_seconds;
        self.state.round_number = 1;
        self.state.countdown = 0;
        self.state.phase = GamePhase::Playing;
        self.touch();
        Ok(())
    }

    /// Accept or reject a word from the active player. On acceptance the
    /// word is recorded, the submitter scores, and the turn advances with a
    /// fresh prompt. Rejections leave the state untouched.
    pub fn submit_word(
        &mut self,
        player_id: PlayerId,
        word: &str,
        validator: &WordValidator,
    ) -> Result<String, GameError> {
        self.ensure_phase(GamePhase::Playing)?;
        if self.state.current_player_id != Some(player_id) {
            return Err(GameError::NotYourTurn);
        }

        let normalized = validator.validate(word, &self.state.current_letters, &self.used_set)?;

        self.state.used_words.push(normalized.clone());
        self.used_set.insert(normalized.clone());
        let player = self
            .player_mut(player_id)
            .ok_or_else(|| GameError::PlayerNotInGame {
                player_id: player_id.to_string(),
            })?;
        player.score += WORD_SCORE;
        player.answered_words.push(normalized.clone());

        self.advance_turn(player_id);
        self.touch();
        Ok(normalized)
    }

    /// The active player ran out of time. `round` tags which turn the caller
    /// observed; a stale tag means the turn already resolved and the call is
    /// rejected, so at most one life is lost per round no matter how many
    /// parties report the deadline.
    pub fn timeout(&mut self, player_id: PlayerId, round: u32) -> Result<TimeoutOutcome, GameError> {
        self.ensure_phase(GamePhase::Playing)?;
        if round != self.state.round_number {
            return Err(GameError::StaleRound);
        }

        let player = self
            .player_mut(player_id)
            .ok_or_else(|| GameError::PlayerNotInGame {
                player_id: player_id.to_string(),
            })?;
        player.lives = player.lives.saturating_sub(1);
        player.is_alive = player.lives > 0;
        debug!(
            "player {} timed out, {} lives left",
            player.name, player.lives
        );

        let total = self.state.players.len();
        let alive = self.state.alive_count();

        // Practice game: over only once the sole player is out of lives.
        if total == 1 && alive == 0 {
            self.finish(None);
            return Ok(TimeoutOutcome::Finished { winner: None });
        }

        // Multiplayer: one player left standing wins and takes the bonus.
        if total > 1 && alive == 1 {
            let winner = self
                .state
                .alive_players()
                .next()
                .map(|p| p.id)
                .expect("alive count was one");
            if let Some(player) = self.player_mut(winner) {
                player.score += SURVIVOR_BONUS;
            }
            self.finish(Some(winner));
            return Ok(TimeoutOutcome::Finished {
                winner: Some(winner),
            });
        }

        // Multiplayer with everyone eliminated is a draw.
        if total > 1 && alive == 0 {
            self.finish(None);
            return Ok(TimeoutOutcome::Finished { winner: None });
        }

        self.advance_turn(player_id);
        self.touch();
        Ok(TimeoutOutcome::Continued)
    }

    /// Remove a player. A lobby game is discarded on any leave, as is a game
    /// left with nobody in it. During play the leaver is kept on the board,
    /// marked dead, and win/draw conditions are re-evaluated exactly as for a
    /// timeout elimination.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<LeaveOutcome, GameError> {
        if self.state.player(player_id).is_none() {
            return Err(GameError::PlayerNotInGame {
                player_id: player_id.to_string(),
            });
        }

        if self.state.phase == GamePhase::Lobby || self.state.players.len() == 1 {
            return Ok(LeaveOutcome::Deleted);
        }

        if self.state.phase == GamePhase::Playing {
            if let Some(player) = self.player_mut(player_id) {
                player.lives = 0;
                player.is_alive = false;
                player.is_current_turn = false;
            }

            let alive = self.state.alive_count();
            if alive == 1 {
                let winner = self
                    .state
                    .alive_players()
                    .next()
                    .map(|p| p.id)
                    .expect("alive count was one");
                if let Some(player) = self.player_mut(winner) {
                    player.score += SURVIVOR_BONUS;
                }
                self.finish(Some(winner));
                return Ok(LeaveOutcome::Finished {
                    winner: Some(winner),
                });
            }
            if alive == 0 {
                self.finish(None);
                return Ok(LeaveOutcome::Finished { winner: None });
            }

            // Passing the turn starts a new round so any pending deadline
            // for the leaver's turn resolves as stale.
            if self.state.current_player_id == Some(player_id) {
                self.advance_turn(player_id);
            }
            self.touch();
            return Ok(LeaveOutcome::Continued);
        }

        // Countdown or finished: drop the player from the roster.
        self.state.players.retain(|p| p.id != player_id);
        self.touch();
        Ok(LeaveOutcome::Continued)
    }

    fn advance_turn(&mut self, from: PlayerId) {
        let next = self.next_alive_after(from);
        for player in &mut self.state.players {
            player.is_current_turn = player.id == next;
        }
        self.state.current_player_id = Some(next);
        self.state.current_letters = letters::random_letters();
        self.state.time_left = self.rules.turn_seconds;
        self.state.round_number += 1;
    }

    /// Next alive player in seat order after `from`, wrapping around. `from`
    /// itself may already be dead; its seat still anchors the rotation.
    fn next_alive_after(&self, from: PlayerId) -> PlayerId {
        let players = &self.state.players;
        let start = players
            .iter()
            .position(|p| p.id == from)
            .map(|i| i + 1)
            .unwrap_or(0);
        (0..players.len())
            .map(|offset| &players[(start + offset) % players.len()])
            .find(|p| p.is_alive)
            .map(|p| p.id)
            .expect("at least one player alive")
    }

    fn finish(&mut self, winner: Option<PlayerId>) {
        self.state.phase = GamePhase::Finished;
        self.state.winner_id = winner;
        self.state.current_player_id = None;
        self.state.countdown = 0;
        for player in &mut self.state.players {
            player.is_current_turn = false;
        }
        self.touch();
        debug!("game {} finished, winner: {:?}", self.state.id, winner);
    }

    fn ensure_phase(&self, expected: GamePhase) -> Result<(), GameError> {
        if self.state.phase == expected {
            return Ok(());
        }
        if self.state.phase == GamePhase::Finished {
            return Err(GameError::GameFinished);
        }
        Err(GameError::InvalidPhase {
            phase: self.state.phase.as_str().to_string(),
        })
    }

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.state.players.iter_mut().find(|p| p.id == id)
    }

    /// Mark one accepted mutation: bump the snapshot version and refresh
    /// the update timestamp. Called exactly once per mutation.
    fn touch(&mut self) {
        self.state.version += 1;
        self.state.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
