use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::player::{Player, PlayerId};

pub type GameId = Uuid;

/// Lifecycle of a match. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GamePhase {
    Lobby,
    Countdown,
    Playing,
    Finished,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Lobby => "lobby",
            GamePhase::Countdown => "countdown",
            GamePhase::Playing => "playing",
            GamePhase::Finished => "finished",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            GamePhase::Lobby => 0,
            GamePhase::Countdown => 1,
            GamePhase::Playing => 2,
            GamePhase::Finished => 3,
        }
    }

    /// Forward-only ordering check.
    pub fn can_advance_to(&self, next: GamePhase) -> bool {
        next.rank() > self.rank()
    }
}

impl std::str::FromStr for GamePhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lobby" => Ok(GamePhase::Lobby),
            "countdown" => Ok(GamePhase::Countdown),
            "playing" => Ok(GamePhase::Playing),
            "finished" => Ok(GamePhase::Finished),
            other => Err(format!("unknown game phase: {}", other)),
        }
    }
}

/// The full observable state of one match.
///
/// This is what the server broadcasts after every accepted mutation and what
/// the persistence layer mirrors as a row. `version` increases strictly with
/// every mutation so clients can drop stale snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameSnapshot {
    pub id: GameId,
    pub room_code: String,
    pub host_id: PlayerId,
    pub players: Vec<Player>,
    pub phase: GamePhase,
    pub current_letters: String,
    pub current_player_id: Option<PlayerId>,
    pub time_left: u32,
    pub max_players: u32,
    pub round_number: u32,
    pub used_words: Vec<String>,
    pub winner_id: Option<PlayerId>,
    pub countdown: u32,
    pub version: u64,
    pub created_at: String, // ISO 8601 string
    pub updated_at: String, // ISO 8601 string
}

impl GameSnapshot {
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive)
    }

    pub fn alive_count(&self) -> usize {
        self.alive_players().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_only_moves_forward() {
        assert!(GamePhase::Lobby.can_advance_to(GamePhase::Countdown));
        assert!(GamePhase::Lobby.can_advance_to(GamePhase::Playing));
        assert!(GamePhase::Countdown.can_advance_to(GamePhase::Playing));
        assert!(GamePhase::Playing.can_advance_to(GamePhase::Finished));

        assert!(!GamePhase::Playing.can_advance_to(GamePhase::Lobby));
        assert!(!GamePhase::Finished.can_advance_to(GamePhase::Playing));
        assert!(!GamePhase::Countdown.can_advance_to(GamePhase::Countdown));
    }

    #[test]
    fn test_phase_string_round_trip() {
        for phase in [
            GamePhase::Lobby,
            GamePhase::Countdown,
            GamePhase::Playing,
            GamePhase::Finished,
        ] {
            assert_eq!(phase.as_str().parse::<GamePhase>().unwrap(), phase);
        }
        assert!("paused".parse::<GamePhase>().is_err());
    }
}
