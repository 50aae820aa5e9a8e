use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// Domain failures surfaced to clients. Rejections never mutate game state.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GameError {
    #[error("game {game_id} not found")]
    GameNotFound { game_id: String },
    #[error("no game with room code {code}")]
    RoomNotFound { code: String },
    #[error("player {player_id} is not in this game")]
    PlayerNotInGame { player_id: String },
    #[error("game is full")]
    GameFull,
    #[error("game has already started")]
    JoinAfterStart,
    #[error("only the host can do that")]
    NotHost,
    #[error("need at least one player to start")]
    NotEnoughPlayers,
    #[error("not your turn")]
    NotYourTurn,
    #[error("game is already finished")]
    GameFinished,
    #[error("action not allowed while game is {phase}")]
    InvalidPhase { phase: String },
    #[error("turn was already resolved")]
    StaleRound,
    #[error("word must be at least 3 letters long")]
    WordTooShort,
    #[error("word must contain \"{letters}\"")]
    MissingLetters { letters: String },
    #[error("word already used in this game")]
    WordAlreadyUsed { word: String },
    #[error("not a valid word, try another")]
    NotInDictionary { word: String },
}

impl GameError {
    /// True for failures of the submitted word itself, as opposed to
    /// failures of the action being taken at all.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GameError::WordTooShort
                | GameError::MissingLetters { .. }
                | GameError::WordAlreadyUsed { .. }
                | GameError::NotInDictionary { .. }
        )
    }
}
