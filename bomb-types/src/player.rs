use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

pub type PlayerId = Uuid;

/// A participant embedded in a game snapshot, in join order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub avatar: String,
    pub avatar_url: Option<String>,
    pub lives: u32,
    pub is_alive: bool,
    pub is_current_turn: bool,
    pub score: i32,
    pub answered_words: Vec<String>,
}

impl Player {
    pub fn new(id: PlayerId, name: &str, avatar_url: Option<String>, lives: u32) -> Self {
        let avatar = name
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_else(|| "?".to_string());

        Self {
            id,
            name: name.to_string(),
            avatar,
            avatar_url,
            lives,
            is_alive: lives > 0,
            is_current_turn: false,
            score: 0,
            answered_words: Vec::new(),
        }
    }
}

/// Identity a client announces before issuing game commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerIdentity {
    pub id: PlayerId,
    pub name: String,
    pub avatar_url: Option<String>,
}
