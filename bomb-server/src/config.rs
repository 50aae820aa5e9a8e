use std::env;

use bomb_core::GameRules;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_players_per_game: u32,
    pub starting_lives: u32,
    pub turn_seconds: u32,
    pub countdown_seconds: u32,
    pub game_timeout_minutes: u64,
    pub connection_timeout_seconds: u64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            max_players_per_game: env::var("MAX_PLAYERS_PER_GAME")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .expect("Invalid MAX_PLAYERS_PER_GAME"),
            starting_lives: env::var("STARTING_LIVES")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .expect("Invalid STARTING_LIVES"),
            turn_seconds: env::var("TURN_SECONDS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .expect("Invalid TURN_SECONDS"),
            countdown_seconds: env::var("COUNTDOWN_SECONDS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .expect("Invalid COUNTDOWN_SECONDS"),
            game_timeout_minutes: env::var("GAME_TIMEOUT_MINUTES")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("Invalid GAME_TIMEOUT_MINUTES"),
            connection_timeout_seconds: env::var("CONNECTION_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .expect("Invalid CONNECTION_TIMEOUT_SECONDS"),
        }
    }

    pub fn rules(&self) -> GameRules {
        GameRules {
            starting_lives: self.starting_lives,
            turn_seconds: self.turn_seconds,
            countdown_start: self.countdown_seconds,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
