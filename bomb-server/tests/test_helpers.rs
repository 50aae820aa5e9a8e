use std::sync::Arc;
use uuid::Uuid;

use bomb_core::{GameRules, WordValidator};
use bomb_server::game_manager::GameManager;
use bomb_server::websocket::ConnectionManager;
use bomb_types::{GameError, GameSnapshot, PlayerIdentity};

/// The same list the server bundles, used to pick a playable word for
/// whatever prompt a test happens to draw.
const DICTIONARY: &str = include_str!("../../bomb-core/words/common.txt");

pub struct TestSetup {
    pub connection_manager: Arc<ConnectionManager>,
    pub game_manager: Arc<GameManager>,
}

impl TestSetup {
    /// Manager wired with the bundled dictionary and no pre-game countdown.
    pub fn new() -> Self {
        let connection_manager = Arc::new(ConnectionManager::new());
        let rules = GameRules {
            starting_lives: 2,
            turn_seconds: 15,
            countdown_start: 0,
        };
        let game_manager = Arc::new(GameManager::new(
            connection_manager.clone(),
            WordValidator::built_in(),
            rules,
        ));

        Self {
            connection_manager,
            game_manager,
        }
    }
}

pub fn identity(name: &str) -> PlayerIdentity {
    PlayerIdentity {
        id: Uuid::new_v4(),
        name: name.to_string(),
        avatar_url: None,
    }
}

/// Create a game, join everyone after the host, and start it.
pub async fn setup_started_game(
    setup: &TestSetup,
    names: &[&str],
) -> Result<(GameSnapshot, Vec<PlayerIdentity>), GameError> {
    let players: Vec<PlayerIdentity> = names.iter().map(|name| identity(name)).collect();

    let game = setup
        .game_manager
        .create_game(&players[0], Some(names.len().max(1) as u32))
        .await?;
    for player in &players[1..] {
        setup.game_manager.join_game(&game.room_code, player).await?;
    }

    setup
        .game_manager
        .start_countdown(game.id, players[0].id)
        .await?;

    let started = setup
        .game_manager
        .get_game(game.id)
        .await
        .expect("game should still exist");
    Ok((started, players))
}

/// Find a dictionary word containing the game's current prompt that has not
/// been played yet.
pub fn playable_word(snapshot: &GameSnapshot) -> String {
    let prompt = snapshot.current_letters.to_lowercase();
    DICTIONARY
        .lines()
        .map(str::trim)
        .filter(|w| !w.is_empty() && !w.starts_with('#'))
        .find(|w| w.contains(&prompt) && !snapshot.used_words.iter().any(|u| u == w))
        .unwrap_or_else(|| panic!("no dictionary word for prompt {}", prompt))
        .to_string()
}
