use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{GameError, GameSnapshot, Player, PlayerId, PlayerIdentity};

/// Commands a client may send over the WebSocket. The server is the sole
/// authority: clients submit intents and observe snapshots, never computing
/// the next state themselves.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ClientMessage {
    Hello { identity: PlayerIdentity },
    CreateGame { max_players: Option<u32> },
    JoinGame { room_code: String },
    StartCountdown,
    SubmitWord { word: String },
    LeaveGame,
    Heartbeat,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ServerMessage {
    HelloAck {
        player_id: PlayerId,
    },
    GameCreated {
        game: GameSnapshot,
    },
    GameJoined {
        game: GameSnapshot,
    },
    /// Broadcast after every accepted mutation. Clients must ignore any
    /// snapshot whose version is not greater than the last one applied.
    GameStateUpdate {
        game: GameSnapshot,
    },
    WordAccepted {
        player_id: PlayerId,
        word: String,
        score: i32,
    },
    GameOver {
        winner_id: Option<PlayerId>,
        players: Vec<Player>,
    },
    GameLeft,
    Rejected {
        error: GameError,
    },
    Error {
        message: String,
    },
}
