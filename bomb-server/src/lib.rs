use std::sync::Arc;
use uuid::Uuid;
use warp::Filter;

use crate::game_manager::GameManager;
use crate::websocket::ConnectionManager;

pub mod config;
pub mod game_manager;
pub mod websocket;

pub fn create_routes(
    connection_manager: Arc<ConnectionManager>,
    game_manager: Arc<GameManager>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // Clone for filters
    let connection_manager_filter = warp::any().map({
        let connection_manager = connection_manager.clone();
        move || connection_manager.clone()
    });

    let game_manager_filter = warp::any().map({
        let game_manager = game_manager.clone();
        move || game_manager.clone()
    });

    // WebSocket endpoint
    let websocket = warp::path("ws")
        .and(warp::ws())
        .and(connection_manager_filter.clone())
        .and(game_manager_filter.clone())
        .map(|ws: warp::ws::Ws, conn_mgr, game_mgr| {
            ws.on_upgrade(move |socket| websocket::handle_connection(socket, conn_mgr, game_mgr))
        });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", warp::http::StatusCode::OK));

    // Game state endpoint - lets a reconnecting client resync
    let game_state = warp::path!("game" / String / "state")
        .and(warp::get())
        .and(game_manager_filter.clone())
        .and_then(handle_game_state_request);

    // Room lookup endpoint - checks a code before joining
    let room_lookup = warp::path!("room" / String)
        .and(warp::get())
        .and(game_manager_filter.clone())
        .and_then(handle_room_lookup_request);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST", "DELETE"]);

    websocket
        .or(health)
        .or(game_state)
        .or(room_lookup)
        .with(cors)
        .with(warp::log("word_bomb"))
}

async fn handle_game_state_request(
    game_id: String,
    game_manager: Arc<GameManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let game_uuid = match Uuid::parse_str(&game_id) {
        Ok(uuid) => uuid,
        Err(_) => {
            return Ok(warp::reply::with_status(
                warp::reply::json(&serde_json::json!({
                    "error": "Invalid game ID format"
                })),
                warp::http::StatusCode::BAD_REQUEST,
            ));
        }
    };

    match game_manager.get_game(game_uuid).await {
        Some(game) => Ok(warp::reply::with_status(
            warp::reply::json(&game),
            warp::http::StatusCode::OK,
        )),
        None => Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({
                "error": "Game not found"
            })),
            warp::http::StatusCode::NOT_FOUND,
        )),
    }
}

async fn handle_room_lookup_request(
    room_code: String,
    game_manager: Arc<GameManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match game_manager.get_game_by_room_code(&room_code).await {
        Some(game) => Ok(warp::reply::with_status(
            warp::reply::json(&game),
            warp::http::StatusCode::OK,
        )),
        None => Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({
                "error": "Room not found"
            })),
            warp::http::StatusCode::NOT_FOUND,
        )),
    }
}
