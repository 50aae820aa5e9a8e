mod test_helpers;

use std::time::Duration;

use bomb_types::{GameError, GamePhase};
use test_helpers::*;

#[tokio::test]
async fn test_created_games_get_distinct_room_codes() {
    let setup = TestSetup::new();
    let mut codes = std::collections::HashSet::new();

    for i in 0..10 {
        let game = setup
            .game_manager
            .create_game(&identity(&format!("Host{}", i)), None)
            .await
            .unwrap();
        assert_eq!(game.room_code.len(), 6);
        assert!(codes.insert(game.room_code));
    }

    assert_eq!(setup.game_manager.active_game_count().await, 10);
}

#[tokio::test]
async fn test_join_by_code_is_case_insensitive() {
    let setup = TestSetup::new();
    let host = identity("Ann");
    let guest = identity("Bob");

    let game = setup.game_manager.create_game(&host, None).await.unwrap();

    let joined = setup
        .game_manager
        .join_game(&game.room_code.to_lowercase(), &guest)
        .await
        .unwrap();

    assert_eq!(joined.id, game.id);
    assert_eq!(joined.players.len(), 2);
}

#[tokio::test]
async fn test_join_unknown_code_is_rejected() {
    let setup = TestSetup::new();

    let result = setup
        .game_manager
        .join_game("ZZZZ99", &identity("Bob"))
        .await;

    assert!(matches!(result, Err(GameError::RoomNotFound { .. })));
}

#[tokio::test]
async fn test_join_after_start_is_rejected() {
    let setup = TestSetup::new();
    let (game, _players) = setup_started_game(&setup, &["Ann", "Bob"]).await.unwrap();

    let result = setup
        .game_manager
        .join_game(&game.room_code, &identity("Caz"))
        .await;

    assert_eq!(result, Err(GameError::JoinAfterStart));
}

#[tokio::test]
async fn test_rejoin_after_start_returns_the_current_state() {
    let setup = TestSetup::new();
    let (game, players) = setup_started_game(&setup, &["Ann", "Bob"]).await.unwrap();

    // The same identity re-joining mid-game resyncs instead of failing.
    let rejoined = setup
        .game_manager
        .join_game(&game.room_code, &players[1])
        .await
        .unwrap();

    assert_eq!(rejoined.players.len(), 2);
    assert_eq!(rejoined.phase, GamePhase::Playing);
}

#[tokio::test]
async fn test_only_the_host_starts_the_countdown() {
    let setup = TestSetup::new();
    let host = identity("Ann");
    let guest = identity("Bob");

    let game = setup.game_manager.create_game(&host, None).await.unwrap();
    setup
        .game_manager
        .join_game(&game.room_code, &guest)
        .await
        .unwrap();

    let result = setup.game_manager.start_countdown(game.id, guest.id).await;
    assert_eq!(result.map(|_| ()), Err(GameError::NotHost));

    let result = setup
        .game_manager
        .start_countdown(game.id, uuid::Uuid::new_v4())
        .await;
    assert!(matches!(result, Err(GameError::PlayerNotInGame { .. })));
}

#[tokio::test]
async fn test_zero_countdown_starts_play_immediately() {
    let setup = TestSetup::new();
    let (game, players) = setup_started_game(&setup, &["Ann", "Bob"]).await.unwrap();

    assert_eq!(game.phase, GamePhase::Playing);
    assert_eq!(game.current_player_id, Some(players[0].id));
    assert_eq!(game.round_number, 1);
    assert_eq!(game.current_letters.len(), 2);
}

#[tokio::test]
async fn test_accepted_word_scores_and_rotates() {
    let setup = TestSetup::new();
    let (game, players) = setup_started_game(&setup, &["Ann", "Bob"]).await.unwrap();

    let word = playable_word(&game);
    let after = setup
        .game_manager
        .submit_word(game.id, players[0].id, &word)
        .await
        .unwrap();

    assert_eq!(after.used_words, vec![word]);
    assert_eq!(after.player(players[0].id).unwrap().score, 10);
    assert_eq!(after.current_player_id, Some(players[1].id));
    assert_eq!(after.round_number, 2);
    assert!(after.version > game.version);
}

#[tokio::test]
async fn test_out_of_turn_and_invalid_words_are_rejected() {
    let setup = TestSetup::new();
    let (game, players) = setup_started_game(&setup, &["Ann", "Bob"]).await.unwrap();

    let result = setup
        .game_manager
        .submit_word(game.id, players[1].id, "anything")
        .await;
    assert_eq!(result.map(|_| ()), Err(GameError::NotYourTurn));

    let result = setup
        .game_manager
        .submit_word(game.id, players[0].id, "zz")
        .await;
    assert_eq!(result.map(|_| ()), Err(GameError::WordTooShort));

    // Rejections leave the game untouched.
    let current = setup.game_manager.get_game(game.id).await.unwrap();
    assert_eq!(current.version, game.version);
    assert_eq!(current.round_number, 1);
}

#[tokio::test]
async fn test_timeout_for_a_stale_round_is_ignored() {
    let setup = TestSetup::new();
    let (game, players) = setup_started_game(&setup, &["Ann", "Bob"]).await.unwrap();

    let word = playable_word(&game);
    setup
        .game_manager
        .submit_word(game.id, players[0].id, &word)
        .await
        .unwrap();

    // A deadline armed for round 1 fires after the round resolved.
    let result = setup
        .game_manager
        .handle_timeout(game.id, players[0].id, 1)
        .await;
    assert_eq!(result, Err(GameError::StaleRound));

    let current = setup.game_manager.get_game(game.id).await.unwrap();
    assert_eq!(current.player(players[0].id).unwrap().lives, 2);
}

#[tokio::test]
async fn test_timeouts_eliminate_and_finish_the_game() {
    let setup = TestSetup::new();
    let (game, players) = setup_started_game(&setup, &["Ann", "Bob"]).await.unwrap();

    // Ann times out on round 1; turn and a fresh round pass to Bob.
    setup
        .game_manager
        .handle_timeout(game.id, players[0].id, 1)
        .await
        .unwrap();
    let mid = setup.game_manager.get_game(game.id).await.unwrap();
    assert_eq!(mid.player(players[0].id).unwrap().lives, 1);
    assert_eq!(mid.current_player_id, Some(players[1].id));

    // Bob plays a word, then Ann times out her second life away.
    let word = playable_word(&mid);
    let after = setup
        .game_manager
        .submit_word(mid.id, players[1].id, &word)
        .await
        .unwrap();
    setup
        .game_manager
        .handle_timeout(game.id, players[0].id, after.round_number)
        .await
        .unwrap();

    let finished = setup.game_manager.get_game(game.id).await.unwrap();
    assert_eq!(finished.phase, GamePhase::Finished);
    assert_eq!(finished.winner_id, Some(players[1].id));
    // Survivor bonus on top of the word score.
    assert_eq!(finished.player(players[1].id).unwrap().score, 30);
}

#[tokio::test]
async fn test_leaving_a_lobby_discards_the_game() {
    let setup = TestSetup::new();
    let host = identity("Ann");

    let game = setup.game_manager.create_game(&host, None).await.unwrap();
    assert_eq!(setup.game_manager.active_game_count().await, 1);

    setup
        .game_manager
        .leave_game(game.id, host.id)
        .await
        .unwrap();

    assert_eq!(setup.game_manager.active_game_count().await, 0);
    assert!(setup.game_manager.get_game(game.id).await.is_none());
    assert!(
        setup
            .game_manager
            .get_game_by_room_code(&game.room_code)
            .await
            .is_none()
    );
}

#[tokio::test]
async fn test_leaving_mid_game_forfeits() {
    let setup = TestSetup::new();
    let (game, players) = setup_started_game(&setup, &["Ann", "Bob"]).await.unwrap();

    setup
        .game_manager
        .leave_game(game.id, players[0].id)
        .await
        .unwrap();

    let finished = setup.game_manager.get_game(game.id).await.unwrap();
    assert_eq!(finished.phase, GamePhase::Finished);
    assert_eq!(finished.winner_id, Some(players[1].id));
    // The leaver stays on the final scoreboard, eliminated.
    assert!(!finished.player(players[0].id).unwrap().is_alive);
}

#[tokio::test]
async fn test_room_code_lookup_tracks_lifecycle() {
    let setup = TestSetup::new();
    let host = identity("Ann");

    let game = setup.game_manager.create_game(&host, None).await.unwrap();
    let found = setup
        .game_manager
        .get_game_by_room_code(&game.room_code)
        .await
        .unwrap();
    assert_eq!(found.id, game.id);

    assert!(
        setup
            .game_manager
            .get_game_by_room_code("AAAAAA")
            .await
            .is_none()
    );
}

#[tokio::test]
async fn test_cleanup_reclaims_idle_games() {
    let setup = TestSetup::new();
    let host = identity("Ann");

    let game = setup.game_manager.create_game(&host, None).await.unwrap();

    // Fresh games survive a sweep with a generous timeout.
    setup
        .game_manager
        .cleanup_abandoned_games(Duration::from_secs(60))
        .await;
    assert_eq!(setup.game_manager.active_game_count().await, 1);

    tokio::time::sleep(Duration::from_millis(20)).await;
    setup
        .game_manager
        .cleanup_abandoned_games(Duration::from_millis(10))
        .await;

    assert_eq!(setup.game_manager.active_game_count().await, 0);
    assert!(
        setup
            .game_manager
            .get_game_by_room_code(&game.room_code)
            .await
            .is_none()
    );
}

#[tokio::test]
async fn test_cleanup_keeps_games_with_recent_activity() {
    let setup = TestSetup::new();
    let host = identity("Ann");

    let game = setup.game_manager.create_game(&host, None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;

    // A join after the idle period resets the activity clock, so a sweep
    // with a timeout longer than the time since the join keeps the game.
    setup
        .game_manager
        .join_game(&game.room_code, &identity("Bob"))
        .await
        .unwrap();
    setup
        .game_manager
        .cleanup_abandoned_games(Duration::from_millis(25))
        .await;

    assert_eq!(setup.game_manager.active_game_count().await, 1);
    assert!(
        setup
            .game_manager
            .get_game_by_room_code(&game.room_code)
            .await
            .is_some()
    );
}

#[tokio::test]
async fn test_is_player_in_game() {
    let setup = TestSetup::new();
    let host = identity("Ann");

    let game = setup.game_manager.create_game(&host, None).await.unwrap();

    assert!(setup.game_manager.is_player_in_game(game.id, host.id).await);
    assert!(
        !setup
            .game_manager
            .is_player_in_game(game.id, uuid::Uuid::new_v4())
            .await
    );
}
