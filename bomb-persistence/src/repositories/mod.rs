pub mod game_repository;
