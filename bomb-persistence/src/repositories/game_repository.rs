use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::{games, prelude::*};
use bomb_types::{GameSnapshot, Player};

/// Write-behind mirror of live game state. The in-process coordinator owns
/// the truth; rows here exist so finished games survive restarts and the
/// cleanup task can find abandoned ones.
pub struct GameRepository {
    db: DatabaseConnection,
}

impl GameRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_snapshot(model: games::Model) -> Result<GameSnapshot> {
        let players: Vec<Player> = serde_json::from_value(model.players)?;
        let used_words: Vec<String> = serde_json::from_value(model.used_words)?;
        let phase = model
            .phase
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;

        Ok(GameSnapshot {
            id: Uuid::parse_str(&model.id)?,
            room_code: model.room_code,
            host_id: Uuid::parse_str(&model.host_id)?,
            players,
            phase,
            current_letters: model.current_letters,
            current_player_id: model
                .current_player_id
                .as_deref()
                .map(Uuid::parse_str)
                .transpose()?,
            time_left: model.time_left as u32,
            max_players: model.max_players as u32,
            round_number: model.round_number as u32,
            used_words,
            winner_id: model
                .winner_id
                .as_deref()
                .map(Uuid::parse_str)
                .transpose()?,
            countdown: model.countdown as u32,
            version: model.version as u64,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        })
    }

    fn snapshot_to_active(snapshot: &GameSnapshot) -> Result<games::ActiveModel> {
        let created_at = chrono::DateTime::parse_from_rfc3339(&snapshot.created_at)
            .unwrap_or_else(|_| chrono::Utc::now().into());
        let updated_at = chrono::DateTime::parse_from_rfc3339(&snapshot.updated_at)
            .unwrap_or_else(|_| chrono::Utc::now().into());

        Ok(games::ActiveModel {
            id: sea_orm::ActiveValue::Set(snapshot.id.to_string()),
            room_code: sea_orm::ActiveValue::Set(snapshot.room_code.clone()),
            host_id: sea_orm::ActiveValue::Set(snapshot.host_id.to_string()),
            phase: sea_orm::ActiveValue::Set(snapshot.phase.as_str().to_string()),
            players: sea_orm::ActiveValue::Set(serde_json::to_value(&snapshot.players)?),
            current_letters: sea_orm::ActiveValue::Set(snapshot.current_letters.clone()),
            current_player_id: sea_orm::ActiveValue::Set(
                snapshot.current_player_id.map(|id| id.to_string()),
            ),
            time_left: sea_orm::ActiveValue::Set(snapshot.time_left as i32),
            max_players: sea_orm::ActiveValue::Set(snapshot.max_players as i32),
            round_number: sea_orm::ActiveValue::Set(snapshot.round_number as i32),
            used_words: sea_orm::ActiveValue::Set(serde_json::to_value(&snapshot.used_words)?),
            winner_id: sea_orm::ActiveValue::Set(snapshot.winner_id.map(|id| id.to_string())),
            countdown: sea_orm::ActiveValue::Set(snapshot.countdown as i32),
            version: sea_orm::ActiveValue::Set(snapshot.version as i64),
            created_at: sea_orm::ActiveValue::Set(created_at),
            updated_at: sea_orm::ActiveValue::Set(updated_at),
        })
    }

    pub async fn insert_game(&self, snapshot: &GameSnapshot) -> Result<()> {
        let model = Self::snapshot_to_active(snapshot)?;
        Games::insert(model).exec(&self.db).await?;
        Ok(())
    }

    /// Overwrite the stored row with a newer snapshot.
    pub async fn update_game(&self, snapshot: &GameSnapshot) -> Result<()> {
        let model = Self::snapshot_to_active(snapshot)?;
        Games::update(model).exec(&self.db).await?;
        Ok(())
    }

    pub async fn delete_game(&self, id: Uuid) -> Result<()> {
        Games::delete_by_id(id.to_string()).exec(&self.db).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GameSnapshot>> {
        let model = Games::find_by_id(id.to_string()).one(&self.db).await?;
        model.map(Self::model_to_snapshot).transpose()
    }

    pub async fn find_by_room_code(&self, room_code: &str) -> Result<Option<GameSnapshot>> {
        let model = Games::find()
            .filter(games::Column::RoomCode.eq(room_code))
            .one(&self.db)
            .await?;
        model.map(Self::model_to_snapshot).transpose()
    }

    /// Ids of games whose winner is decided, for archival sweeps.
    pub async fn finished_game_ids(&self) -> Result<Vec<Uuid>> {
        let models = Games::find()
            .filter(games::Column::Phase.eq("finished"))
            .all(&self.db)
            .await?;
        models
            .into_iter()
            .map(|m| Ok(Uuid::parse_str(&m.id)?))
            .collect()
    }
}
