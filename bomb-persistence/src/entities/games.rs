use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "games")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub room_code: String,
    pub host_id: String,
    pub phase: String,
    pub players: Json,
    pub current_letters: String,
    pub current_player_id: Option<String>,
    pub time_left: i32,
    pub max_players: i32,
    pub round_number: i32,
    pub used_words: Json,
    pub winner_id: Option<String>,
    pub countdown: i32,
    pub version: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
