use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Games::Id).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(Games::RoomCode)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Games::HostId).string().not_null())
                    .col(ColumnDef::new(Games::Phase).string().not_null())
                    .col(ColumnDef::new(Games::Players).json().not_null())
                    .col(ColumnDef::new(Games::CurrentLetters).string().not_null())
                    .col(ColumnDef::new(Games::CurrentPlayerId).string().null())
                    .col(
                        ColumnDef::new(Games::TimeLeft)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Games::MaxPlayers)
                            .integer()
                            .not_null()
                            .default(4),
                    )
                    .col(
                        ColumnDef::new(Games::RoundNumber)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Games::UsedWords).json().not_null())
                    .col(ColumnDef::new(Games::WinnerId).string().null())
                    .col(
                        ColumnDef::new(Games::Countdown)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Games::Version)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Games::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Games::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Create index on room_code for join-by-code lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_games_room_code")
                    .table(Games::Table)
                    .col(Games::RoomCode)
                    .to_owned(),
            )
            .await?;

        // Create index on phase for lobby listing and cleanup queries
        manager
            .create_index(
                Index::create()
                    .name("idx_games_phase")
                    .table(Games::Table)
                    .col(Games::Phase)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Games::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Games {
    Table,
    Id,
    RoomCode,
    HostId,
    Phase,
    Players,
    CurrentLetters,
    CurrentPlayerId,
    TimeLeft,
    MaxPlayers,
    RoundNumber,
    UsedWords,
    WinnerId,
    Countdown,
    Version,
    CreatedAt,
    UpdatedAt,
}
