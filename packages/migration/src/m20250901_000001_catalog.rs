use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----
#[derive(Iden)]
enum Game {
    Table,
    Id,
    Title,
    Description,
    ReleaseDate,
    ImageKey,
    StatusId,
}

#[derive(Iden)]
enum Tag {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Genre {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum GameTag {
    Table,
    GameId,
    TagId,
}

#[derive(Iden)]
enum GameGenre {
    Table,
    GameId,
    GenreId,
}

/// DRAFT; see `catalog::domain::status::GameStatus`.
const STATUS_DRAFT: i32 = 1;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // tag
        manager
            .create_table(
                Table::create()
                    .table(Tag::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tag::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Tag::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_tag_name")
                    .table(Tag::Table)
                    .col(Tag::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // genre
        manager
            .create_table(
                Table::create()
                    .table(Genre::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Genre::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Genre::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_genre_name")
                    .table(Genre::Table)
                    .col(Genre::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // game
        manager
            .create_table(
                Table::create()
                    .table(Game::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Game::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Game::Title).string().not_null())
                    .col(ColumnDef::new(Game::Description).text().not_null())
                    .col(ColumnDef::new(Game::ReleaseDate).date().not_null())
                    .col(ColumnDef::new(Game::ImageKey).string().null())
                    .col(
                        ColumnDef::new(Game::StatusId)
                            .integer()
                            .not_null()
                            .default(STATUS_DRAFT),
                    )
                    .to_owned(),
            )
            .await?;

        // (title, release_date) backs the duplicate pre-check; it is not unique on purpose,
        // uniqueness is per release year and enforced by the service.
        manager
            .create_index(
                Index::create()
                    .name("ix_game_title_release_date")
                    .table(Game::Table)
                    .col(Game::Title)
                    .col(Game::ReleaseDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_game_status_id")
                    .table(Game::Table)
                    .col(Game::StatusId)
                    .to_owned(),
            )
            .await?;

        // game_tag
        manager
            .create_table(
                Table::create()
                    .table(GameTag::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GameTag::GameId).big_integer().not_null())
                    .col(ColumnDef::new(GameTag::TagId).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_game_tag")
                            .col(GameTag::GameId)
                            .col(GameTag::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_tag_game_id")
                            .from(GameTag::Table, GameTag::GameId)
                            .to(Game::Table, Game::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_tag_tag_id")
                            .from(GameTag::Table, GameTag::TagId)
                            .to(Tag::Table, Tag::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_game_tag_tag_id")
                    .table(GameTag::Table)
                    .col(GameTag::TagId)
                    .to_owned(),
            )
            .await?;

        // game_genre
        manager
            .create_table(
                Table::create()
                    .table(GameGenre::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GameGenre::GameId).big_integer().not_null())
                    .col(ColumnDef::new(GameGenre::GenreId).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_game_genre")
                            .col(GameGenre::GameId)
                            .col(GameGenre::GenreId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_genre_game_id")
                            .from(GameGenre::Table, GameGenre::GameId)
                            .to(Game::Table, Game::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_genre_genre_id")
                            .from(GameGenre::Table, GameGenre::GenreId)
                            .to(Genre::Table, Genre::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_game_genre_genre_id")
                    .table(GameGenre::Table)
                    .col(GameGenre::GenreId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GameGenre::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GameTag::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Game::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Genre::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tag::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
