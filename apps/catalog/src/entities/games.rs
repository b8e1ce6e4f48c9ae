use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::Date;

/// Publication status, persisted as `game.status_id`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    #[sea_orm(num_value = 1)]
    Draft,
    #[sea_orm(num_value = 2)]
    Pending,
    #[sea_orm(num_value = 3)]
    Publish,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "game")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_name = "release_date")]
    pub release_date: Date,
    #[sea_orm(column_name = "image_key")]
    pub image_key: Option<String>,
    #[sea_orm(column_name = "status_id")]
    pub status: GameStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::game_tags::Entity")]
    GameTags,
    #[sea_orm(has_many = "super::game_genres::Entity")]
    GameGenres,
}

impl Related<super::game_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GameTags.def()
    }
}

impl Related<super::game_genres::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GameGenres.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
