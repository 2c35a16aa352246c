use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "weeks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub start_date: Date,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// JSON array of resource links, see `common::codec`.
    #[sea_orm(column_type = "Text")]
    pub links: String,

    #[sea_orm(has_many)]
    pub comments: HasMany<super::week_comment::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
