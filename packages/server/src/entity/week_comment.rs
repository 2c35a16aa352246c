use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "week_comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub week_id: i32,
    #[sea_orm(belongs_to, from = "week_id", to = "id")]
    pub week: HasOne<super::week::Entity>,

    pub author: String,
    #[sea_orm(column_type = "Text")]
    pub text: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
