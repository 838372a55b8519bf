//! 像素扇出记录实体（每个 (pixel, event) 对一行，创建后不可变）

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "pixel_event")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub pixel_id: i64,
    pub event_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub payload: Option<String>,
    pub status: String,
    pub processed_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
