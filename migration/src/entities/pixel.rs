//! 广告平台像素配置实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pixel")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub workspace_id: String,
    /// 平台标识（facebook / tiktok / google）
    pub platform: String,
    /// 平台分配的像素 ID（格式按平台校验）
    pub pixel_id: String,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub access_token: Option<String>,
    pub test_event_code: Option<String>,
    pub is_active: bool,
    pub events_today: i64,
    /// events_today 计数所属的日历日，用于跨日归零
    pub counter_day: Option<Date>,
    pub last_event_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
