//! 日广告花费实体（(workspace_id, date, source) 唯一）

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "daily_ad_spend")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub workspace_id: String,
    pub date: Date,
    /// 广告平台来源（facebook / tiktok / google）
    pub source: String,
    /// 广告账户原生币种的花费
    pub spend_native: f64,
    /// 换算为卖家本地币种的花费
    pub spend_local: f64,
    pub currency: Option<String>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
