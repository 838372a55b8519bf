//! 日利润指标快照实体（(workspace_id, date) 唯一，重算走 upsert）

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "daily_metrics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub workspace_id: String,
    pub date: Date,
    pub spend_native: f64,
    pub spend_local: f64,
    /// 本次计算采用的币种换算率
    pub conversion_rate: f64,
    pub sales_count: i32,
    pub gross_revenue: f64,
    pub net_revenue: f64,
    pub gross_profit: f64,
    pub net_profit: f64,
    /// 花费为零时为空（而非 NaN / Infinity）
    pub roi: Option<f64>,
    pub roas: Option<f64>,
    /// 销量为零时为空
    pub cpa: Option<f64>,
    pub computed_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
