//! 日花费 / 日指标行的读写

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::debug;

use migration::entities::{daily_ad_spend, daily_metrics, daily_sales};

use super::{converters, retry, SeaOrmStorage};
use crate::errors::Result;
use crate::metrics::MetricsSource;
use crate::storage::models::{DailyAdSpendRow, DailyMetricsRecord, DailySalesRollup};

#[async_trait]
impl MetricsSource for SeaOrmStorage {
    async fn spend_for_day(
        &self,
        workspace_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<DailyAdSpendRow>> {
        let rows = daily_ad_spend::Entity::find()
            .filter(daily_ad_spend::Column::WorkspaceId.eq(workspace_id))
            .filter(daily_ad_spend::Column::Date.eq(date))
            .all(self.get_db())
            .await?;

        Ok(rows.into_iter().map(converters::model_to_ad_spend_row).collect())
    }

    async fn sales_for_day(
        &self,
        workspace_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<DailySalesRollup>> {
        let rows = daily_sales::Entity::find()
            .filter(daily_sales::Column::WorkspaceId.eq(workspace_id))
            .filter(daily_sales::Column::Date.eq(date))
            .all(self.get_db())
            .await?;

        Ok(rows.into_iter().map(converters::model_to_sales_rollup).collect())
    }
}

impl SeaOrmStorage {
    /// 按 (workspace, date) upsert 日指标快照
    pub async fn upsert_daily_metrics(&self, record: &DailyMetricsRecord) -> Result<()> {
        let db = self.get_db();
        let model = converters::daily_metrics_to_active_model(record, Utc::now());

        let conflict = OnConflict::columns([
            daily_metrics::Column::WorkspaceId,
            daily_metrics::Column::Date,
        ])
        .update_columns([
            daily_metrics::Column::SpendNative,
            daily_metrics::Column::SpendLocal,
            daily_metrics::Column::ConversionRate,
            daily_metrics::Column::SalesCount,
            daily_metrics::Column::GrossRevenue,
            daily_metrics::Column::NetRevenue,
            daily_metrics::Column::GrossProfit,
            daily_metrics::Column::NetProfit,
            daily_metrics::Column::Roi,
            daily_metrics::Column::Roas,
            daily_metrics::Column::Cpa,
            daily_metrics::Column::ComputedAt,
        ])
        .to_owned();

        retry::with_retry("upsert_daily_metrics", self.retry_config(), || async {
            daily_metrics::Entity::insert(model.clone())
                .on_conflict(conflict.clone())
                .exec(db)
                .await
        })
        .await?;

        debug!(
            "Daily metrics upserted: {} / {}",
            record.workspace_id, record.date
        );
        Ok(())
    }

    /// 按 (workspace, date, source) upsert 日广告花费
    ///
    /// 广告平台侧的同步器（外部协作方）通过这个入口写行。
    pub async fn upsert_daily_ad_spend(&self, row: &DailyAdSpendRow) -> Result<()> {
        let db = self.get_db();
        let model = converters::daily_ad_spend_to_active_model(row, Utc::now());

        let conflict = OnConflict::columns([
            daily_ad_spend::Column::WorkspaceId,
            daily_ad_spend::Column::Date,
            daily_ad_spend::Column::Source,
        ])
        .update_columns([
            daily_ad_spend::Column::SpendNative,
            daily_ad_spend::Column::SpendLocal,
            daily_ad_spend::Column::Currency,
            daily_ad_spend::Column::UpdatedAt,
        ])
        .to_owned();

        retry::with_retry("upsert_daily_ad_spend", self.retry_config(), || async {
            daily_ad_spend::Entity::insert(model.clone())
                .on_conflict(conflict.clone())
                .exec(db)
                .await
        })
        .await?;

        Ok(())
    }

    /// 查询日期范围内的日指标行（日期升序）
    pub async fn find_daily_metrics(
        &self,
        workspace_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        limit: Option<u64>,
    ) -> Result<Vec<daily_metrics::Model>> {
        let mut query = daily_metrics::Entity::find()
            .filter(daily_metrics::Column::WorkspaceId.eq(workspace_id));

        if let Some(start) = start_date {
            query = query.filter(daily_metrics::Column::Date.gte(start));
        }
        if let Some(end) = end_date {
            query = query.filter(daily_metrics::Column::Date.lte(end));
        }

        let limit = limit.unwrap_or(90).clamp(1, 366);
        let rows = query
            .order_by_asc(daily_metrics::Column::Date)
            .limit(limit)
            .all(self.get_db())
            .await?;

        Ok(rows)
    }
}
