//! 追踪事件写入与统计

use chrono::{TimeZone, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::debug;

use migration::entities::tracking_event;

use super::{converters, retry, SeaOrmStorage};
use crate::errors::Result;
use crate::storage::models::{TrackingEventRecord, WorkspaceEventStats};
use crate::utils::timezone;

impl SeaOrmStorage {
    /// 写入一条追踪事件（只插入，永不更新）
    pub async fn insert_tracking_event(&self, record: &TrackingEventRecord) -> Result<()> {
        let model = converters::tracking_event_to_active_model(record);

        let db = self.get_db();
        retry::with_retry("insert_tracking_event", self.retry_config(), || async {
            tracking_event::Entity::insert(model.clone()).exec(db).await
        })
        .await?;

        debug!(
            "Tracking event {} persisted (workspace: {:?})",
            record.id, record.workspace_id
        );
        Ok(())
    }

    /// 工作区事件统计：总量、今日量（卖家时区的今天）、最近事件时间
    pub async fn workspace_event_stats(
        &self,
        workspace_id: &str,
        seller_timezone: &str,
    ) -> Result<WorkspaceEventStats> {
        let db = self.get_db();

        let total_events = tracking_event::Entity::find()
            .filter(tracking_event::Column::WorkspaceId.eq(workspace_id))
            .count(db)
            .await?;

        // "今天"按卖家时区起算，再换回 UTC 过滤
        let tz = timezone::resolve_timezone(seller_timezone)?;
        let today = Utc::now().with_timezone(&tz).date_naive();
        let midnight = today.and_hms_opt(0, 0, 0).unwrap_or_default();
        let day_start_utc = tz
            .from_local_datetime(&midnight)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| midnight.and_utc());

        let events_today = tracking_event::Entity::find()
            .filter(tracking_event::Column::WorkspaceId.eq(workspace_id))
            .filter(tracking_event::Column::CreatedAt.gte(day_start_utc))
            .count(db)
            .await?;

        let last_event_at = tracking_event::Entity::find()
            .filter(tracking_event::Column::WorkspaceId.eq(workspace_id))
            .order_by_desc(tracking_event::Column::CreatedAt)
            .limit(1)
            .one(db)
            .await?
            .map(|m| m.created_at);

        Ok(WorkspaceEventStats {
            total_events,
            events_today,
            last_event_at,
        })
    }
}
