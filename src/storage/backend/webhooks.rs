//! 扇出侧的存储实现：配置查询与投递记账

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, EntityTrait, ExprTrait, QueryFilter};
use tracing::debug;

use migration::entities::{pixel, pixel_event, webhook_config, webhook_log};

use super::{converters, retry, SeaOrmStorage};
use crate::dispatch::DispatchStore;
use crate::errors::{CodpulseError, Result};
use crate::storage::models::{PixelRecord, WebhookDeliveryLog, WebhookEndpoint};

#[async_trait]
impl DispatchStore for SeaOrmStorage {
    async fn webhooks_for_workspace(&self, workspace_id: &str) -> Result<Vec<WebhookEndpoint>> {
        let models = webhook_config::Entity::find()
            .filter(webhook_config::Column::WorkspaceId.eq(workspace_id))
            .filter(webhook_config::Column::IsActive.eq(true))
            .all(self.get_db())
            .await?;

        Ok(models
            .into_iter()
            .map(converters::model_to_webhook_endpoint)
            .collect())
    }

    async fn pixels_for_workspace(&self, workspace_id: &str) -> Result<Vec<PixelRecord>> {
        let models = pixel::Entity::find()
            .filter(pixel::Column::WorkspaceId.eq(workspace_id))
            .filter(pixel::Column::IsActive.eq(true))
            .all(self.get_db())
            .await?;

        Ok(models
            .into_iter()
            .filter_map(converters::model_to_pixel_record)
            .collect())
    }

    async fn record_webhook_log(&self, log: &WebhookDeliveryLog) -> Result<()> {
        let db = self.get_db();
        let model = webhook_log::ActiveModel {
            webhook_id: Set(log.webhook_id),
            event_type: Set(log.event_type.clone()),
            payload: Set(log.payload.clone()),
            response_code: Set(log.response_code),
            response_body: Set(log.response_body.clone()),
            status: Set(log.status.as_ref().to_string()),
            attempt_count: Set(log.attempt_count),
            error_message: Set(log.error_message.clone()),
            processed_at: Set(Utc::now()),
            ..Default::default()
        };

        retry::with_retry("record_webhook_log", self.retry_config(), || async {
            webhook_log::Entity::insert(model.clone()).exec(db).await
        })
        .await?;

        Ok(())
    }

    async fn mark_webhook_success(&self, webhook_id: i64) -> Result<()> {
        let db = self.get_db();
        let now = Utc::now();

        retry::with_retry("mark_webhook_success", self.retry_config(), || async {
            webhook_config::Entity::update_many()
                .col_expr(
                    webhook_config::Column::FailureCount,
                    SimpleExpr::Value(0i32.into()),
                )
                .col_expr(
                    webhook_config::Column::LastTriggeredAt,
                    SimpleExpr::Value(now.into()),
                )
                .col_expr(
                    webhook_config::Column::UpdatedAt,
                    SimpleExpr::Value(now.into()),
                )
                .filter(webhook_config::Column::Id.eq(webhook_id))
                .exec(db)
                .await
        })
        .await?;

        Ok(())
    }

    async fn mark_webhook_failure(&self, webhook_id: i64) -> Result<()> {
        let db = self.get_db();
        let now = Utc::now();

        // 原子自增，避免读改写竞态
        retry::with_retry("mark_webhook_failure", self.retry_config(), || async {
            webhook_config::Entity::update_many()
                .col_expr(
                    webhook_config::Column::FailureCount,
                    Expr::col(webhook_config::Column::FailureCount).add(1),
                )
                .col_expr(
                    webhook_config::Column::LastTriggeredAt,
                    SimpleExpr::Value(now.into()),
                )
                .col_expr(
                    webhook_config::Column::UpdatedAt,
                    SimpleExpr::Value(now.into()),
                )
                .filter(webhook_config::Column::Id.eq(webhook_id))
                .exec(db)
                .await
        })
        .await?;

        Ok(())
    }

    async fn record_pixel_event(
        &self,
        pixel_id: i64,
        event_name: &str,
        payload: Option<&str>,
    ) -> Result<()> {
        let db = self.get_db();
        // 本地扇出记录，创建即成功态（不代表外部平台确认收到）
        let model = pixel_event::ActiveModel {
            pixel_id: Set(pixel_id),
            event_name: Set(event_name.to_string()),
            payload: Set(payload.map(String::from)),
            status: Set("success".to_string()),
            processed_at: Set(Utc::now()),
            ..Default::default()
        };

        retry::with_retry("record_pixel_event", self.retry_config(), || async {
            pixel_event::Entity::insert(model.clone()).exec(db).await
        })
        .await?;

        Ok(())
    }

    async fn bump_pixel_counter(&self, pixel_id: i64, day: NaiveDate) -> Result<()> {
        let db = self.get_db();
        let now = Utc::now();

        let existing = pixel::Entity::find_by_id(pixel_id)
            .one(db)
            .await?
            .ok_or_else(|| CodpulseError::not_found(format!("Pixel {} not found", pixel_id)))?;

        let mut active: pixel::ActiveModel = existing.clone().into();
        if existing.counter_day == Some(day) {
            active.events_today = Set(existing.events_today + 1);
        } else {
            // 跨日：计数从 1 重新开始
            active.events_today = Set(1);
            active.counter_day = Set(Some(day));
        }
        active.last_event_at = Set(Some(now));
        active.updated_at = Set(now);

        retry::with_retry("bump_pixel_counter", self.retry_config(), || async {
            pixel::Entity::update(active.clone()).exec(db).await
        })
        .await?;

        debug!("Pixel {} counter bumped (day: {})", pixel_id, day);
        Ok(())
    }
}
