//! Webhook 订阅与投递日志表迁移
//!
//! - webhook_config: 工作区的外部 HTTP 订阅端点
//! - webhook_log: 每次投递尝试一行，只追加

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WebhookConfig::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WebhookConfig::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WebhookConfig::WorkspaceId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(WebhookConfig::Url).text().not_null())
                    .col(ColumnDef::new(WebhookConfig::Secret).string_len(255).null())
                    .col(ColumnDef::new(WebhookConfig::Events).text().not_null())
                    .col(
                        ColumnDef::new(WebhookConfig::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(WebhookConfig::LastTriggeredAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WebhookConfig::FailureCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(WebhookConfig::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WebhookConfig::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_webhook_config_workspace")
                    .table(WebhookConfig::Table)
                    .col(WebhookConfig::WorkspaceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WebhookLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WebhookLog::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WebhookLog::WebhookId).big_integer().not_null())
                    .col(ColumnDef::new(WebhookLog::EventType).string_len(128).not_null())
                    .col(ColumnDef::new(WebhookLog::Payload).text().null())
                    .col(ColumnDef::new(WebhookLog::ResponseCode).integer().null())
                    .col(ColumnDef::new(WebhookLog::ResponseBody).text().null())
                    .col(ColumnDef::new(WebhookLog::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(WebhookLog::AttemptCount)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(WebhookLog::ErrorMessage).text().null())
                    .col(
                        ColumnDef::new(WebhookLog::ProcessedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_webhook_log_webhook")
                    .table(WebhookLog::Table)
                    .col(WebhookLog::WebhookId)
                    .col(WebhookLog::ProcessedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WebhookLog::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WebhookConfig::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum WebhookConfig {
    Table,
    Id,
    WorkspaceId,
    Url,
    Secret,
    Events,
    IsActive,
    LastTriggeredAt,
    FailureCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum WebhookLog {
    Table,
    Id,
    WebhookId,
    EventType,
    Payload,
    ResponseCode,
    ResponseBody,
    Status,
    AttemptCount,
    ErrorMessage,
    ProcessedAt,
}
