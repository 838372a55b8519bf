//! 追踪事件表迁移
//!
//! tracking_event 是不可变事件记录表：每个客户端信标一行，
//! 只插入不更新。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TrackingEvent::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TrackingEvent::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TrackingEvent::WorkspaceId).string_len(64).null())
                    .col(
                        ColumnDef::new(TrackingEvent::VisitorId)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TrackingEvent::SessionId).string_len(128).null())
                    .col(
                        ColumnDef::new(TrackingEvent::EventName)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TrackingEvent::Payload).text().null())
                    .col(ColumnDef::new(TrackingEvent::UtmSource).string_len(255).null())
                    .col(ColumnDef::new(TrackingEvent::UtmMedium).string_len(255).null())
                    .col(ColumnDef::new(TrackingEvent::UtmCampaign).string_len(255).null())
                    .col(ColumnDef::new(TrackingEvent::UtmContent).string_len(255).null())
                    .col(ColumnDef::new(TrackingEvent::UtmTerm).string_len(255).null())
                    .col(ColumnDef::new(TrackingEvent::Fbclid).string_len(512).null())
                    .col(ColumnDef::new(TrackingEvent::Gclid).string_len(512).null())
                    .col(ColumnDef::new(TrackingEvent::Ttclid).string_len(512).null())
                    .col(ColumnDef::new(TrackingEvent::PageUrl).text().null())
                    .col(ColumnDef::new(TrackingEvent::PageTitle).string_len(512).null())
                    .col(ColumnDef::new(TrackingEvent::Referrer).text().null())
                    .col(ColumnDef::new(TrackingEvent::IpAddress).string_len(64).null())
                    .col(ColumnDef::new(TrackingEvent::UserAgent).string_len(512).null())
                    .col(ColumnDef::new(TrackingEvent::OrderId).string_len(128).null())
                    .col(ColumnDef::new(TrackingEvent::OrderValue).double().null())
                    .col(
                        ColumnDef::new(TrackingEvent::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 索引：workspace + created_at（统计查询路径）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tracking_event_ws_created")
                    .table(TrackingEvent::Table)
                    .col(TrackingEvent::WorkspaceId)
                    .col(TrackingEvent::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // 索引：事件名（按类型过滤）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tracking_event_name")
                    .table(TrackingEvent::Table)
                    .col(TrackingEvent::EventName)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TrackingEvent::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TrackingEvent {
    Table,
    Id,
    WorkspaceId,
    VisitorId,
    SessionId,
    EventName,
    Payload,
    UtmSource,
    UtmMedium,
    UtmCampaign,
    UtmContent,
    UtmTerm,
    Fbclid,
    Gclid,
    Ttclid,
    PageUrl,
    PageTitle,
    Referrer,
    IpAddress,
    UserAgent,
    OrderId,
    OrderValue,
    CreatedAt,
}
