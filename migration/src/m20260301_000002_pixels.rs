//! 像素配置表与像素事件表迁移
//!
//! - pixel: 工作区在广告平台注册的追踪像素
//! - pixel_event: 每次 (pixel, tracking_event) 扇出一行

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pixel::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pixel::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pixel::WorkspaceId).string_len(64).not_null())
                    .col(ColumnDef::new(Pixel::Platform).string_len(32).not_null())
                    .col(ColumnDef::new(Pixel::PixelId).string_len(128).not_null())
                    .col(ColumnDef::new(Pixel::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Pixel::AccessToken).text().null())
                    .col(ColumnDef::new(Pixel::TestEventCode).string_len(128).null())
                    .col(
                        ColumnDef::new(Pixel::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Pixel::EventsToday)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Pixel::CounterDay).date().null())
                    .col(ColumnDef::new(Pixel::LastEventAt).timestamp_with_time_zone().null())
                    .col(
                        ColumnDef::new(Pixel::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Pixel::UpdatedAt)
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
                    .name("idx_pixel_workspace")
                    .table(Pixel::Table)
                    .col(Pixel::WorkspaceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PixelEvent::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PixelEvent::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PixelEvent::PixelId).big_integer().not_null())
                    .col(
                        ColumnDef::new(PixelEvent::EventName)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PixelEvent::Payload).text().null())
                    .col(ColumnDef::new(PixelEvent::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(PixelEvent::ProcessedAt)
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
                    .name("idx_pixel_event_pixel")
                    .table(PixelEvent::Table)
                    .col(PixelEvent::PixelId)
                    .col(PixelEvent::ProcessedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PixelEvent::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pixel::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Pixel {
    Table,
    Id,
    WorkspaceId,
    Platform,
    PixelId,
    Name,
    AccessToken,
    TestEventCode,
    IsActive,
    EventsToday,
    CounterDay,
    LastEventAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PixelEvent {
    Table,
    Id,
    PixelId,
    EventName,
    Payload,
    Status,
    ProcessedAt,
}
