//! 订单与日销售汇总表迁移
//!
//! - processed_order: 从店铺平台同步的订单（存储就绪形态）
//! - daily_sales: 按 (workspace, date, source) 唯一的日销售汇总

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProcessedOrder::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProcessedOrder::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProcessedOrder::WorkspaceId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProcessedOrder::ExternalId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProcessedOrder::OrderNumber).string_len(64).null())
                    .col(
                        ColumnDef::new(ProcessedOrder::CreatedAtUtc)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProcessedOrder::LocalDay).date().not_null())
                    .col(
                        ColumnDef::new(ProcessedOrder::FinancialStatus)
                            .string_len(32)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ProcessedOrder::FulfillmentStatus)
                            .string_len(32)
                            .null(),
                    )
                    .col(ColumnDef::new(ProcessedOrder::Currency).string_len(8).not_null())
                    .col(ColumnDef::new(ProcessedOrder::TotalPrice).double().not_null())
                    .col(ColumnDef::new(ProcessedOrder::SubtotalPrice).double().not_null())
                    .col(
                        ColumnDef::new(ProcessedOrder::TotalDiscounts)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(ProcessedOrder::TotalItems)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ProcessedOrder::ProductNames).text().null())
                    .col(ColumnDef::new(ProcessedOrder::Skus).text().null())
                    .col(ColumnDef::new(ProcessedOrder::DiscountCodes).string_len(512).null())
                    .col(ColumnDef::new(ProcessedOrder::LandingSite).text().null())
                    .col(ColumnDef::new(ProcessedOrder::UtmSource).string_len(255).null())
                    .col(ColumnDef::new(ProcessedOrder::UtmMedium).string_len(255).null())
                    .col(ColumnDef::new(ProcessedOrder::UtmCampaign).string_len(255).null())
                    .col(ColumnDef::new(ProcessedOrder::UtmContent).string_len(255).null())
                    .col(ColumnDef::new(ProcessedOrder::UtmTerm).string_len(255).null())
                    .col(ColumnDef::new(ProcessedOrder::Fbclid).string_len(512).null())
                    .col(ColumnDef::new(ProcessedOrder::Gclid).string_len(512).null())
                    .col(ColumnDef::new(ProcessedOrder::Ttclid).string_len(512).null())
                    .col(ColumnDef::new(ProcessedOrder::Channel).string_len(32).not_null())
                    .col(
                        ColumnDef::new(ProcessedOrder::SyncedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 幂等 upsert 的自然键
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_processed_order_ws_external")
                    .table(ProcessedOrder::Table)
                    .col(ProcessedOrder::WorkspaceId)
                    .col(ProcessedOrder::ExternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_processed_order_ws_day")
                    .table(ProcessedOrder::Table)
                    .col(ProcessedOrder::WorkspaceId)
                    .col(ProcessedOrder::LocalDay)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DailySales::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailySales::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DailySales::WorkspaceId).string_len(64).not_null())
                    .col(ColumnDef::new(DailySales::Date).date().not_null())
                    .col(ColumnDef::new(DailySales::Source).string_len(32).not_null())
                    .col(
                        ColumnDef::new(DailySales::OrdersCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailySales::GrossRevenue)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(DailySales::TotalDiscounts)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(DailySales::NetRevenue)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(DailySales::AvgOrderValue)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(DailySales::UpdatedAt)
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
                    .name("idx_daily_sales_ws_date_source")
                    .table(DailySales::Table)
                    .col(DailySales::WorkspaceId)
                    .col(DailySales::Date)
                    .col(DailySales::Source)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailySales::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProcessedOrder::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ProcessedOrder {
    Table,
    Id,
    WorkspaceId,
    ExternalId,
    OrderNumber,
    CreatedAtUtc,
    LocalDay,
    FinancialStatus,
    FulfillmentStatus,
    Currency,
    TotalPrice,
    SubtotalPrice,
    TotalDiscounts,
    TotalItems,
    ProductNames,
    Skus,
    DiscountCodes,
    LandingSite,
    UtmSource,
    UtmMedium,
    UtmCampaign,
    UtmContent,
    UtmTerm,
    Fbclid,
    Gclid,
    Ttclid,
    Channel,
    SyncedAt,
}

#[derive(DeriveIden)]
enum DailySales {
    Table,
    Id,
    WorkspaceId,
    Date,
    Source,
    OrdersCount,
    GrossRevenue,
    TotalDiscounts,
    NetRevenue,
    AvgOrderValue,
    UpdatedAt,
}
