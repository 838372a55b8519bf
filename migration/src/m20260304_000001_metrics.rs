//! 日广告花费与日利润指标表迁移
//!
//! - daily_ad_spend: 按 (workspace, date, source) 唯一的日花费
//! - daily_metrics: 按 (workspace, date) 唯一的日利润快照

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DailyAdSpend::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyAdSpend::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DailyAdSpend::WorkspaceId).string_len(64).not_null())
                    .col(ColumnDef::new(DailyAdSpend::Date).date().not_null())
                    .col(ColumnDef::new(DailyAdSpend::Source).string_len(32).not_null())
                    .col(
                        ColumnDef::new(DailyAdSpend::SpendNative)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(DailyAdSpend::SpendLocal)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(DailyAdSpend::Currency).string_len(8).null())
                    .col(
                        ColumnDef::new(DailyAdSpend::UpdatedAt)
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
                    .name("idx_daily_ad_spend_ws_date_source")
                    .table(DailyAdSpend::Table)
                    .col(DailyAdSpend::WorkspaceId)
                    .col(DailyAdSpend::Date)
                    .col(DailyAdSpend::Source)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DailyMetrics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyMetrics::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DailyMetrics::WorkspaceId).string_len(64).not_null())
                    .col(ColumnDef::new(DailyMetrics::Date).date().not_null())
                    .col(
                        ColumnDef::new(DailyMetrics::SpendNative)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(DailyMetrics::SpendLocal)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(DailyMetrics::ConversionRate).double().not_null())
                    .col(
                        ColumnDef::new(DailyMetrics::SalesCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyMetrics::GrossRevenue)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(DailyMetrics::NetRevenue)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(DailyMetrics::GrossProfit).double().not_null())
                    .col(ColumnDef::new(DailyMetrics::NetProfit).double().not_null())
                    .col(ColumnDef::new(DailyMetrics::Roi).double().null())
                    .col(ColumnDef::new(DailyMetrics::Roas).double().null())
                    .col(ColumnDef::new(DailyMetrics::Cpa).double().null())
                    .col(
                        ColumnDef::new(DailyMetrics::ComputedAt)
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
                    .name("idx_daily_metrics_ws_date")
                    .table(DailyMetrics::Table)
                    .col(DailyMetrics::WorkspaceId)
                    .col(DailyMetrics::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyMetrics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DailyAdSpend::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DailyAdSpend {
    Table,
    Id,
    WorkspaceId,
    Date,
    Source,
    SpendNative,
    SpendLocal,
    Currency,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DailyMetrics {
    Table,
    Id,
    WorkspaceId,
    Date,
    SpendNative,
    SpendLocal,
    ConversionRate,
    SalesCount,
    GrossRevenue,
    NetRevenue,
    GrossProfit,
    NetProfit,
    Roi,
    Roas,
    Cpa,
    ComputedAt,
}
