//! 订单同步器
//!
//! 按页拉取日期范围内的全部订单，逐单处理（归因 + 时区分桶）并
//! 幂等 upsert；单个订单失败只计数，不中断批次。全部 upsert 完成
//! 后按本地日归组，写日销售汇总，并用同一批内存中的处理结果组装
//! 返回给调用方的同步报告——保证报告与落库内容一致，不回查存储。

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{error, info, warn};

use super::client::OrderPageSource;
use crate::attribution::Channel;
use crate::errors::Result;
use crate::storage::models::{DailySalesRollup, ProcessedOrderRecord};

/// upsert 结果：新建还是覆盖
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// 订单落库的接缝：同步器只依赖这个 trait，存储实现和测试
/// mock 都在它后面
#[async_trait]
pub trait OrderSink: Send + Sync {
    /// 按 (workspace, external_id) upsert 订单，可变字段以新值覆盖
    async fn upsert_order(&self, order: &ProcessedOrderRecord) -> Result<UpsertOutcome>;

    /// 按 (workspace, date, source) upsert 日销售汇总
    async fn upsert_daily_sales(&self, rollup: &DailySalesRollup) -> Result<()>;
}

/// 渠道分布
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ChannelBreakdown {
    pub facebook: usize,
    pub organic: usize,
    pub other: usize,
}

impl ChannelBreakdown {
    fn count(&mut self, channel: Channel) {
        match channel {
            Channel::Facebook => self.facebook += 1,
            Channel::Organic => self.organic += 1,
            Channel::Other => self.other += 1,
        }
    }
}

/// 按广告系列聚合的订单数与收入
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct CampaignStats {
    pub orders: usize,
    pub revenue: f64,
}

/// 同步结果汇总，返回给调用方展示
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub total_orders: usize,
    pub orders_created: usize,
    pub orders_updated: usize,
    pub orders_failed: usize,
    pub total_revenue: f64,
    pub breakdown: ChannelBreakdown,
    pub sales_by_campaign: HashMap<String, CampaignStats>,
    pub daily_summaries: Vec<DailySalesRollup>,
}

/// 订单同步器
pub struct OrderSynchronizer {
    seller_timezone: String,
}

impl OrderSynchronizer {
    pub fn new(seller_timezone: impl Into<String>) -> Self {
        Self {
            seller_timezone: seller_timezone.into(),
        }
    }

    /// 同步一个日期范围内的订单
    ///
    /// 页序列由调用方构造（含凭证与范围）；这里只负责
    /// 处理、落库和聚合。
    pub async fn sync(
        &self,
        workspace_id: &str,
        pages: &mut dyn OrderPageSource,
        sink: &dyn OrderSink,
    ) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        let mut persisted: Vec<ProcessedOrderRecord> = Vec::new();

        while let Some(orders) = pages.next_page().await? {
            info!(
                "Sync: fetched page with {} orders (workspace: {})",
                orders.len(),
                workspace_id
            );
            report.total_orders += orders.len();

            for raw in &orders {
                let record = match raw.process(workspace_id, &self.seller_timezone) {
                    Ok(record) => record,
                    Err(e) => {
                        report.orders_failed += 1;
                        warn!("Sync: order {} failed processing: {}", raw.id, e);
                        continue;
                    }
                };

                match sink.upsert_order(&record).await {
                    Ok(UpsertOutcome::Created) => report.orders_created += 1,
                    Ok(UpsertOutcome::Updated) => report.orders_updated += 1,
                    Err(e) => {
                        report.orders_failed += 1;
                        error!("Sync: order {} failed to upsert: {}", record.external_id, e);
                        continue;
                    }
                }

                persisted.push(record);
            }
        }

        // 聚合只基于实际落库的订单集
        for record in &persisted {
            report.total_revenue += record.total_price;
            report.breakdown.count(record.channel);

            if let Some(campaign) = record.attribution.utm_campaign.as_deref() {
                let stats = report
                    .sales_by_campaign
                    .entry(campaign.to_string())
                    .or_default();
                stats.orders += 1;
                stats.revenue += record.total_price;
            }
        }

        report.daily_summaries = build_daily_rollups(workspace_id, &persisted);
        for rollup in &report.daily_summaries {
            if let Err(e) = sink.upsert_daily_sales(rollup).await {
                // 汇总失败不吞掉订单结果，计失败数并继续其余天
                report.orders_failed += 1;
                error!(
                    "Sync: daily sales rollup for {} failed to upsert: {}",
                    rollup.date, e
                );
            }
        }

        info!(
            "Sync completed: {} fetched, {} created, {} updated, {} failed (workspace: {})",
            report.total_orders,
            report.orders_created,
            report.orders_updated,
            report.orders_failed,
            workspace_id
        );

        Ok(report)
    }
}

/// 将已落库订单按本地日归组为日销售汇总
fn build_daily_rollups(
    workspace_id: &str,
    orders: &[ProcessedOrderRecord],
) -> Vec<DailySalesRollup> {
    let mut by_day: HashMap<NaiveDate, Vec<&ProcessedOrderRecord>> = HashMap::new();
    for order in orders {
        by_day.entry(order.local_day).or_default().push(order);
    }

    let mut rollups: Vec<DailySalesRollup> = by_day
        .into_iter()
        .map(|(date, day_orders)| {
            let orders_count = day_orders.len() as i32;
            let gross_revenue: f64 = day_orders.iter().map(|o| o.total_price).sum();
            let total_discounts: f64 = day_orders.iter().map(|o| o.total_discounts).sum();
            let net_revenue = gross_revenue - total_discounts;
            let avg_order_value = if orders_count > 0 {
                gross_revenue / orders_count as f64
            } else {
                0.0
            };

            DailySalesRollup {
                workspace_id: workspace_id.to_string(),
                date,
                source: "shopify".to_string(),
                orders_count,
                gross_revenue,
                total_discounts,
                net_revenue,
                avg_order_value,
            }
        })
        .collect();

    rollups.sort_by_key(|r| r.date);
    rollups
}
