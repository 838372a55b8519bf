//! 日利润指标计算
//!
//! 两种模式产出同一 DailyMetrics 形态：
//! - provided-totals：调用方直接给总数
//! - recompute：从当日 DailyAdSpend 与 DailySales 行汇总重算
//!
//! 比率全部空值安全：分母为零时为 None（JSON null），绝不产出
//! NaN / Infinity。两种模式都按 (workspace, date) upsert，可重复
//! 调用。

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::errors::Result;
use crate::storage::models::{DailyAdSpendRow, DailyMetricsRecord, DailySalesRollup};

/// provided-totals 模式的输入
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvidedTotals {
    #[serde(default)]
    pub spend_native: f64,
    /// 缺省时按换算率从 native 推出
    pub spend_local: Option<f64>,
    /// 缺省时用配置的默认换算率
    pub conversion_rate: Option<f64>,
    #[serde(default)]
    pub sales_count: i32,
    #[serde(default)]
    pub gross_revenue: f64,
    /// 缺省时等于 gross
    pub net_revenue: Option<f64>,
}

/// recompute 模式的数据来源接缝
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn spend_for_day(
        &self,
        workspace_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<DailyAdSpendRow>>;

    async fn sales_for_day(
        &self,
        workspace_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<DailySalesRollup>>;
}

/// 指标聚合器
pub struct MetricsAggregator {
    default_conversion_rate: f64,
}

impl MetricsAggregator {
    pub fn new(default_conversion_rate: f64) -> Self {
        Self {
            default_conversion_rate,
        }
    }

    /// provided-totals 模式
    pub fn from_provided(
        &self,
        workspace_id: &str,
        date: NaiveDate,
        totals: ProvidedTotals,
    ) -> DailyMetricsRecord {
        let conversion_rate = totals
            .conversion_rate
            .unwrap_or(self.default_conversion_rate);
        let spend_local = totals
            .spend_local
            .unwrap_or(totals.spend_native * conversion_rate);
        let net_revenue = totals.net_revenue.unwrap_or(totals.gross_revenue);

        self.derive(
            workspace_id,
            date,
            totals.spend_native,
            spend_local,
            conversion_rate,
            totals.sales_count,
            totals.gross_revenue,
            net_revenue,
        )
    }

    /// recompute 模式：从当日花费与销售行汇总重算
    ///
    /// 换算率未提供时从两币种花费之比推出；原生花费为零时用
    /// 配置的兜底值，避免除零。
    pub async fn recompute(
        &self,
        workspace_id: &str,
        date: NaiveDate,
        conversion_rate: Option<f64>,
        source: &dyn MetricsSource,
    ) -> Result<DailyMetricsRecord> {
        let spend_rows = source.spend_for_day(workspace_id, date).await?;
        let sales_rows = source.sales_for_day(workspace_id, date).await?;

        let spend_native: f64 = spend_rows.iter().map(|r| r.spend_native).sum();
        let spend_local: f64 = spend_rows.iter().map(|r| r.spend_local).sum();

        let sales_count: i32 = sales_rows.iter().map(|r| r.orders_count).sum();
        let gross_revenue: f64 = sales_rows.iter().map(|r| r.gross_revenue).sum();
        let net_revenue: f64 = sales_rows.iter().map(|r| r.net_revenue).sum();

        let effective_rate = conversion_rate.unwrap_or(if spend_native > 0.0 {
            spend_local / spend_native
        } else {
            self.default_conversion_rate
        });

        debug!(
            "Metrics recompute for {} / {}: {} spend rows, {} sales rows, rate {}",
            workspace_id,
            date,
            spend_rows.len(),
            sales_rows.len(),
            effective_rate
        );

        Ok(self.derive(
            workspace_id,
            date,
            spend_native,
            spend_local,
            effective_rate,
            sales_count,
            gross_revenue,
            net_revenue,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn derive(
        &self,
        workspace_id: &str,
        date: NaiveDate,
        spend_native: f64,
        spend_local: f64,
        conversion_rate: f64,
        sales_count: i32,
        gross_revenue: f64,
        net_revenue: f64,
    ) -> DailyMetricsRecord {
        let gross_profit = gross_revenue - spend_local;
        let net_profit = net_revenue - spend_local;

        let roi = if spend_local > 0.0 {
            Some(net_profit / spend_local * 100.0)
        } else {
            None
        };
        let roas = if spend_local > 0.0 {
            Some(gross_revenue / spend_local)
        } else {
            None
        };
        let cpa = if sales_count > 0 {
            Some(spend_local / sales_count as f64)
        } else {
            None
        };

        DailyMetricsRecord {
            workspace_id: workspace_id.to_string(),
            date,
            spend_native,
            spend_local,
            conversion_rate,
            sales_count,
            gross_revenue,
            net_revenue,
            gross_profit,
            net_profit,
            roi,
            roas,
            cpa,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_RATE: f64 = 3.67;

    fn aggregator() -> MetricsAggregator {
        MetricsAggregator::new(DEFAULT_RATE)
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
    }

    struct FixedSource {
        spend: Vec<DailyAdSpendRow>,
        sales: Vec<DailySalesRollup>,
    }

    #[async_trait]
    impl MetricsSource for FixedSource {
        async fn spend_for_day(
            &self,
            _workspace_id: &str,
            _date: NaiveDate,
        ) -> Result<Vec<DailyAdSpendRow>> {
            Ok(self.spend.clone())
        }

        async fn sales_for_day(
            &self,
            _workspace_id: &str,
            _date: NaiveDate,
        ) -> Result<Vec<DailySalesRollup>> {
            Ok(self.sales.clone())
        }
    }

    fn spend_row(native: f64, local: f64) -> DailyAdSpendRow {
        DailyAdSpendRow {
            workspace_id: "W1".to_string(),
            date: day(),
            source: "facebook".to_string(),
            spend_native: native,
            spend_local: local,
            currency: Some("USD".to_string()),
        }
    }

    fn sales_row(orders: i32, gross: f64, net: f64) -> DailySalesRollup {
        DailySalesRollup {
            workspace_id: "W1".to_string(),
            date: day(),
            source: "shopify".to_string(),
            orders_count: orders,
            gross_revenue: gross,
            total_discounts: gross - net,
            net_revenue: net,
            avg_order_value: if orders > 0 { gross / orders as f64 } else { 0.0 },
        }
    }

    #[test]
    fn test_provided_totals_basic() {
        let metrics = aggregator().from_provided(
            "W1",
            day(),
            ProvidedTotals {
                spend_native: 100.0,
                spend_local: Some(367.0),
                conversion_rate: Some(3.67),
                sales_count: 10,
                gross_revenue: 1000.0,
                net_revenue: Some(900.0),
            },
        );

        assert_eq!(metrics.gross_profit, 1000.0 - 367.0);
        assert_eq!(metrics.net_profit, 900.0 - 367.0);
        assert!((metrics.roi.unwrap() - (533.0 / 367.0 * 100.0)).abs() < 1e-9);
        assert!((metrics.roas.unwrap() - (1000.0 / 367.0)).abs() < 1e-9);
        assert!((metrics.cpa.unwrap() - 36.7).abs() < 1e-9);
    }

    #[test]
    fn test_provided_totals_defaults_rate_and_local_spend() {
        let metrics = aggregator().from_provided(
            "W1",
            day(),
            ProvidedTotals {
                spend_native: 100.0,
                spend_local: None,
                conversion_rate: None,
                sales_count: 5,
                gross_revenue: 2000.0,
                net_revenue: None,
            },
        );

        assert_eq!(metrics.conversion_rate, DEFAULT_RATE);
        assert!((metrics.spend_local - 367.0).abs() < 1e-9);
        assert_eq!(metrics.net_revenue, 2000.0);
    }

    #[test]
    fn test_zero_spend_yields_null_ratios() {
        let metrics = aggregator().from_provided(
            "W1",
            day(),
            ProvidedTotals {
                spend_native: 0.0,
                spend_local: Some(0.0),
                conversion_rate: None,
                sales_count: 3,
                gross_revenue: 500.0,
                net_revenue: None,
            },
        );

        assert_eq!(metrics.roi, None);
        assert_eq!(metrics.roas, None);
        assert!(metrics.cpa.is_some());
    }

    #[test]
    fn test_zero_sales_yields_null_cpa() {
        let metrics = aggregator().from_provided(
            "W1",
            day(),
            ProvidedTotals {
                spend_native: 50.0,
                spend_local: Some(100.0),
                conversion_rate: None,
                sales_count: 0,
                gross_revenue: 0.0,
                net_revenue: None,
            },
        );

        assert_eq!(metrics.cpa, None);
        assert!(metrics.roi.is_some());
    }

    #[tokio::test]
    async fn test_recompute_sums_rows_and_derives_rate() {
        let source = FixedSource {
            spend: vec![spend_row(50.0, 150.0), spend_row(50.0, 217.0)],
            sales: vec![sales_row(4, 800.0, 760.0), sales_row(6, 1200.0, 1100.0)],
        };

        let metrics = aggregator()
            .recompute("W1", day(), None, &source)
            .await
            .unwrap();

        assert_eq!(metrics.spend_native, 100.0);
        assert_eq!(metrics.spend_local, 367.0);
        assert!((metrics.conversion_rate - 3.67).abs() < 1e-9);
        assert_eq!(metrics.sales_count, 10);
        assert_eq!(metrics.gross_revenue, 2000.0);
        assert_eq!(metrics.net_revenue, 1860.0);
        assert!((metrics.cpa.unwrap() - 36.7).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_recompute_rate_falls_back_when_native_zero() {
        let source = FixedSource {
            spend: vec![],
            sales: vec![sales_row(2, 300.0, 300.0)],
        };

        let metrics = aggregator()
            .recompute("W1", day(), None, &source)
            .await
            .unwrap();

        assert_eq!(metrics.conversion_rate, DEFAULT_RATE);
        assert_eq!(metrics.roi, None);
        assert_eq!(metrics.roas, None);
    }

    #[tokio::test]
    async fn test_recompute_is_deterministic() {
        let source = FixedSource {
            spend: vec![spend_row(10.0, 36.7)],
            sales: vec![sales_row(1, 100.0, 95.0)],
        };

        let agg = aggregator();
        let first = agg.recompute("W1", day(), None, &source).await.unwrap();
        let second = agg.recompute("W1", day(), None, &source).await.unwrap();

        assert_eq!(first.gross_profit, second.gross_profit);
        assert_eq!(first.roi, second.roi);
        assert_eq!(first.cpa, second.cpa);
    }
}
