//! HTTP 端到端测试（SQLite 临时库）
//!
//! 覆盖：追踪入库与统计、错误机器码、指标两种模式的幂等 upsert。

use std::sync::Arc;
use std::time::Duration;

use actix_web::{test, web, App};
use serde_json::{json, Value};
use tempfile::TempDir;

use codpulse::api::services::{metrics_routes, tracking_routes};
use codpulse::config::StaticConfig;
use codpulse::dispatch::dispatcher::HttpTransport;
use codpulse::dispatch::{DispatchPool, DispatchStore, EventDispatcher};
use codpulse::metrics::MetricsAggregator;
use codpulse::storage::SeaOrmStorage;

/// 临时 SQLite 库 + 迁移；TempDir 活到测试结束
async fn test_storage() -> (TempDir, Arc<SeaOrmStorage>) {
    let dir = TempDir::new().expect("tempdir");
    let mut config = StaticConfig::default();
    config.database.database_url = format!("{}/codpulse-test.db", dir.path().display());

    let storage = SeaOrmStorage::init(&config).await.expect("storage init");
    (dir, Arc::new(storage))
}

fn dispatch_pool(storage: &Arc<SeaOrmStorage>) -> DispatchPool {
    let transport = Arc::new(HttpTransport::new(Duration::from_secs(2)).unwrap());
    let dispatcher = Arc::new(EventDispatcher::new(
        Arc::clone(storage) as Arc<dyn DispatchStore>,
        transport,
        "Asia/Baghdad",
        Duration::from_secs(60),
        1024,
    ));
    DispatchPool::start(dispatcher, 2, 64)
}

macro_rules! tracking_app {
    ($storage:expr) => {{
        codpulse::config::init_config();
        let pool = dispatch_pool(&$storage);
        test::init_service(
            App::new()
                .app_data(web::Data::new(Arc::clone(&$storage)))
                .app_data(web::Data::new(pool))
                .service(tracking_routes()),
        )
        .await
    }};
}

macro_rules! metrics_app {
    ($storage:expr) => {{
        codpulse::config::init_config();
        let aggregator = Arc::new(MetricsAggregator::new(3.67));
        test::init_service(
            App::new()
                .app_data(web::Data::new(Arc::clone(&$storage)))
                .app_data(web::Data::new(aggregator))
                .service(metrics_routes()),
        )
        .await
    }};
}

// ============ 追踪端点 ============

#[actix_web::test]
async fn test_ingest_then_stats_roundtrip() {
    let (_dir, storage) = test_storage().await;
    let app = tracking_app!(storage);

    let req = test::TestRequest::post()
        .uri("/webhook/tracking")
        .set_json(json!({
            "event": "Purchase",
            "workspaceId": "W1",
            "data": {"value": "100", "order_id": "X1"}
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], json!(true));
    assert_eq!(body["event"], json!("Purchase"));
    assert!(body["eventId"].as_str().is_some_and(|s| !s.is_empty()));

    // 随后统计必须至少反映这一条
    let req = test::TestRequest::get()
        .uri("/webhook/tracking?workspaceId=W1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], json!("active"));
    assert!(body["stats"]["totalEvents"].as_u64().unwrap() >= 1);
    assert!(body["stats"]["eventsToday"].as_u64().unwrap() >= 1);
    assert!(body["stats"]["lastEventAt"].is_string());
}

#[actix_web::test]
async fn test_missing_event_yields_machine_code() {
    let (_dir, storage) = test_storage().await;
    let app = tracking_app!(storage);

    let req = test::TestRequest::post()
        .uri("/webhook/tracking")
        .set_json(json!({"workspaceId": "W1"}))
        .to_request();
    let response = test::call_service(&app, req).await;

    assert_eq!(response.status(), 400);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], json!("MISSING_EVENT"));
}

#[actix_web::test]
async fn test_invalid_json_yields_distinct_code() {
    let (_dir, storage) = test_storage().await;
    let app = tracking_app!(storage);

    let req = test::TestRequest::post()
        .uri("/webhook/tracking")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let response = test::call_service(&app, req).await;

    assert_eq!(response.status(), 400);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], json!("INVALID_JSON"));
}

#[actix_web::test]
async fn test_anonymous_event_is_persisted() {
    let (_dir, storage) = test_storage().await;
    let app = tracking_app!(storage);

    // 无 workspaceId：照常 200，入库但不扇出
    let req = test::TestRequest::post()
        .uri("/webhook/tracking")
        .set_json(json!({"event": "PageView"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], json!(true));
}

#[actix_web::test]
async fn test_capabilities_without_workspace() {
    let (_dir, storage) = test_storage().await;
    let app = tracking_app!(storage);

    let req = test::TestRequest::get().uri("/webhook/tracking").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["service"], json!("codpulse-tracking"));
    let events = body["supportedEvents"].as_array().unwrap();
    assert!(events.iter().any(|e| e == "Purchase"));
}

#[actix_web::test]
async fn test_tracking_cors_allows_any_origin() {
    let (_dir, storage) = test_storage().await;
    let app = tracking_app!(storage);

    let req = test::TestRequest::post()
        .uri("/webhook/tracking")
        .insert_header(("Origin", "https://landing.example.com"))
        .set_json(json!({"event": "PageView"}))
        .to_request();
    let response = test::call_service(&app, req).await;

    assert_eq!(response.status(), 200);
    let allow_origin = response
        .headers()
        .get("access-control-allow-origin")
        .and_then(|h| h.to_str().ok());
    assert!(allow_origin.is_some());
}

// ============ 指标端点 ============

#[actix_web::test]
async fn test_metrics_zero_spend_gives_null_ratios() {
    let (_dir, storage) = test_storage().await;
    let app = metrics_app!(storage);

    let req = test::TestRequest::post()
        .uri("/metrics")
        .set_json(json!({
            "date": "2024-12-01",
            "workspaceId": "W1",
            "spendNative": 0.0,
            "spendLocal": 0.0,
            "salesCount": 3,
            "grossRevenue": 500.0
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], json!(true));
    assert!(body["metrics"]["roi"].is_null());
    assert!(body["metrics"]["roas"].is_null());
    assert!(body["metrics"]["cpa"].is_number());
}

#[actix_web::test]
async fn test_metrics_post_requires_date() {
    let (_dir, storage) = test_storage().await;
    let app = metrics_app!(storage);

    let req = test::TestRequest::post()
        .uri("/metrics")
        .set_json(json!({"workspaceId": "W1", "spendNative": 10.0}))
        .to_request();
    let response = test::call_service(&app, req).await;

    assert_eq!(response.status(), 400);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], json!("MISSING_FIELD"));
}

#[actix_web::test]
async fn test_metrics_upsert_is_idempotent() {
    let (_dir, storage) = test_storage().await;
    let app = metrics_app!(storage);

    let payload = json!({
        "date": "2024-12-01",
        "workspaceId": "W1",
        "spendNative": 100.0,
        "spendLocal": 367.0,
        "conversionRate": 3.67,
        "salesCount": 10,
        "grossRevenue": 1000.0,
        "netRevenue": 950.0
    });

    // 同一日期写两次
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/metrics")
            .set_json(payload.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], json!(true));
    }

    // 只有一行
    let req = test::TestRequest::get()
        .uri("/metrics?workspaceId=W1&startDate=2024-12-01&endDate=2024-12-31")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let rows = body["metrics"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["sales_count"], json!(10));
}

#[actix_web::test]
async fn test_metrics_recompute_on_empty_day() {
    let (_dir, storage) = test_storage().await;
    let app = metrics_app!(storage);

    // 无任何花费/销售行：重算得到零值快照，比率为 null
    let req = test::TestRequest::put()
        .uri("/metrics")
        .set_json(json!({"date": "2024-12-05", "workspaceId": "W1"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], json!(true));
    assert_eq!(body["metrics"]["gross_revenue"], json!(0.0));
    assert!(body["metrics"]["roi"].is_null());
    assert!(body["metrics"]["cpa"].is_null());
}

#[actix_web::test]
async fn test_metrics_recompute_from_sales_rows() {
    let (_dir, storage) = test_storage().await;

    // 先放一行日销售（模拟订单同步写入的汇总）
    let rollup = codpulse::storage::models::DailySalesRollup {
        workspace_id: "W1".to_string(),
        date: chrono::NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
        source: "shopify".to_string(),
        orders_count: 4,
        gross_revenue: 800.0,
        total_discounts: 40.0,
        net_revenue: 760.0,
        avg_order_value: 200.0,
    };
    use codpulse::shopify::OrderSink;
    storage.upsert_daily_sales(&rollup).await.unwrap();

    let app = metrics_app!(storage);
    let req = test::TestRequest::put()
        .uri("/metrics")
        .set_json(json!({"date": "2024-12-01", "workspaceId": "W1"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["metrics"]["sales_count"], json!(4));
    assert_eq!(body["metrics"]["gross_revenue"], json!(800.0));
    assert_eq!(body["metrics"]["net_revenue"], json!(760.0));
    // 没有花费：利润等于收入，比率为 null
    assert_eq!(body["metrics"]["net_profit"], json!(760.0));
    assert!(body["metrics"]["roi"].is_null());
}
