//! 扇出执行器行为测试：失败隔离、签名、订阅过滤、像素记账

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;

use codpulse::dispatch::signer;
use codpulse::dispatch::{
    DeliveryResponse, DispatchJob, DispatchStore, EventDispatcher, WebhookTransport,
};
use codpulse::errors::{CodpulseError, Result};
use codpulse::storage::models::{
    DeliveryStatus, PixelPlatform, PixelRecord, WebhookDeliveryLog, WebhookEndpoint,
};

// ============ 测试替身 ============

#[derive(Default)]
struct MemoryStore {
    webhooks: Vec<WebhookEndpoint>,
    pixels: Vec<PixelRecord>,
    logs: Mutex<Vec<WebhookDeliveryLog>>,
    success_marks: Mutex<Vec<i64>>,
    failure_marks: Mutex<Vec<i64>>,
    pixel_events: Mutex<Vec<(i64, String)>>,
    counter_bumps: Mutex<Vec<(i64, NaiveDate)>>,
}

#[async_trait]
impl DispatchStore for MemoryStore {
    async fn webhooks_for_workspace(&self, _workspace_id: &str) -> Result<Vec<WebhookEndpoint>> {
        Ok(self.webhooks.clone())
    }

    async fn pixels_for_workspace(&self, _workspace_id: &str) -> Result<Vec<PixelRecord>> {
        Ok(self.pixels.clone())
    }

    async fn record_webhook_log(&self, log: &WebhookDeliveryLog) -> Result<()> {
        self.logs.lock().unwrap().push(log.clone());
        Ok(())
    }

    async fn mark_webhook_success(&self, webhook_id: i64) -> Result<()> {
        self.success_marks.lock().unwrap().push(webhook_id);
        Ok(())
    }

    async fn mark_webhook_failure(&self, webhook_id: i64) -> Result<()> {
        self.failure_marks.lock().unwrap().push(webhook_id);
        Ok(())
    }

    async fn record_pixel_event(
        &self,
        pixel_id: i64,
        event_name: &str,
        _payload: Option<&str>,
    ) -> Result<()> {
        self.pixel_events
            .lock()
            .unwrap()
            .push((pixel_id, event_name.to_string()));
        Ok(())
    }

    async fn bump_pixel_counter(&self, pixel_id: i64, day: NaiveDate) -> Result<()> {
        self.counter_bumps.lock().unwrap().push((pixel_id, day));
        Ok(())
    }
}

/// 可编排的传输层：按 URL 决定网络失败 / 返回状态码
#[derive(Default)]
struct ScriptedTransport {
    unreachable: Vec<String>,
    statuses: HashMap<String, u16>,
    response_body: String,
    deliveries: Mutex<Vec<(String, String, Option<String>)>>,
}

#[async_trait]
impl WebhookTransport for ScriptedTransport {
    async fn deliver(
        &self,
        url: &str,
        body: &str,
        signature: Option<&str>,
    ) -> Result<DeliveryResponse> {
        self.deliveries.lock().unwrap().push((
            url.to_string(),
            body.to_string(),
            signature.map(String::from),
        ));

        if self.unreachable.iter().any(|u| u == url) {
            return Err(CodpulseError::http_client("connection refused"));
        }

        Ok(DeliveryResponse {
            status: self.statuses.get(url).copied().unwrap_or(200),
            body: self.response_body.clone(),
        })
    }
}

fn endpoint(id: i64, url: &str, secret: Option<&str>, events: &[&str]) -> WebhookEndpoint {
    WebhookEndpoint {
        id,
        workspace_id: "W1".to_string(),
        url: url.to_string(),
        secret: secret.map(String::from),
        events: events.iter().map(|s| s.to_string()).collect(),
        is_active: true,
        failure_count: 0,
    }
}

fn pixel(id: i64, active: bool) -> PixelRecord {
    PixelRecord {
        id,
        workspace_id: "W1".to_string(),
        platform: PixelPlatform::Facebook,
        pixel_id: "123456789012345".to_string(),
        name: format!("pixel-{}", id),
        is_active: active,
    }
}

fn dispatcher(store: Arc<MemoryStore>, transport: Arc<ScriptedTransport>) -> EventDispatcher {
    EventDispatcher::new(
        store,
        transport,
        "Asia/Baghdad",
        Duration::from_secs(60),
        64,
    )
}

fn purchase_job() -> DispatchJob {
    DispatchJob {
        workspace_id: "W1".to_string(),
        event_name: "Purchase".to_string(),
        payload: json!({"event": "Purchase", "data": {"order_id": "X1", "value": "100"}}),
    }
}

// ============ 测试 ============

/// 两个订阅同一事件的端点，一个不可达：两者都有投递尝试和日志，
/// 可达端点不记失败
#[tokio::test]
async fn test_one_unreachable_endpoint_does_not_block_the_other() {
    let store = Arc::new(MemoryStore {
        webhooks: vec![
            endpoint(1, "https://dead.example.com/hook", None, &["Purchase"]),
            endpoint(2, "https://live.example.com/hook", None, &["Purchase"]),
        ],
        ..Default::default()
    });
    let transport = Arc::new(ScriptedTransport {
        unreachable: vec!["https://dead.example.com/hook".to_string()],
        ..Default::default()
    });

    dispatcher(Arc::clone(&store), Arc::clone(&transport))
        .dispatch(&purchase_job())
        .await
        .unwrap();

    // 两个端点都被尝试
    assert_eq!(transport.deliveries.lock().unwrap().len(), 2);

    // 两条日志，一成一败
    let logs = store.logs.lock().unwrap();
    assert_eq!(logs.len(), 2);
    let by_id: HashMap<i64, &WebhookDeliveryLog> =
        logs.iter().map(|l| (l.webhook_id, l)).collect();
    assert_eq!(by_id[&1].status, DeliveryStatus::Failed);
    assert!(by_id[&1].response_code.is_none());
    assert!(by_id[&1].error_message.is_some());
    assert_eq!(by_id[&2].status, DeliveryStatus::Success);
    assert_eq!(by_id[&2].response_code, Some(200));

    // 失败计数只动了不可达那个
    assert_eq!(*store.failure_marks.lock().unwrap(), vec![1]);
    assert_eq!(*store.success_marks.lock().unwrap(), vec![2]);
}

/// 配置密钥的端点带 HMAC 签名头，未配置的不带
#[tokio::test]
async fn test_signature_attached_only_with_secret() {
    let store = Arc::new(MemoryStore {
        webhooks: vec![
            endpoint(1, "https://signed.example.com/hook", Some("whsec_abc"), &["Purchase"]),
            endpoint(2, "https://plain.example.com/hook", None, &["Purchase"]),
        ],
        ..Default::default()
    });
    let transport = Arc::new(ScriptedTransport::default());

    dispatcher(Arc::clone(&store), Arc::clone(&transport))
        .dispatch(&purchase_job())
        .await
        .unwrap();

    let deliveries = transport.deliveries.lock().unwrap();
    let signed = deliveries
        .iter()
        .find(|(url, _, _)| url.contains("signed"))
        .unwrap();
    let plain = deliveries
        .iter()
        .find(|(url, _, _)| url.contains("plain"))
        .unwrap();

    // 签名可由订阅方用同样算法复算
    let signature = signed.2.as_deref().unwrap();
    assert!(signer::verify_signature("whsec_abc", signed.1.as_bytes(), signature));
    assert!(plain.2.is_none());
}

/// 只投递订阅了该事件名的端点
#[tokio::test]
async fn test_subscription_filtering() {
    let store = Arc::new(MemoryStore {
        webhooks: vec![
            endpoint(1, "https://purchase.example.com/hook", None, &["Purchase"]),
            endpoint(2, "https://pageview.example.com/hook", None, &["PageView"]),
            endpoint(3, "https://wildcard.example.com/hook", None, &["*"]),
        ],
        ..Default::default()
    });
    let transport = Arc::new(ScriptedTransport::default());

    dispatcher(Arc::clone(&store), Arc::clone(&transport))
        .dispatch(&purchase_job())
        .await
        .unwrap();

    let urls: Vec<String> = transport
        .deliveries
        .lock()
        .unwrap()
        .iter()
        .map(|(url, _, _)| url.clone())
        .collect();
    assert_eq!(urls.len(), 2);
    assert!(urls.iter().any(|u| u.contains("purchase")));
    assert!(urls.iter().any(|u| u.contains("wildcard")));
}

/// 非 2xx 响应按失败记账，但日志保留状态码和响应体
#[tokio::test]
async fn test_non_2xx_counts_as_failure() {
    let store = Arc::new(MemoryStore {
        webhooks: vec![endpoint(1, "https://teapot.example.com/hook", None, &["Purchase"])],
        ..Default::default()
    });
    let transport = Arc::new(ScriptedTransport {
        statuses: HashMap::from([("https://teapot.example.com/hook".to_string(), 503)]),
        response_body: "upstream maintenance".to_string(),
        ..Default::default()
    });

    dispatcher(Arc::clone(&store), Arc::clone(&transport))
        .dispatch(&purchase_job())
        .await
        .unwrap();

    let logs = store.logs.lock().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, DeliveryStatus::Failed);
    assert_eq!(logs[0].response_code, Some(503));
    assert_eq!(logs[0].response_body.as_deref(), Some("upstream maintenance"));
    assert_eq!(*store.failure_marks.lock().unwrap(), vec![1]);
}

/// 响应体超出上限要截断后入日志
#[tokio::test]
async fn test_response_body_is_truncated() {
    let store = Arc::new(MemoryStore {
        webhooks: vec![endpoint(1, "https://chatty.example.com/hook", None, &["Purchase"])],
        ..Default::default()
    });
    let transport = Arc::new(ScriptedTransport {
        response_body: "x".repeat(500),
        ..Default::default()
    });

    EventDispatcher::new(
        Arc::clone(&store) as Arc<dyn DispatchStore>,
        Arc::clone(&transport) as Arc<dyn WebhookTransport>,
        "Asia/Baghdad",
        Duration::from_secs(60),
        100, // cap
    )
    .dispatch(&purchase_job())
    .await
    .unwrap();

    let logs = store.logs.lock().unwrap();
    assert_eq!(logs[0].response_body.as_ref().unwrap().len(), 100);
}

/// 像素路径：活跃像素各得一条扇出记录和一次计数；停用的跳过
#[tokio::test]
async fn test_pixel_fan_out() {
    let store = Arc::new(MemoryStore {
        pixels: vec![pixel(10, true), pixel(11, true), pixel(12, false)],
        ..Default::default()
    });
    let transport = Arc::new(ScriptedTransport::default());

    dispatcher(Arc::clone(&store), Arc::clone(&transport))
        .dispatch(&purchase_job())
        .await
        .unwrap();

    let events = store.pixel_events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|(_, name)| name == "Purchase"));

    let bumps = store.counter_bumps.lock().unwrap();
    assert_eq!(bumps.len(), 2);
    // 两次计数落在同一个卖家本地日
    assert_eq!(bumps[0].1, bumps[1].1);
}

/// 没有任何订阅配置时扇出静默完成
#[tokio::test]
async fn test_dispatch_with_no_targets_is_noop() {
    let store = Arc::new(MemoryStore::default());
    let transport = Arc::new(ScriptedTransport::default());

    dispatcher(Arc::clone(&store), Arc::clone(&transport))
        .dispatch(&purchase_job())
        .await
        .unwrap();

    assert!(transport.deliveries.lock().unwrap().is_empty());
    assert!(store.logs.lock().unwrap().is_empty());
}
