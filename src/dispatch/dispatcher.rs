//! 事件扇出执行器
//!
//! 对单个任务：查出工作区的 Webhook 订阅与活跃像素（经 TTL 缓存），
//! 逐个投递并记账。单个端点或像素的失败只记录，不影响其余目标。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use moka::future::Cache;
use tracing::{debug, warn};

use super::signer::{sign_payload, SIGNATURE_HEADER};
use super::{DeliveryResponse, DispatchJob};
use crate::errors::{CodpulseError, Result};
use crate::storage::models::{
    DeliveryStatus, PixelRecord, WebhookDeliveryLog, WebhookEndpoint,
};
use crate::utils::timezone;

/// 扇出需要的存储操作接缝
#[async_trait]
pub trait DispatchStore: Send + Sync {
    async fn webhooks_for_workspace(&self, workspace_id: &str) -> Result<Vec<WebhookEndpoint>>;

    async fn pixels_for_workspace(&self, workspace_id: &str) -> Result<Vec<PixelRecord>>;

    /// 写一条投递日志（只追加）
    async fn record_webhook_log(&self, log: &WebhookDeliveryLog) -> Result<()>;

    /// 投递成功：归零失败计数并刷新 last_triggered_at
    async fn mark_webhook_success(&self, webhook_id: i64) -> Result<()>;

    /// 投递失败：失败计数 +1
    async fn mark_webhook_failure(&self, webhook_id: i64) -> Result<()>;

    /// 写一条像素扇出记录
    async fn record_pixel_event(
        &self,
        pixel_id: i64,
        event_name: &str,
        payload: Option<&str>,
    ) -> Result<()>;

    /// 像素当日计数 +1（跨日时归零重计）
    async fn bump_pixel_counter(&self, pixel_id: i64, day: NaiveDate) -> Result<()>;
}

/// 出站 HTTP 投递接缝
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// 投递负载；网络层失败返回 Err，任何 HTTP 状态码都返回 Ok
    async fn deliver(
        &self,
        url: &str,
        body: &str,
        signature: Option<&str>,
    ) -> Result<DeliveryResponse>;
}

/// reqwest 实现，带单次投递超时
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(delivery_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(delivery_timeout)
            .build()
            .map_err(|e| {
                CodpulseError::http_client(format!("Failed to build webhook client: {}", e))
            })?;
        Ok(Self { http })
    }
}

#[async_trait]
impl WebhookTransport for HttpTransport {
    async fn deliver(
        &self,
        url: &str,
        body: &str,
        signature: Option<&str>,
    ) -> Result<DeliveryResponse> {
        let mut request = self
            .http
            .post(url)
            .header("Content-Type", "application/json")
            .body(body.to_string());

        if let Some(signature) = signature {
            request = request.header(SIGNATURE_HEADER, signature);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CodpulseError::http_client(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        Ok(DeliveryResponse { status, body })
    }
}

/// 工作区扇出配置（缓存单元）
struct WorkspaceFanout {
    webhooks: Vec<WebhookEndpoint>,
    pixels: Vec<PixelRecord>,
}

/// 扇出执行器
pub struct EventDispatcher {
    store: Arc<dyn DispatchStore>,
    transport: Arc<dyn WebhookTransport>,
    /// 按工作区 ID 缓存订阅配置，重连/改配置时显式失效
    config_cache: Cache<String, Arc<WorkspaceFanout>>,
    seller_timezone: String,
    response_body_cap: usize,
}

impl EventDispatcher {
    pub fn new(
        store: Arc<dyn DispatchStore>,
        transport: Arc<dyn WebhookTransport>,
        seller_timezone: impl Into<String>,
        config_cache_ttl: Duration,
        response_body_cap: usize,
    ) -> Self {
        Self {
            store,
            transport,
            config_cache: Cache::builder()
                .time_to_live(config_cache_ttl)
                .max_capacity(10_000)
                .build(),
            seller_timezone: seller_timezone.into(),
            response_body_cap,
        }
    }

    /// 让某工作区的缓存配置失效（Webhook/像素配置变更后调用）
    pub async fn invalidate_workspace(&self, workspace_id: &str) {
        self.config_cache.invalidate(workspace_id).await;
    }

    /// 执行一次扇出
    ///
    /// 返回 Err 仅代表配置加载层面失败；单个目标的失败都已
    /// 在内部记账。
    pub async fn dispatch(&self, job: &DispatchJob) -> Result<()> {
        let fanout = self.load_fanout(&job.workspace_id).await?;

        let payload_json = serde_json::to_string(&job.payload)?;

        for endpoint in &fanout.webhooks {
            if !endpoint.is_active || !endpoint.subscribes_to(&job.event_name) {
                continue;
            }
            self.deliver_to_endpoint(endpoint, &job.event_name, &payload_json)
                .await;
        }

        self.fan_out_pixels(&fanout.pixels, job, &payload_json).await;

        Ok(())
    }

    async fn load_fanout(&self, workspace_id: &str) -> Result<Arc<WorkspaceFanout>> {
        if let Some(cached) = self.config_cache.get(workspace_id).await {
            return Ok(cached);
        }

        let webhooks = self.store.webhooks_for_workspace(workspace_id).await?;
        let pixels = self.store.pixels_for_workspace(workspace_id).await?;
        let fanout = Arc::new(WorkspaceFanout { webhooks, pixels });

        self.config_cache
            .insert(workspace_id.to_string(), Arc::clone(&fanout))
            .await;
        Ok(fanout)
    }

    /// 单个端点的投递 + 记账，任何失败都不外抛
    async fn deliver_to_endpoint(&self, endpoint: &WebhookEndpoint, event_name: &str, body: &str) {
        let signature = endpoint
            .secret
            .as_deref()
            .map(|secret| sign_payload(secret, body.as_bytes()));

        let mut log = WebhookDeliveryLog {
            webhook_id: endpoint.id,
            event_type: event_name.to_string(),
            payload: Some(body.to_string()),
            response_code: None,
            response_body: None,
            status: DeliveryStatus::Failed,
            attempt_count: 1,
            error_message: None,
        };

        match self
            .transport
            .deliver(&endpoint.url, body, signature.as_deref())
            .await
        {
            Ok(response) if (200..300).contains(&response.status) => {
                log.response_code = Some(response.status as i32);
                log.response_body = Some(truncate(&response.body, self.response_body_cap));
                log.status = DeliveryStatus::Success;

                debug!(
                    "Dispatch: webhook {} delivered '{}' ({})",
                    endpoint.id, event_name, response.status
                );

                if let Err(e) = self.store.mark_webhook_success(endpoint.id).await {
                    warn!("Dispatch: failed to mark webhook {} success: {}", endpoint.id, e);
                }
            }
            Ok(response) => {
                log.response_code = Some(response.status as i32);
                log.response_body = Some(truncate(&response.body, self.response_body_cap));
                log.error_message = Some(format!("HTTP {}", response.status));

                warn!(
                    "Dispatch: webhook {} returned {} for '{}'",
                    endpoint.id, response.status, event_name
                );

                if let Err(e) = self.store.mark_webhook_failure(endpoint.id).await {
                    warn!("Dispatch: failed to mark webhook {} failure: {}", endpoint.id, e);
                }
            }
            Err(e) => {
                log.error_message = Some(e.to_string());

                warn!(
                    "Dispatch: webhook {} unreachable for '{}': {}",
                    endpoint.id, event_name, e
                );

                if let Err(e) = self.store.mark_webhook_failure(endpoint.id).await {
                    warn!("Dispatch: failed to mark webhook {} failure: {}", endpoint.id, e);
                }
            }
        }

        if let Err(e) = self.store.record_webhook_log(&log).await {
            warn!("Dispatch: failed to record webhook log for {}: {}", endpoint.id, e);
        }
    }

    /// 像素路径：本地扇出记录 + 当日计数
    async fn fan_out_pixels(&self, pixels: &[PixelRecord], job: &DispatchJob, payload: &str) {
        if pixels.iter().all(|p| !p.is_active) {
            return;
        }

        let day = match timezone::local_day(chrono::Utc::now(), &self.seller_timezone) {
            Ok(day) => day,
            Err(e) => {
                warn!("Dispatch: cannot bucket pixel counters: {}", e);
                return;
            }
        };

        for pixel in pixels {
            if !pixel.is_active {
                continue;
            }

            if let Err(e) = self
                .store
                .record_pixel_event(pixel.id, &job.event_name, Some(payload))
                .await
            {
                warn!("Dispatch: pixel {} event record failed: {}", pixel.id, e);
                continue;
            }

            if let Err(e) = self.store.bump_pixel_counter(pixel.id, day).await {
                warn!("Dispatch: pixel {} counter update failed: {}", pixel.id, e);
            }
        }
    }
}

fn truncate(s: &str, cap: usize) -> String {
    if s.len() <= cap {
        s.to_string()
    } else {
        s.chars().take(cap).collect()
    }
}
