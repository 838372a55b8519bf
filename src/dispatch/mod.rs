//! 事件扇出子系统
//!
//! 每个带工作区的已入库追踪事件触发一次扇出：Webhook 投递与像素
//! 记账两条独立路径，都是尽力而为，绝不反向阻塞入库响应。扇出
//! 经过有界工作池（固定并发 + 单次投递超时），慢订阅方不能拖垮
//! 其他订阅方。

pub mod dispatcher;
pub mod signer;
pub mod worker;

pub use dispatcher::{DispatchStore, EventDispatcher, WebhookTransport};
pub use worker::DispatchPool;

use serde_json::Value;

/// 一次扇出任务：一个已入库、带工作区的事件
#[derive(Debug, Clone)]
pub struct DispatchJob {
    pub workspace_id: String,
    pub event_name: String,
    /// 原始入站事件体，原样作为出站负载
    pub payload: Value,
}

/// 一次 HTTP 投递的结果（任意状态码都算"有响应"）
#[derive(Debug, Clone)]
pub struct DeliveryResponse {
    pub status: u16,
    pub body: String,
}
