//! 有界扇出工作池
//!
//! 入库路径只做一次非阻塞入队；固定数量的 worker 从有界队列消费，
//! 队列满时任务被丢弃并记日志。出站并发上限 = worker 数。

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use super::dispatcher::EventDispatcher;
use super::DispatchJob;
use crate::errors::{CodpulseError, Result};

/// 扇出工作池句柄（可廉价克隆进 HTTP handler）
#[derive(Clone)]
pub struct DispatchPool {
    tx: mpsc::Sender<DispatchJob>,
}

impl DispatchPool {
    /// 启动工作池
    pub fn start(dispatcher: Arc<EventDispatcher>, workers: usize, queue_depth: usize) -> Self {
        let (tx, rx) = mpsc::channel::<DispatchJob>(queue_depth.max(1));
        let rx = Arc::new(Mutex::new(rx));

        let worker_count = workers.max(1);
        for worker_id in 0..worker_count {
            let rx = Arc::clone(&rx);
            let dispatcher = Arc::clone(&dispatcher);

            tokio::spawn(async move {
                loop {
                    // 锁只覆盖 recv，dispatch 在锁外执行
                    let job = { rx.lock().await.recv().await };
                    let Some(job) = job else {
                        debug!("DispatchPool: worker {} shutting down", worker_id);
                        break;
                    };

                    if let Err(e) = dispatcher.dispatch(&job).await {
                        warn!(
                            "DispatchPool: worker {} dispatch failed for '{}' (workspace {}): {}",
                            worker_id, job.event_name, job.workspace_id, e
                        );
                    }
                }
            });
        }

        info!(
            "DispatchPool started: {} workers, queue depth {}",
            worker_count, queue_depth
        );

        Self { tx }
    }

    /// 非阻塞入队
    ///
    /// 队列满时返回错误，由调用方记日志丢弃——入库响应不等扇出。
    pub fn enqueue(&self, job: DispatchJob) -> Result<()> {
        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(job) => CodpulseError::dispatch_queue(format!(
                "Dispatch queue full, dropping '{}' for workspace {}",
                job.event_name, job.workspace_id
            )),
            mpsc::error::TrySendError::Closed(_) => {
                CodpulseError::dispatch_queue("Dispatch queue closed")
            }
        })
    }
}
