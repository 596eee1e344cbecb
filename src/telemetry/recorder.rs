//! 异步点击记录器
//!
//! 有界队列 + 单消费者：队列满了直接丢弃并计数，慢存储不能把内存拖垮；
//! 每次写入有独立超时，超时同样按丢弃处理。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{ClickEvent, ClickSink};

pub struct ClickRecorder {
    tx: mpsc::Sender<ClickEvent>,
    dropped: Arc<AtomicU64>,
}

impl ClickRecorder {
    /// 启动后台写入任务，返回记录器和任务句柄。
    /// 所有 `ClickRecorder` 克隆体被丢弃后，后台任务排空队列并退出。
    pub fn spawn(
        sink: Arc<dyn ClickSink>,
        queue_capacity: usize,
        write_timeout: Duration,
    ) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<ClickEvent>(queue_capacity);
        let dropped = Arc::new(AtomicU64::new(0));
        let dropped_worker = dropped.clone();

        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let link_id = event.link_id.clone();
                match tokio::time::timeout(write_timeout, sink.write_click(event)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        dropped_worker.fetch_add(1, Ordering::Relaxed);
                        warn!("Click write failed for link {}: {}", link_id, e);
                    }
                    Err(_) => {
                        dropped_worker.fetch_add(1, Ordering::Relaxed);
                        warn!(
                            "Click write timed out after {:?} for link {}",
                            write_timeout, link_id
                        );
                    }
                }
            }
            debug!("Click recorder drained, shutting down");
        });

        (Self { tx, dropped }, handle)
    }

    /// 非阻塞入队。队列满时丢弃事件并计数，调用方不感知失败。
    pub fn record(&self, event: ClickEvent) {
        if let Err(e) = self.tx.try_send(event) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            warn!("Click event dropped (queue full or closed): {}", e);
        }
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Clone for ClickRecorder {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            dropped: self.dropped.clone(),
        }
    }
}
