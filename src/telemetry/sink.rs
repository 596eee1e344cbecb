use super::ClickEvent;

/// 点击写入 Sink，由存储后端实现
#[async_trait::async_trait]
pub trait ClickSink: Send + Sync {
    async fn write_click(&self, event: ClickEvent) -> anyhow::Result<()>;
}
