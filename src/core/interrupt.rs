//! 工作区中断通道
//!
//! 外部协作方（如运行时报错的工作区）通过 InterruptHandle::set_error 注入错误；
//! 编排器只在 Idle 空队列检查点消费它。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::timeout;

/// 中断句柄：可克隆，所有克隆共享同一错误槽
#[derive(Clone, Debug)]
pub struct InterruptHandle {
    tx: Arc<watch::Sender<Option<String>>>,
}

impl Default for InterruptHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptHandle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// 设置错误；None 表示清除
    pub fn set_error(&self, error: Option<String>) {
        if let Some(msg) = &error {
            tracing::warn!(error = %msg, "interrupt raised");
        }
        self.tx.send_replace(error);
    }

    pub fn current(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    /// 取出并清除当前错误
    pub fn take(&self) -> Option<String> {
        self.tx.send_replace(None)
    }

    /// 最多等待 grace；期间一旦出现错误立即返回 true
    pub async fn wait_for_error(&self, grace: Duration) -> bool {
        let mut rx = self.tx.subscribe();
        // Ref 借用 rx，须在 rx 析构前释放
        let seen = timeout(grace, rx.wait_for(|e| e.is_some()))
            .await
            .map(|r| r.is_ok())
            .unwrap_or(false);
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_take_clear() {
        let handle = InterruptHandle::new();
        handle.set_error(Some("boom".into()));
        assert_eq!(handle.current().as_deref(), Some("boom"));
        assert_eq!(handle.take().as_deref(), Some("boom"));
        assert!(handle.current().is_none());

        handle.set_error(Some("again".into()));
        handle.set_error(None);
        assert!(handle.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out_without_error() {
        let handle = InterruptHandle::new();
        let start = tokio::time::Instant::now();
        assert!(!handle.wait_for_error(Duration::from_millis(2000)).await);
        assert!(start.elapsed() >= Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_early_on_error() {
        let handle = InterruptHandle::new();
        let remote = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            remote.set_error(Some("late fault".into()));
        });
        let start = tokio::time::Instant::now();
        assert!(handle.wait_for_error(Duration::from_millis(2000)).await);
        assert!(start.elapsed() < Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn test_wait_sees_existing_error() {
        let handle = InterruptHandle::new();
        handle.set_error(Some("already".into()));
        assert!(handle.wait_for_error(Duration::from_secs(60)).await);
    }
}
