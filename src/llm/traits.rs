//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / DeepSeek / Mock）实现 LlmClient::complete。
//! RetryingLlmClient 为任意客户端加指数退避重试；编排器本身从不重试推理引擎调用。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::llm::Message;

/// LLM 客户端 trait：非流式完成
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, String>;

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}

/// 单次退避上限
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// 重试配置
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// 首次失败后的最大重试次数
    pub max_retries: u32,
    /// 首次退避时长，之后每次翻倍
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// 失败后按指数退避重试的包装客户端
pub struct RetryingLlmClient {
    inner: Arc<dyn LlmClient>,
    config: RetryConfig,
}

impl RetryingLlmClient {
    pub fn new(inner: Arc<dyn LlmClient>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// 第 attempt 次重试前的等待：base_delay * 2^attempt，溢出或超限时取 MAX_BACKOFF
    fn backoff(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.config.base_delay.checked_mul(factor))
            .map_or(MAX_BACKOFF, |delay| delay.min(MAX_BACKOFF))
    }
}

#[async_trait]
impl LlmClient for RetryingLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        let mut attempt = 0;
        loop {
            match self.inner.complete(messages).await {
                Ok(content) => return Ok(content),
                Err(e) if attempt < self.config.max_retries => {
                    let delay = self.backoff(attempt);
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "LLM call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn token_usage(&self) -> (u64, u64, u64) {
        self.inner.token_usage()
    }
}
