//! Mock LLM 客户端（用于测试与无 API Key 时的本地运行）
//!
//! 按 FIFO 返回预置回复，用尽后返回空任务列表 `[]`；记录收到的每次 prompt 便于断言。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{LlmClient, Message};

/// Mock 客户端：脚本化回复
#[derive(Debug, Default)]
pub struct MockLlmClient {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// 已收到的 prompt（每次调用的最后一条消息内容）
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        if let (Ok(mut prompts), Some(last)) = (self.prompts.lock(), messages.last()) {
            prompts.push(last.content.clone());
        }
        let next = self
            .responses
            .lock()
            .map_err(|e| e.to_string())?
            .pop_front();
        Ok(next.unwrap_or_else(|| "[]".to_string()))
    }
}
