//! Agent 错误类型
//!
//! 工具执行失败不在此列（它们是 Outcome::Error 数据）；这里只有会离开编排器边界的错误：
//! 推理引擎输出格式/契约违规、LLM 传输失败、配置与工作区错误。

use thiserror::Error;

use crate::core::TaskId;

/// 运行过程中会中止 run 的错误
#[derive(Error, Debug)]
pub enum AgentError {
    /// 推理引擎返回的不是合法任务列表
    #[error("Malformed task list: {0}")]
    MalformedTaskList(String),

    /// 重排结果引用了队列中不存在的任务
    #[error("Unknown task id: {0}")]
    UnknownTaskId(TaskId),

    /// 重排结果重复列出同一任务
    #[error("Duplicate task id: {0}")]
    DuplicateTaskId(TaskId),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Network timeout")]
    NetworkTimeout,

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Workspace error: {0}")]
    Workspace(String),
}

impl AgentError {
    /// 是否为推理引擎契约违规（输出形状错误），区别于传输层失败
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            AgentError::MalformedTaskList(_)
                | AgentError::UnknownTaskId(_)
                | AgentError::DuplicateTaskId(_)
        )
    }
}
