//! 推理引擎契约
//!
//! 编排器只通过这三个异步操作与推理引擎交互。对输出「形状」严格（格式错误即 AgentError），
//! 对任务选择的「内容」宽容。

use async_trait::async_trait;

use crate::core::{AgentError, CompletedTask, Task, TaskId};
use crate::tools::Outcome;

/// CreateFollowupTasks 的输入
///
/// last_task 此时尚未进入 completed，保证不会被重复计入已完成列表。
#[derive(Debug, Clone, Copy)]
pub struct FollowupRequest<'a> {
    pub objective: &'a str,
    pub last_task: &'a Task,
    pub last_result: &'a Outcome,
    pub pending: &'a [Task],
    pub completed: &'a [CompletedTask],
}

impl FollowupRequest<'_> {
    /// 已完成任务名（按完成顺序）
    pub fn completed_task_names(&self) -> Vec<&str> {
        self.completed.iter().map(|c| c.task.name.as_str()).collect()
    }
}

/// 推理引擎：生成任务列表、生成后续任务、重排待执行任务
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    /// 生成初始（或中断后重新规划的）任务列表；error_context 为 None 时也必须可用
    async fn create_task_list(
        &self,
        objective: &str,
        error_context: Option<&str>,
    ) -> Result<Vec<Task>, AgentError>;

    /// 根据上一个任务的失败结果生成后续任务；可返回空列表，不得重复 pending 中已有任务
    async fn create_followup_tasks(
        &self,
        request: FollowupRequest<'_>,
    ) -> Result<Vec<Task>, AgentError>;

    /// 返回 pending 的 ID 子集/重排；未列出的 ID 视为剔除
    async fn reprioritize_tasks(
        &self,
        pending: &[Task],
        objective: &str,
    ) -> Result<Vec<TaskId>, AgentError>;
}
