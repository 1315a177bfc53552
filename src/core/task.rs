//! 任务数据模型：TaskId、TaskInput、Task、CompletedTask
//!
//! 序列化字段名与推理引擎约定的 JSON 一致（task_id / task_name / tool_name / tool_input）。

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tools::Outcome;

/// 任务 ID：单次 run 内唯一且严格递增
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 工具输入：纯文本或结构化 JSON
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskInput {
    Text(String),
    Structured(serde_json::Value),
}

impl TaskInput {
    /// 文本形式；结构化输入渲染为紧凑 JSON
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            TaskInput::Text(s) => Cow::Borrowed(s.as_str()),
            TaskInput::Structured(v) => Cow::Owned(v.to_string()),
        }
    }

    /// 结构化视图：文本输入尝试按 JSON 解析，失败返回 None
    pub fn as_json(&self) -> Option<serde_json::Value> {
        match self {
            TaskInput::Structured(v) => Some(v.clone()),
            TaskInput::Text(s) => serde_json::from_str(s).ok(),
        }
    }
}

impl Default for TaskInput {
    fn default() -> Self {
        TaskInput::Text(String::new())
    }
}

impl From<&str> for TaskInput {
    fn from(s: &str) -> Self {
        TaskInput::Text(s.to_string())
    }
}

impl From<String> for TaskInput {
    fn from(s: String) -> Self {
        TaskInput::Text(s)
    }
}

impl From<serde_json::Value> for TaskInput {
    fn from(v: serde_json::Value) -> Self {
        TaskInput::Structured(v)
    }
}

/// 单个任务：绑定一个工具及其输入
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "task_id")]
    pub id: TaskId,
    #[serde(rename = "task_name")]
    pub name: String,
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: TaskInput,
}

impl Task {
    pub fn new(
        id: u64,
        name: impl Into<String>,
        tool_name: impl Into<String>,
        tool_input: impl Into<TaskInput>,
    ) -> Self {
        Self {
            id: TaskId(id),
            name: name.into(),
            tool_name: tool_name.into(),
            tool_input: tool_input.into(),
        }
    }
}

/// 已完成日志中的一条：任务 + 结果，只追加不修改
#[derive(Clone, Debug, Serialize)]
pub struct CompletedTask {
    pub task: Task,
    pub outcome: Outcome,
    pub completed_at: DateTime<Utc>,
}

impl CompletedTask {
    pub fn new(task: Task, outcome: Outcome) -> Self {
        Self {
            task,
            outcome,
            completed_at: Utc::now(),
        }
    }
}
