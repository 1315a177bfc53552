//! 工具执行器
//!
//! 持有 ToolRegistry 与全局超时，execute(task) 在超时内调用 registry.execute；
//! 未知工具、超时都转为 Outcome::Error（附可用工具名），每次调用输出结构化审计日志（JSON）。

use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::core::{Task, TaskInput};
use crate::tools::{Outcome, ToolRegistry};

/// 工具执行器：对每次调用施加超时，结果一律为 Outcome
pub struct ToolExecutor {
    registry: ToolRegistry,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry, timeout_secs: u64) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// 执行任务绑定的工具；从不返回错误，失败一律是 Outcome::Error
    pub async fn execute(&self, task: &Task) -> Outcome {
        let start = Instant::now();
        let tool_name = task.tool_name.as_str();
        let result = timeout(
            self.timeout,
            self.registry.execute(tool_name, &task.tool_input),
        )
        .await;

        let outcome = match result {
            Ok(Some(outcome)) => outcome,
            Ok(None) => Outcome::Error(format!(
                "No tool found for task \"{}\", available tools: {}",
                task.name,
                self.registry.tool_names().join(", ")
            )),
            Err(_) => Outcome::Error(format!(
                "Tool \"{}\" timed out after {}s",
                tool_name,
                self.timeout.as_secs()
            )),
        };

        let audit = serde_json::json!({
            "event": "tool_audit",
            "task_id": task.id,
            "tool": tool_name,
            "outcome": outcome.label(),
            "duration_ms": start.elapsed().as_millis() as u64,
            "input_preview": input_preview(&task.tool_input),
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        outcome
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.registry.tool_names()
    }

    pub fn tool_descriptions(&self) -> Vec<(String, String)> {
        self.registry.tool_descriptions()
    }
}

fn input_preview(input: &TaskInput) -> String {
    let s = input.as_text();
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s.into_owned()
    }
}
