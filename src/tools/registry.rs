//! 工具注册表
//!
//! 所有工具实现 Tool trait（name / description / execute），由 ToolRegistry 按名注册与查找。
//! 工具内部抛出的错误在这里统一转为 Outcome::Error，不会作为控制流错误向上传播。

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;

use crate::core::TaskInput;
use crate::tools::Outcome;

/// 工具 trait：名称、描述（LLM 决定何时使用的唯一依据）、异步执行
///
/// 返回 Err 表示工具内部故障；不可假设工具幂等。
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称（对应任务中的 tool_name）
    fn name(&self) -> &str;

    /// 工具描述（供 LLM 理解功能与输入格式）
    fn description(&self) -> &str;

    async fn execute(&self, input: &TaskInput) -> anyhow::Result<Outcome>;
}

/// 工具注册表：保留注册顺序，支持 register / get / execute / tool_names
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册工具；同名工具后注册者覆盖先注册者
    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.register_arc(Arc::new(tool));
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        match self.index.get(&name) {
            Some(&i) => {
                tracing::warn!(tool = %name, "tool re-registered, replacing previous");
                self.tools[i] = tool;
            }
            None => {
                self.index.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&i| self.tools[i].clone())
    }

    /// 执行工具；未注册返回 None，工具故障（含 panic）转为带原始输入的 Outcome::Error
    pub async fn execute(&self, name: &str, input: &TaskInput) -> Option<Outcome> {
        let tool = self.get(name)?;
        let result = AssertUnwindSafe(tool.execute(input)).catch_unwind().await;
        Some(match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => Outcome::Error(fault_message(name, input, &e)),
            Err(payload) => {
                let e = anyhow::anyhow!("tool panicked: {}", panic_message(payload.as_ref()));
                tracing::error!(tool = %name, error = %e, "tool panicked");
                Outcome::Error(fault_message(name, input, &e))
            }
        })
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// 返回 (name, description) 列表，用于生成 prompt 中的可用工具段落
    pub fn tool_descriptions(&self) -> Vec<(String, String)> {
        self.tools
            .iter()
            .map(|t| (t.name().to_string(), t.description().to_string()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

fn fault_message(name: &str, input: &TaskInput, err: &anyhow::Error) -> String {
    let rendered = match input {
        TaskInput::Structured(v) => {
            serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
        }
        TaskInput::Text(s) => s.clone(),
    };
    format!(
        "Error running tool \"{name}\" with input:\n\"{rendered}\"\n\nThe error thrown was:\n{err:#}"
    )
}
