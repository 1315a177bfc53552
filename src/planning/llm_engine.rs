//! 基于 LLM 的推理引擎
//!
//! 渲染 prompt -> 在请求超时内调用 LlmClient -> 解析 JSON。可选绑定 Workspace，
//! 每次调用时把当前文件结构拼进 guidelines。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use crate::core::{AgentError, Task, TaskId};
use crate::llm::{LlmClient, Message};
use crate::planning::prompts::{self, FollowupPrompt};
use crate::planning::{parse_task_ids, parse_task_list, FollowupRequest, ReasoningEngine};
use crate::workspace::Workspace;

pub struct LlmReasoningEngine {
    llm: Arc<dyn LlmClient>,
    available_tools: String,
    guidelines: String,
    workspace: Option<Workspace>,
    request_timeout: Duration,
}

impl LlmReasoningEngine {
    /// tools 为 (name, description)，通常来自 ToolRegistry::tool_descriptions
    pub fn new(llm: Arc<dyn LlmClient>, tools: &[(String, String)]) -> Self {
        Self {
            llm,
            available_tools: prompts::format_available_tools(tools),
            guidelines: String::new(),
            workspace: None,
            request_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_guidelines(mut self, guidelines: impl Into<String>) -> Self {
        self.guidelines = guidelines.into();
        self
    }

    pub fn with_workspace(mut self, workspace: Workspace) -> Self {
        self.workspace = Some(workspace);
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    async fn render_guidelines(&self) -> String {
        let Some(workspace) = &self.workspace else {
            return self.guidelines.clone();
        };
        let files = workspace
            .file_paths()
            .await
            .into_iter()
            .map(|p| format!("  - {p}"))
            .collect::<Vec<_>>()
            .join("\n");
        let mut out = self.guidelines.clone();
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("- File structure:\n");
        out.push_str(&files);
        out
    }

    async fn ask(&self, prompt: String) -> Result<String, AgentError> {
        let messages = [Message::system(prompts::SYSTEM_PROMPT), Message::user(prompt)];
        match timeout(self.request_timeout, self.llm.complete(&messages)).await {
            Ok(Ok(text)) => {
                tracing::debug!(chars = text.len(), "reasoning engine replied");
                Ok(text)
            }
            Ok(Err(e)) => Err(AgentError::LlmError(e)),
            Err(_) => Err(AgentError::NetworkTimeout),
        }
    }
}

#[async_trait]
impl ReasoningEngine for LlmReasoningEngine {
    async fn create_task_list(
        &self,
        objective: &str,
        error_context: Option<&str>,
    ) -> Result<Vec<Task>, AgentError> {
        let guidelines = self.render_guidelines().await;
        let prompt = prompts::task_list_creation(
            objective,
            &guidelines,
            &self.available_tools,
            error_context,
        );
        parse_task_list(&self.ask(prompt).await?)
    }

    async fn create_followup_tasks(
        &self,
        request: FollowupRequest<'_>,
    ) -> Result<Vec<Task>, AgentError> {
        let guidelines = self.render_guidelines().await;
        let result = request.last_result.to_string();
        let completed = request.completed_task_names();
        let prompt = prompts::task_creation(&FollowupPrompt {
            objective: request.objective,
            guidelines: &guidelines,
            available_tools: &self.available_tools,
            task_description: &request.last_task.name,
            result: &result,
            completed_tasks: &completed,
            incomplete_tasks: request.pending,
        });
        parse_task_list(&self.ask(prompt).await?)
    }

    async fn reprioritize_tasks(
        &self,
        pending: &[Task],
        objective: &str,
    ) -> Result<Vec<TaskId>, AgentError> {
        let prompt = prompts::task_list_prioritisation(objective, pending);
        parse_task_ids(&self.ask(prompt).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CompletedTask;
    use crate::llm::MockLlmClient;
    use crate::tools::Outcome;

    fn tools() -> Vec<(String, String)> {
        vec![("install-dependency".to_string(), "Install one package".to_string())]
    }

    #[tokio::test]
    async fn test_create_task_list_with_error_context() {
        let mock = Arc::new(MockLlmClient::with_responses([
            r#"[{"task_id": 1, "task_name": "install zod", "tool_name": "install-dependency", "tool_input": "zod"}]"#,
        ]));
        let engine = LlmReasoningEngine::new(mock.clone(), &tools());
        let tasks = engine
            .create_task_list("validate forms", Some("Module not found: zod"))
            .await
            .unwrap();
        assert_eq!(tasks[0].name, "install zod");

        let prompt = &mock.prompts()[0];
        assert!(prompt.contains("validate forms"));
        assert!(prompt.contains("Module not found: zod"));
        assert!(prompt.contains("- install-dependency: Install one package"));
    }

    #[tokio::test]
    async fn test_guidelines_include_workspace_files() {
        let mock = Arc::new(MockLlmClient::new());
        let ws = Workspace::with_files([("/App.js", "")]);
        let engine = LlmReasoningEngine::new(mock.clone(), &tools())
            .with_guidelines("- Write plain JavaScript.")
            .with_workspace(ws.clone());
        engine.create_task_list("obj", None).await.unwrap();
        ws.write_file("/src/Form.js", "").await.unwrap();
        engine.create_task_list("obj", None).await.unwrap();

        let prompts = mock.prompts();
        assert!(prompts[0].contains("- Write plain JavaScript.\n- File structure:\n  - /App.js"));
        assert!(!prompts[0].contains("/src/Form.js"));
        assert!(prompts[1].contains("  - /src/Form.js"));
    }

    #[tokio::test]
    async fn test_followup_prompt_and_parse() {
        let mock = Arc::new(MockLlmClient::with_responses(["```json\n[]\n```"]));
        let engine = LlmReasoningEngine::new(mock.clone(), &tools());
        let last = Task::new(2, "read Form", "get-file-contents-by-path", "/src/Form.js");
        let done = vec![CompletedTask::new(
            Task::new(1, "list files", "list-available-files", ""),
            Outcome::info("/App.js"),
        )];
        let result = Outcome::error("not found");
        let tasks = engine
            .create_followup_tasks(FollowupRequest {
                objective: "obj",
                last_task: &last,
                last_result: &result,
                pending: &[],
                completed: &done,
            })
            .await
            .unwrap();
        assert!(tasks.is_empty());
        let prompt = &mock.prompts()[0];
        assert!(prompt.contains("Task description: read Form"));
        assert!(prompt.contains("Task result: ToolError: not found"));
        assert!(prompt.contains("* list files"));
    }

    #[tokio::test]
    async fn test_reprioritize_parses_ids() {
        let mock = Arc::new(MockLlmClient::with_responses([r#"[{"task_id": "3"}]"#]));
        let engine = LlmReasoningEngine::new(mock, &tools());
        let pending = vec![Task::new(3, "c", "t", "")];
        let ids = engine.reprioritize_tasks(&pending, "obj").await.unwrap();
        assert_eq!(ids, vec![TaskId(3)]);
    }

    #[tokio::test]
    async fn test_llm_failure_maps_to_llm_error() {
        struct Down;

        #[async_trait]
        impl LlmClient for Down {
            async fn complete(&self, _messages: &[Message]) -> Result<String, String> {
                Err("connection refused".to_string())
            }
        }

        let engine = LlmReasoningEngine::new(Arc::new(Down), &tools());
        let err = engine.create_task_list("obj", None).await.unwrap_err();
        assert!(matches!(err, AgentError::LlmError(_)));
        assert!(!err.is_contract_violation());
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_timeout() {
        struct Hang;

        #[async_trait]
        impl LlmClient for Hang {
            async fn complete(&self, _messages: &[Message]) -> Result<String, String> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok("[]".to_string())
            }
        }

        let engine = LlmReasoningEngine::new(Arc::new(Hang), &tools())
            .with_request_timeout(Duration::from_secs(5));
        let err = engine.create_task_list("obj", None).await.unwrap_err();
        assert!(matches!(err, AgentError::NetworkTimeout));
    }
}
