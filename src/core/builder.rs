//! Agent 构建器：从配置装配 LLM、工具、推理引擎与编排器
//!
//! 二进制入口与测试共用同一套装配逻辑。

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::core::{AgentOptions, ChangeListener, Orchestrator};
use crate::llm::{create_deepseek_client, LlmClient, MockLlmClient, OpenAiClient, RetryConfig, RetryingLlmClient};
use crate::planning::LlmReasoningEngine;
use crate::tools::{workspace_toolset, Tool, ToolExecutor};
use crate::workspace::Workspace;

/// 根据配置与环境变量选择 LLM 后端（DeepSeek / OpenAI 兼容 / Mock）
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    let has_deepseek_key = std::env::var("DEEPSEEK_API_KEY").is_ok();
    let has_openai_key = std::env::var("OPENAI_API_KEY").is_ok();

    if provider == "mock" {
        tracing::info!("Using Mock LLM (configured)");
        return Arc::new(MockLlmClient::new());
    }

    // 有 DeepSeek Key 或（配置为 deepseek 且仅有 OpenAI Key 时也走 DeepSeek 兼容端点）
    if has_deepseek_key || (provider == "deepseek" && has_openai_key) {
        let client = create_deepseek_client(cfg.llm.model.as_deref(), cfg.llm.base_url.as_deref());
        tracing::info!("Using DeepSeek LLM");
        Arc::new(client)
    } else if has_openai_key {
        let model = cfg.llm.model.clone().unwrap_or_else(|| "gpt-4o-mini".to_string());
        tracing::info!("Using OpenAI LLM ({})", model);
        Arc::new(OpenAiClient::new(cfg.llm.base_url.as_deref(), &model, None))
    } else {
        tracing::warn!("No API key set or provider unknown, using Mock LLM");
        Arc::new(MockLlmClient::new())
    }
}

/// Agent 构建器
pub struct AgentBuilder {
    config: AppConfig,
    workspace: Workspace,
    llm: Arc<dyn LlmClient>,
    listener: Option<Arc<dyn ChangeListener>>,
    extra_tools: Vec<Arc<dyn Tool>>,
}

impl AgentBuilder {
    pub fn new(config: AppConfig, workspace: Workspace, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            config,
            workspace,
            llm,
            listener: None,
            extra_tools: Vec::new(),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn ChangeListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// 在工作区工具之外追加工具
    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.extra_tools.push(Arc::new(tool));
        self
    }

    pub fn build(self) -> Orchestrator {
        let mut tools = workspace_toolset(&self.workspace);
        for tool in self.extra_tools {
            tools.register_arc(tool);
        }
        let descriptions = tools.tool_descriptions();
        tracing::debug!(tools = ?tools.tool_names(), "tool registry built");

        let llm: Arc<dyn LlmClient> = Arc::new(RetryingLlmClient::new(
            self.llm,
            RetryConfig {
                max_retries: self.config.llm.max_retries,
                base_delay: Duration::from_millis(self.config.llm.retry_base_delay_ms),
            },
        ));

        let mut engine = LlmReasoningEngine::new(llm, &descriptions)
            .with_workspace(self.workspace.clone())
            .with_request_timeout(Duration::from_secs(self.config.llm.request_timeout_secs));
        if let Some(guidelines) = &self.config.agent.guidelines {
            engine = engine.with_guidelines(guidelines.clone());
        }

        let executor = ToolExecutor::new(tools, self.config.tools.tool_timeout_secs);
        let mut orchestrator = Orchestrator::new(Arc::new(engine), executor)
            .with_options(AgentOptions::from(&self.config.agent));
        if let Some(listener) = self.listener {
            orchestrator = orchestrator.with_listener(listener);
        }
        orchestrator
    }
}
