//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `TASKLOOP__*` 覆盖（双下划线表示嵌套，如 `TASKLOOP__AGENT__MAX_ITERATIONS=50`）。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub agent: AgentSection,
    pub tools: ToolsSection,
}

/// [app] 段：工作区目录
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    /// 工作区根目录，未设置时用 ./workspace
    pub workspace_root: Option<PathBuf>,
}

/// [llm] 段：后端选择、超时与重试
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：deepseek / openai / mock；实际选择还取决于 API Key 是否存在
    pub provider: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 传输失败后的重试次数
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "deepseek".to_string(),
            model: None,
            base_url: None,
            request_timeout_secs: 60,
            max_retries: 2,
            retry_base_delay_ms: 500,
        }
    }
}

/// [agent] 段：迭代上限与节奏参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    /// Executing 次数上限
    pub max_iterations: usize,
    /// 单步执行最短时长（毫秒），工具更快返回时补足
    pub min_step_ms: u64,
    /// Success/Info 之后的停顿（毫秒）
    pub settle_delay_ms: u64,
    /// 队列为空时等待外部中断的宽限期（毫秒）
    pub error_grace_ms: u64,
    /// 附加在 prompt 中的执行准则
    pub guidelines: Option<String>,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            min_step_ms: 1000,
            settle_delay_ms: 500,
            error_grace_ms: 2000,
            guidelines: None,
        }
    }
}

impl AgentSection {
    pub fn min_step_duration(&self) -> Duration {
        Duration::from_millis(self.min_step_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn error_grace(&self) -> Duration {
        Duration::from_millis(self.error_grace_ms)
    }
}

/// [tools] 段：单次工具调用超时（秒）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    pub tool_timeout_secs: u64,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: 30,
        }
    }
}

/// 从 config 目录加载配置，环境变量 TASKLOOP__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 TASKLOOP__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("TASKLOOP")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
