//! DeepSeek 后端（OpenAI 兼容格式）
//!
//! 规划类调用对 JSON 输出稳定性要求高，默认用 deepseek-chat，可经 [llm].model 或 DEEPSEEK_MODEL 覆盖。

use crate::llm::OpenAiClient;

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEEPSEEK_CHAT: &str = "deepseek-chat";

/// 创建 DeepSeek 客户端
///
/// - Key：`DEEPSEEK_API_KEY`，缺省回退 `OPENAI_API_KEY`
/// - 模型：参数 > `DEEPSEEK_MODEL` > deepseek-chat
/// - base_url：参数 > 官方端点
pub fn create_deepseek_client(model: Option<&str>, base_url: Option<&str>) -> OpenAiClient {
    let api_key = std::env::var("DEEPSEEK_API_KEY")
        .ok()
        .or_else(|| std::env::var("OPENAI_API_KEY").ok());

    let model = model
        .map(String::from)
        .or_else(|| std::env::var("DEEPSEEK_MODEL").ok())
        .unwrap_or_else(|| DEEPSEEK_CHAT.to_string());

    OpenAiClient::new(
        Some(base_url.unwrap_or(DEEPSEEK_BASE_URL)),
        &model,
        api_key.as_deref(),
    )
}
