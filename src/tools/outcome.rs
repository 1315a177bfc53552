//! 工具执行结果：Success / Info / Error 三态

use std::fmt;

use serde::{Deserialize, Serialize};

/// 工具调用的三态结果；Info 在控制流上等同 Success，仅展示标签不同
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Outcome {
    Success(String),
    Info(String),
    Error(String),
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Outcome::Success(message.into())
    }

    pub fn info(message: impl Into<String>) -> Self {
        Outcome::Info(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Outcome::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Outcome::Success(m) | Outcome::Info(m) | Outcome::Error(m) => m,
        }
    }

    /// 给 LLM 看的标签
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "ToolSuccess",
            Outcome::Info(_) => "ToolInfoRetrieval",
            Outcome::Error(_) => "ToolError",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label(), self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefix() {
        assert_eq!(Outcome::success("done").to_string(), "ToolSuccess: done");
        assert_eq!(Outcome::info("x").to_string(), "ToolInfoRetrieval: x");
        assert_eq!(Outcome::error("bad path").to_string(), "ToolError: bad path");
    }

    #[test]
    fn test_info_is_not_error() {
        assert!(!Outcome::info("listing").is_error());
        assert!(Outcome::error("nope").is_error());
    }
}
