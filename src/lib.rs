//! Taskloop - 自主规划 / 执行 / 再规划的任务型智能体
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 任务模型、队列、状态快照、中断通道、编排器与构建器
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）、重试包装
//! - **observability**: 日志初始化
//! - **planning**: 推理引擎契约、prompt 模板与输出解析
//! - **tools**: Tool trait、Outcome、注册表与执行器、工作区工具
//! - **workspace**: 内存中的项目文件与依赖

pub mod config;
pub mod core;
pub mod llm;
pub mod observability;
pub mod planning;
pub mod tools;
pub mod workspace;

pub use crate::core::{AgentBuilder, AgentError, Orchestrator, RunReport, Termination};
