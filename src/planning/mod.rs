//! 规划层：推理引擎契约、LLM 实现、prompt 模板与输出解析

pub mod engine;
pub mod llm_engine;
pub mod parser;
pub mod prompts;

pub use engine::{FollowupRequest, ReasoningEngine};
pub use llm_engine::LlmReasoningEngine;
pub use parser::{parse_task_ids, parse_task_list};
