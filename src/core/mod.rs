//! 核心编排层：任务模型、队列、状态投影、中断通道、编排器与构建器

pub mod builder;
pub mod error;
pub mod interrupt;
pub mod orchestrator;
pub mod queue;
pub mod state;
pub mod task;

pub use builder::{create_llm_from_config, AgentBuilder};
pub use error::AgentError;
pub use interrupt::InterruptHandle;
pub use orchestrator::{AgentOptions, Orchestrator, RunReport, Termination};
pub use queue::TaskQueue;
pub use state::{AgentPhase, AgentSnapshot, ChangeListener};
pub use task::{CompletedTask, Task, TaskId, TaskInput};
