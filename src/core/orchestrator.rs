//! 任务编排器：规划 -> 执行 -> 再规划 主循环
//!
//! Planning -> Idle <-> Executing -> Evaluating -> {Completing | Replanning -> Reprioritizing} -> Idle，
//! 终态 Done / Aborted。同一时刻只有一个推理引擎或工具调用在途；每次变更后同步通知监听者完整快照。
//!
//! 错误策略：工具失败是数据（驱动再规划），工作区中断在 Idle 空队列检查点被消费并触发重新规划，
//! 只有推理引擎的契约违规/传输失败会离开编排器边界。

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::{sleep, Instant};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::AgentSection;
use crate::core::{
    AgentError, AgentPhase, AgentSnapshot, ChangeListener, CompletedTask, InterruptHandle, Task,
    TaskId, TaskQueue,
};
use crate::planning::{FollowupRequest, ReasoningEngine};
use crate::tools::{Outcome, ToolExecutor};

/// 循环参数；节奏常量仅影响展示节奏，不影响正确性
#[derive(Debug, Clone)]
pub struct AgentOptions {
    /// Executing 次数硬上限
    pub max_iterations: usize,
    /// 单步执行最短时长
    pub min_step_duration: Duration,
    /// Success/Info 之后的停顿
    pub settle_delay: Duration,
    /// 队列为空时等待外部中断的宽限期
    pub error_grace: Duration,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self::from(&AgentSection::default())
    }
}

impl From<&AgentSection> for AgentOptions {
    fn from(section: &AgentSection) -> Self {
        Self {
            max_iterations: section.max_iterations,
            min_step_duration: section.min_step_duration(),
            settle_delay: section.settle_delay(),
            error_grace: section.error_grace(),
        }
    }
}

/// run 的正常结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Termination {
    /// 队列清空且宽限期内无中断
    Completed,
    /// 达到迭代上限
    MaxIterationsReached,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub termination: Termination,
    pub iterations: usize,
    pub completed: Vec<CompletedTask>,
}

/// run 级状态，每次 run 开始时整体重置
#[derive(Debug, Default)]
struct RunState {
    run_id: Option<Uuid>,
    phase: AgentPhase,
    queue: TaskQueue,
    current: Option<Task>,
    completed: Vec<CompletedTask>,
    is_planning: bool,
    iteration: usize,
    last_id: u64,
}

pub struct Orchestrator {
    engine: Arc<dyn ReasoningEngine>,
    executor: ToolExecutor,
    listener: Option<Arc<dyn ChangeListener>>,
    interrupt: InterruptHandle,
    options: AgentOptions,
    state: RunState,
}

impl Orchestrator {
    pub fn new(engine: Arc<dyn ReasoningEngine>, executor: ToolExecutor) -> Self {
        Self {
            engine,
            executor,
            listener: None,
            interrupt: InterruptHandle::new(),
            options: AgentOptions::default(),
            state: RunState::default(),
        }
    }

    pub fn with_options(mut self, options: AgentOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn ChangeListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// 复用外部已有的中断句柄（例如工具在构建时就持有的那一个）
    pub fn with_interrupt(mut self, interrupt: InterruptHandle) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// 供工作区等外部协作方注入中断
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    /// SetError：None 表示清除
    pub fn set_error(&self, error: Option<String>) {
        self.interrupt.set_error(error);
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            run_id: self.state.run_id,
            phase: self.state.phase,
            current_task: self.state.current.clone(),
            completed: self.state.completed.clone(),
            queue: self.state.queue.iter().cloned().collect(),
            is_planning: self.state.is_planning,
            iteration: self.state.iteration,
        }
    }

    /// 执行一个目标直到完成、达到迭代上限或推理引擎出错。
    ///
    /// 每次调用都会先重置队列、完成日志、当前任务、中断与 ID 计数器。
    pub async fn run(&mut self, objective: &str) -> Result<RunReport, AgentError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", %run_id);
        let result = self.drive(run_id, objective).instrument(span).await;
        if let Err(e) = &result {
            tracing::error!(%run_id, error = %e, "run aborted");
            self.state.is_planning = false;
            self.state.phase = AgentPhase::Aborted;
            self.publish();
        }
        result
    }

    async fn drive(&mut self, run_id: Uuid, objective: &str) -> Result<RunReport, AgentError> {
        self.reset(run_id);
        tracing::info!(objective, "run started");

        self.plan(objective, None).await?;

        loop {
            if self.state.queue.is_empty() {
                self.set_phase(AgentPhase::Idle);
                // 给异步到达的外部错误一点时间
                if !self.interrupt.wait_for_error(self.options.error_grace).await {
                    return Ok(self.finish(Termination::Completed));
                }
                let error = self.interrupt.take();
                tracing::warn!(error = ?error, "interrupt consumed, replanning");
                self.plan(objective, error.as_deref()).await?;
                continue;
            }

            if self.state.iteration >= self.options.max_iterations {
                tracing::warn!(max = self.options.max_iterations, "iteration budget exhausted");
                return Ok(self.finish(Termination::MaxIterationsReached));
            }

            let Some(task) = self.state.queue.pop_front() else {
                continue;
            };
            self.start(&task);
            let outcome = self.execute(&task).await;

            self.set_phase(AgentPhase::Evaluating);
            if outcome.is_error() {
                tracing::info!(task_id = %task.id, result = %outcome, "task failed, replanning");
                self.replan(objective, task, outcome).await?;
                self.reprioritize(objective).await?;
            } else {
                tracing::info!(task_id = %task.id, result = %outcome, "task completed");
                self.complete_current(task, outcome);
                sleep(self.options.settle_delay).await;
            }
        }
    }

    fn reset(&mut self, run_id: Uuid) {
        self.state = RunState {
            run_id: Some(run_id),
            ..RunState::default()
        };
        self.interrupt.set_error(None);
        self.publish();
    }

    fn finish(&mut self, termination: Termination) -> RunReport {
        self.set_phase(match termination {
            Termination::Completed => AgentPhase::Done,
            Termination::MaxIterationsReached => AgentPhase::Exhausted,
        });
        tracing::info!(
            ?termination,
            iterations = self.state.iteration,
            completed = self.state.completed.len(),
            "run finished"
        );
        RunReport {
            run_id: self.state.run_id.unwrap_or_default(),
            termination,
            iterations: self.state.iteration,
            completed: self.state.completed.clone(),
        }
    }

    /// Planning：整体替换队列
    async fn plan(&mut self, objective: &str, error: Option<&str>) -> Result<(), AgentError> {
        self.state.phase = AgentPhase::Planning;
        self.state.is_planning = true;
        self.publish();

        let tasks = self.engine.create_task_list(objective, error).await?;
        let tasks = self.assign_ids(tasks);
        tracing::info!(count = tasks.len(), replanned = error.is_some(), "task list created");

        self.state.queue.replace(tasks);
        self.state.is_planning = false;
        self.state.phase = AgentPhase::Idle;
        self.publish();
        Ok(())
    }

    /// 刚弹出的队首成为当前任务
    fn start(&mut self, task: &Task) {
        self.state.iteration += 1;
        self.state.current = Some(task.clone());
        self.state.phase = AgentPhase::Executing;
        tracing::info!(
            task_id = %task.id,
            name = %task.name,
            tool = %task.tool_name,
            iteration = self.state.iteration,
            "executing task"
        );
        self.publish();
    }

    /// Executing：调用工具并补足最短时长，不缩短本就更慢的工具
    async fn execute(&self, task: &Task) -> Outcome {
        let start = Instant::now();
        let outcome = self.executor.execute(task).await;
        let elapsed = start.elapsed();
        if elapsed < self.options.min_step_duration {
            sleep(self.options.min_step_duration - elapsed).await;
        }
        outcome
    }

    /// Replanning：先拿后续任务，再把当前任务记为完成，最后追加新任务
    async fn replan(&mut self, objective: &str, task: Task, outcome: Outcome) -> Result<(), AgentError> {
        self.set_phase(AgentPhase::Replanning);
        let followups = self
            .engine
            .create_followup_tasks(FollowupRequest {
                objective,
                last_task: &task,
                last_result: &outcome,
                pending: self.state.queue.as_slice(),
                completed: &self.state.completed,
            })
            .await?;

        self.complete_current(task, outcome);

        let followups = self.assign_ids(followups);
        tracing::info!(
            new_tasks = ?followups.iter().map(|t| t.id).collect::<Vec<_>>(),
            "followup tasks appended"
        );
        self.state.queue.extend(followups);
        self.publish();
        Ok(())
    }

    /// Reprioritizing：按引擎返回的 ID 顺序重建队列
    async fn reprioritize(&mut self, objective: &str) -> Result<(), AgentError> {
        self.set_phase(AgentPhase::Reprioritizing);
        let ids: Vec<TaskId> = self
            .engine
            .reprioritize_tasks(self.state.queue.as_slice(), objective)
            .await?;
        self.state.queue.reorder(&ids)?;
        tracing::info!(queue = ?self.state.queue.ids(), "task list reprioritized");
        self.publish();
        Ok(())
    }

    fn complete_current(&mut self, task: Task, outcome: Outcome) {
        self.state.current = None;
        self.state.completed.push(CompletedTask::new(task, outcome));
        self.publish();
    }

    /// 覆盖引擎给出的 ID，保证单次 run 内唯一且严格递增
    fn assign_ids(&mut self, tasks: Vec<Task>) -> Vec<Task> {
        tasks
            .into_iter()
            .map(|mut task| {
                self.state.last_id += 1;
                task.id = TaskId(self.state.last_id);
                task
            })
            .collect()
    }

    fn set_phase(&mut self, phase: AgentPhase) {
        if self.state.phase != phase {
            self.state.phase = phase;
            self.publish();
        }
    }

    fn publish(&self) {
        if let Some(listener) = &self.listener {
            listener.on_state_change(&self.snapshot());
        }
    }
}
