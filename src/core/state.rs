//! 状态投影：AgentPhase、AgentSnapshot 与变更监听
//!
//! 编排器每次变更 {current_task, completed, queue, is_planning} 后同步通知监听者一份完整快照（非增量）。
//! 展示层可直接传入闭包，或传入 watch::Sender 后持有 watch::Receiver 渲染。

use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

use crate::core::{CompletedTask, Task};

/// 编排器阶段
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum AgentPhase {
    #[default]
    Idle,
    Planning,
    Executing,
    Evaluating,
    Replanning,
    Reprioritizing,
    /// 队列清空且宽限期内无中断
    Done,
    /// 达到迭代上限，run 仍正常返回
    Exhausted,
    /// 推理引擎出错，run 返回 Err
    Aborted,
}

/// 编排器状态的只读快照
#[derive(Clone, Debug, Default, Serialize)]
pub struct AgentSnapshot {
    pub run_id: Option<Uuid>,
    pub phase: AgentPhase,
    pub current_task: Option<Task>,
    pub completed: Vec<CompletedTask>,
    pub queue: Vec<Task>,
    pub is_planning: bool,
    /// 已进入 Executing 的次数
    pub iteration: usize,
}

impl AgentSnapshot {
    /// 快照中出现的全部任务（队列、当前、已完成）
    pub fn all_tasks(&self) -> impl Iterator<Item = &Task> {
        self.queue
            .iter()
            .chain(self.current_task.iter())
            .chain(self.completed.iter().map(|c| &c.task))
    }
}

/// 状态变更监听者；回调内不得回调编排器
pub trait ChangeListener: Send + Sync {
    fn on_state_change(&self, snapshot: &AgentSnapshot);
}

impl<F> ChangeListener for F
where
    F: Fn(&AgentSnapshot) + Send + Sync,
{
    fn on_state_change(&self, snapshot: &AgentSnapshot) {
        self(snapshot)
    }
}

impl ChangeListener for watch::Sender<AgentSnapshot> {
    fn on_state_change(&self, snapshot: &AgentSnapshot) {
        self.send_replace(snapshot.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::Outcome;

    #[test]
    fn test_all_tasks_covers_every_slot() {
        let snapshot = AgentSnapshot {
            current_task: Some(Task::new(2, "b", "t", "")),
            completed: vec![CompletedTask::new(
                Task::new(1, "a", "t", ""),
                Outcome::Success("ok".into()),
            )],
            queue: vec![Task::new(3, "c", "t", "")],
            ..Default::default()
        };
        let mut ids: Vec<u64> = snapshot.all_tasks().map(|t| t.id.0).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_watch_sender_listener() {
        let (tx, rx) = watch::channel(AgentSnapshot::default());
        let snapshot = AgentSnapshot {
            is_planning: true,
            phase: AgentPhase::Planning,
            ..Default::default()
        };
        tx.on_state_change(&snapshot);
        assert!(rx.borrow().is_planning);
        assert_eq!(rx.borrow().phase, AgentPhase::Planning);
    }
}
