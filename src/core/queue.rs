//! 待执行任务队列
//!
//! 只允许四种变更：整体替换（规划）、追加（后续任务）、按 ID 重排（优先级）、弹出队首（执行）。

use std::collections::{HashMap, HashSet, VecDeque};

use crate::core::{AgentError, Task, TaskId};

/// 有序待执行队列，队首即下一个要执行的任务
#[derive(Clone, Debug, Default)]
pub struct TaskQueue {
    tasks: VecDeque<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks.into();
    }

    pub fn extend(&mut self, tasks: impl IntoIterator<Item = Task>) {
        self.tasks.extend(tasks);
    }

    pub fn pop_front(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// 连续切片视图，供推理引擎调用传参
    pub fn as_slice(&mut self) -> &[Task] {
        self.tasks.make_contiguous()
    }

    pub fn ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|t| t.id).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// 按给定 ID 顺序重建队列；未列出的任务被剔除。
    ///
    /// 先整体校验再变更：未知 ID 返回 UnknownTaskId，重复 ID 返回 DuplicateTaskId，出错时队列保持不变。
    pub fn reorder(&mut self, ids: &[TaskId]) -> Result<(), AgentError> {
        let known: HashSet<TaskId> = self.tasks.iter().map(|t| t.id).collect();
        let mut seen = HashSet::with_capacity(ids.len());
        for id in ids {
            if !known.contains(id) {
                return Err(AgentError::UnknownTaskId(*id));
            }
            if !seen.insert(*id) {
                return Err(AgentError::DuplicateTaskId(*id));
            }
        }

        let mut by_id: HashMap<TaskId, Task> =
            self.tasks.drain(..).map(|t| (t.id, t)).collect();
        self.tasks = ids.iter().filter_map(|id| by_id.remove(id)).collect();
        if !by_id.is_empty() {
            tracing::debug!(pruned = by_id.len(), "reprioritization pruned tasks");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_of(ids: &[u64]) -> TaskQueue {
        let mut q = TaskQueue::new();
        q.replace(
            ids.iter()
                .map(|id| Task::new(*id, format!("task {id}"), "echo", ""))
                .collect(),
        );
        q
    }

    #[test]
    fn test_pop_front_order() {
        let mut q = queue_of(&[1, 2]);
        assert_eq!(q.pop_front().unwrap().id, TaskId(1));
        assert_eq!(q.pop_front().unwrap().id, TaskId(2));
        assert!(q.pop_front().is_none());
    }

    #[test]
    fn test_slice_after_pop_and_extend() {
        let mut q = queue_of(&[1, 2, 3]);
        q.pop_front();
        q.extend([Task::new(4, "task 4", "echo", "")]);
        let ids: Vec<TaskId> = q.as_slice().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TaskId(2), TaskId(3), TaskId(4)]);
    }

    #[test]
    fn test_reorder_and_prune() {
        let mut q = queue_of(&[1, 2, 3]);
        q.reorder(&[TaskId(3), TaskId(1)]).unwrap();
        assert_eq!(q.ids(), vec![TaskId(3), TaskId(1)]);
    }

    #[test]
    fn test_reorder_unknown_id_leaves_queue_untouched() {
        let mut q = queue_of(&[1, 2]);
        let err = q.reorder(&[TaskId(2), TaskId(9)]).unwrap_err();
        assert!(matches!(err, AgentError::UnknownTaskId(TaskId(9))));
        assert_eq!(q.ids(), vec![TaskId(1), TaskId(2)]);
    }

    #[test]
    fn test_reorder_duplicate_id() {
        let mut q = queue_of(&[1, 2]);
        let err = q.reorder(&[TaskId(1), TaskId(1)]).unwrap_err();
        assert!(matches!(err, AgentError::DuplicateTaskId(TaskId(1))));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn test_reorder_empty_drops_everything() {
        let mut q = queue_of(&[1, 2]);
        q.reorder(&[]).unwrap();
        assert!(q.is_empty());
    }
}
