//! 任务列表输出解析
//!
//! 从 LLM 文本中提取 JSON（优先 ``` 代码块，其次首个 `[` 到末尾 `]`），解析为任务列表或任务 ID 列表。
//! 任何不是「任务对象 JSON 数组」的输出都是 MalformedTaskList。

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::core::{AgentError, Task, TaskId, TaskInput};

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^[ \t]*`{3,4}[^\n]*\n(.*?)^[ \t]*`{3,4}").expect("code fence regex")
});

/// LLM 给出的任务（task_id 可能是数字、数字字符串或缺失，入队时会被覆盖）
#[derive(Debug, Deserialize)]
struct RawTask {
    #[serde(default)]
    task_id: Option<Value>,
    task_name: String,
    tool_name: String,
    #[serde(default)]
    tool_input: TaskInput,
}

/// 提取 JSON 片段
fn extract_json(output: &str) -> &str {
    let trimmed = output.trim();
    if let Some(body) = CODE_FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        return body.as_str().trim();
    }
    match (trimmed.find('['), trimmed.rfind(']')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

fn id_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn malformed(reason: impl std::fmt::Display, json: &str) -> AgentError {
    AgentError::MalformedTaskList(format!("{reason}: {json}"))
}

/// 解析任务列表；无法识别的 task_id 记为 0
pub fn parse_task_list(output: &str) -> Result<Vec<Task>, AgentError> {
    let json = extract_json(output);
    let raw: Vec<RawTask> = serde_json::from_str(json).map_err(|e| malformed(e, json))?;
    Ok(raw
        .into_iter()
        .map(|t| Task {
            id: TaskId(t.task_id.as_ref().and_then(id_from_value).unwrap_or(0)),
            name: t.task_name,
            tool_name: t.tool_name,
            tool_input: t.tool_input,
        })
        .collect())
}

/// 解析重排结果：接受 `[{"task_id": 1}, ...]` 或 `[1, "2", ...]`
pub fn parse_task_ids(output: &str) -> Result<Vec<TaskId>, AgentError> {
    let json = extract_json(output);
    let items: Vec<Value> = serde_json::from_str(json).map_err(|e| malformed(e, json))?;
    items
        .iter()
        .map(|item| {
            let id = match item {
                Value::Object(map) => map.get("task_id").and_then(id_from_value),
                other => id_from_value(other),
            };
            id.map(TaskId)
                .ok_or_else(|| malformed(format!("invalid task id entry {item}"), json))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fenced_list() {
        let output = "Here you go:\n```json\n[\n {\"task_id\": \"1\", \"task_name\": \"list files\", \"tool_name\": \"list-available-files\", \"tool_input\": \"\"}\n]\n```\nDone.";
        let tasks = parse_task_list(output).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, TaskId(1));
        assert_eq!(tasks[0].tool_name, "list-available-files");
    }

    #[test]
    fn test_parse_bare_list_with_structured_input() {
        let output = r#"[{"task_id": 4, "task_name": "write", "tool_name": "create-new-file", "tool_input": {"path": "/a.js", "code": "x"}}]"#;
        let tasks = parse_task_list(output).unwrap();
        assert_eq!(tasks[0].id, TaskId(4));
        assert_eq!(tasks[0].tool_input.as_json().unwrap()["path"], "/a.js");
    }

    #[test]
    fn test_non_numeric_id_defaults_to_zero() {
        let output = r#"[{"task_id": "a unique id", "task_name": "n", "tool_name": "t"}]"#;
        let tasks = parse_task_list(output).unwrap();
        assert_eq!(tasks[0].id, TaskId(0));
        assert_eq!(tasks[0].tool_input, TaskInput::default());
    }

    #[test]
    fn test_empty_array() {
        assert!(parse_task_list("[]").unwrap().is_empty());
        assert!(parse_task_list("```\n[]\n```").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_list() {
        assert!(matches!(
            parse_task_list("I think we are done."),
            Err(AgentError::MalformedTaskList(_))
        ));
        assert!(matches!(
            parse_task_list(r#"[{"task_name": "missing tool"}]"#),
            Err(AgentError::MalformedTaskList(_))
        ));
    }

    #[test]
    fn test_parse_ids_both_shapes() {
        let ids = parse_task_ids("```json\n[{\"task_id\": \"3\"}, {\"task_id\": 1}]\n```").unwrap();
        assert_eq!(ids, vec![TaskId(3), TaskId(1)]);
        assert_eq!(parse_task_ids("[2, \"5\"]").unwrap(), vec![TaskId(2), TaskId(5)]);
    }

    #[test]
    fn test_parse_ids_rejects_garbage() {
        assert!(parse_task_ids(r#"[{"task_id": "first"}]"#).is_err());
        assert!(parse_task_ids(r#"[{"name": "x"}]"#).is_err());
    }
}
