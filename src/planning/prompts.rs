//! 规划 prompt 模板
//!
//! 三类调用各一个模板：任务列表生成（可带中断错误提示）、后续任务生成、重排（只需 task_id）。

use crate::core::Task;

pub const SYSTEM_PROMPT: &str =
    "You are the planning component of an autonomous development agent. You only ever answer with JSON.";

pub const FORMAT_INSTRUCTIONS: &str = r#"Return the tasks using the following JSON array list format:
```json
[
 {
   "task_id": "a unique id for the first task",
   "task_name": "a descriptive name for the first task",
   "tool_input": "task input as required by the tool",
   "tool_name": "tool name"
 }
]
```
Repeat the object for each task. The task list should be correctly formatted JSON, and should not contain any comments. Please only return the JSON and no explanation."#;

pub const MINIMAL_FORMAT_INSTRUCTIONS: &str = r#"Return the tasks using the following JSON array list format with ONLY the task_id:
```json
[
 {
   "task_id": "include the task id here"
 }
]
```
Repeat the object for each task. The task list should be correctly formatted JSON, and should not contain any comments. Please only return the JSON and no explanation."#;

/// `- name: description` 列表
pub fn format_available_tools(tools: &[(String, String)]) -> String {
    tools
        .iter()
        .map(|(name, desc)| format!("- {name}: {desc}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn tasks_json(tasks: &[Task]) -> String {
    serde_json::to_string_pretty(tasks).unwrap_or_else(|_| "[]".to_string())
}

fn error_warning(error: Option<&str>) -> String {
    match error {
        Some(err) => format!(
            "WARNING: There was an error while executing one of the previous tasks.\n\
             It is up to you if you want to fix it, however you may already have a task that fixes it.\n\n\
             The error was:\n{err}"
        ),
        None => String::new(),
    }
}

pub fn task_list_creation(
    objective: &str,
    guidelines: &str,
    available_tools: &str,
    error: Option<&str>,
) -> String {
    format!(
        "You are a task creation AI that creates task lists based on the following objective:\n\
         {objective}\n\n\
         You are creating the initial task list for a development execution agent.\n\
         Break down the objective into a list of tasks that can be completed by the execution agent.\n\
         When planning your task list, be sure to get the contents of a file before setting its contents.\n\
         Create as many tasks as you need to complete the objective.\n\n\
         Your guidelines for completing the objective are:\n{guidelines}\n\n\
         New tasks should be created exclusively using the following tools:\n{available_tools}\n\n\
         {FORMAT_INSTRUCTIONS}\n\n\
         {warning}",
        warning = error_warning(error),
    )
    .trim_end()
    .to_string()
}

pub struct FollowupPrompt<'a> {
    pub objective: &'a str,
    pub guidelines: &'a str,
    pub available_tools: &'a str,
    pub task_description: &'a str,
    pub result: &'a str,
    pub completed_tasks: &'a [&'a str],
    pub incomplete_tasks: &'a [Task],
}

pub fn task_creation(p: &FollowupPrompt<'_>) -> String {
    let completed = p
        .completed_tasks
        .iter()
        .map(|name| format!("* {name}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "You are a task creation AI that uses the result of an execution agent\n\
         to create new tasks with the following objective:\n{objective}\n\n\
         NOTE: Only create tasks that are required to complete the objective, return an empty JSON array if no additional tasks are required.\n\n\
         Your guidelines for completing the objective are:\n{guidelines}\n\n\
         PREVIOUSLY EXECUTED TASK:\n\
         Task description: {task_description}\n\
         Task result: {result}\n\n\
         Use this result to create new tasks to be completed by the AI system that do not overlap with incomplete tasks.\n\n\
         The following tasks have already been completed:\n{completed}\n\n\
         TASKS TO COMPLETE:\n```json\n{incomplete}\n```\n\n\
         New tasks should be created using the following tools:\n{available_tools}\n\n\
         Please return the JSON array list of any additional tasks we should complete.\n\
         {FORMAT_INSTRUCTIONS}",
        objective = p.objective,
        guidelines = p.guidelines,
        task_description = p.task_description,
        result = p.result,
        incomplete = tasks_json(p.incomplete_tasks),
        available_tools = p.available_tools,
    )
}

pub fn task_list_prioritisation(objective: &str, tasks: &[Task]) -> String {
    format!(
        "You are a task prioritisation AI tasked with cleaning the formatting of and re-prioritizing\n\
         the following task list:\n```json\n{task_list}\n```\n\n\
         Consider the ultimate objective of: {objective}.\n\n\
         Please only reorder or remove tasks to make the list suitable for the objective.\n\n\
         {MINIMAL_FORMAT_INSTRUCTIONS}",
        task_list = tasks_json(tasks),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_warning_only_when_present() {
        let without = task_list_creation("build a form", "- be neat", "- t: d", None);
        assert!(!without.contains("WARNING"));
        let with = task_list_creation("build a form", "- be neat", "- t: d", Some("ReferenceError: x"));
        assert!(with.contains("WARNING"));
        assert!(with.contains("ReferenceError: x"));
    }

    #[test]
    fn test_followup_prompt_lists_completed_names() {
        let pending = vec![Task::new(3, "style button", "set-file-contents", "")];
        let prompt = task_creation(&FollowupPrompt {
            objective: "obj",
            guidelines: "",
            available_tools: "- t: d",
            task_description: "read App",
            result: "ToolError: missing",
            completed_tasks: &["list files", "install zod"],
            incomplete_tasks: &pending,
        });
        assert!(prompt.contains("* list files\n* install zod"));
        assert!(prompt.contains("\"task_name\": \"style button\""));
        assert!(prompt.contains("Task result: ToolError: missing"));
    }

    #[test]
    fn test_format_available_tools() {
        let tools = vec![("a".to_string(), "does a".to_string())];
        assert_eq!(format_available_tools(&tools), "- a: does a");
    }
}
