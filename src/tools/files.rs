//! 工作区文件工具
//!
//! create-new-file / set-file-contents / get-file-contents-by-path / list-available-files /
//! get-file-path-format-instructions，全部通过构造时传入的 Workspace 句柄操作。
//! 校验失败以 Err 返回，由 ToolRegistry 转为 Outcome::Error。

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use serde::Deserialize;

use crate::core::TaskInput;
use crate::tools::{Outcome, Tool};
use crate::workspace::{normalize_path, Workspace};

/// 写文件类工具的输入：{"path": "...", "code": "..."}
#[derive(Debug, Deserialize)]
struct FileWrite {
    path: String,
    code: String,
}

fn parse_file_write(input: &TaskInput) -> anyhow::Result<FileWrite> {
    let value = input
        .as_json()
        .ok_or_else(|| anyhow!("No valid input provided"))?;
    let write: FileWrite =
        serde_json::from_value(value).context("Input must be {\"path\": \"...\", \"code\": \"...\"}")?;
    if write.path.trim().is_empty() {
        bail!("No path provided");
    }
    if write.code.is_empty() {
        bail!("No code provided");
    }
    Ok(write)
}

/// create-new-file：新建文件，已存在则报错
pub struct CreateNewFileTool {
    workspace: Workspace,
}

impl CreateNewFileTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for CreateNewFileTool {
    fn name(&self) -> &str {
        "create-new-file"
    }

    fn description(&self) -> &str {
        "Use this to create a new file. Please include the full contents of the file. \
         Input should be the path to the file and the code: {\"path\": \"/src/file.js\", \"code\": \"...\"}"
    }

    async fn execute(&self, input: &TaskInput) -> anyhow::Result<Outcome> {
        let write = parse_file_write(input)?;
        let path = normalize_path(&write.path)?;
        if self.workspace.has_file(&path).await {
            bail!("File already exists at path \"{path}\", please use the set-file-contents tool instead.");
        }
        self.workspace.write_file(&path, write.code).await?;
        tracing::info!(path = %path, "file created");
        Ok(Outcome::success("File created successfully!"))
    }
}

/// set-file-contents：覆盖已存在文件
pub struct SetFileContentsTool {
    workspace: Workspace,
}

impl SetFileContentsTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for SetFileContentsTool {
    fn name(&self) -> &str {
        "set-file-contents"
    }

    fn description(&self) -> &str {
        "Use this to set the entire contents of an existing file. Be sure to read the file before overwriting it. \
         Input should be the path to the file and the code: {\"path\": \"/src/file.js\", \"code\": \"...\"}"
    }

    async fn execute(&self, input: &TaskInput) -> anyhow::Result<Outcome> {
        let write = parse_file_write(input)?;
        let path = normalize_path(&write.path)?;
        if !self.workspace.has_file(&path).await {
            if let Some(other) = self.workspace.find_same_name(&path).await {
                bail!(
                    "We couldn't find a file at the path you provided, but we did find one at the path {other}. \
                     Did you mean to use that path? If so, please try again."
                );
            }
            bail!("File does not exist at path {path}, please use the create-new-file tool instead, or try correcting the path.");
        }
        self.workspace.write_file(&path, write.code).await?;
        tracing::info!(path = %path, "file updated");
        Ok(Outcome::success("File updated successfully!"))
    }
}

/// get-file-contents-by-path：读取文件内容
pub struct GetFileContentsTool {
    workspace: Workspace,
}

impl GetFileContentsTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for GetFileContentsTool {
    fn name(&self) -> &str {
        "get-file-contents-by-path"
    }

    fn description(&self) -> &str {
        "Use this tool to view the contents of a file, you should use this before making a change to it. \
         Input should be a string of the path to the file."
    }

    async fn execute(&self, input: &TaskInput) -> anyhow::Result<Outcome> {
        let TaskInput::Text(raw) = input else {
            bail!("Input provided is not a string. Please provide the path to the file you want to get the contents of.");
        };
        if raw.trim().is_empty() {
            bail!("No input provided. Please provide the path to the file you want to get the contents of.");
        }
        let path = normalize_path(raw)?;
        match self.workspace.file(&path).await {
            Some(code) => Ok(Outcome::info(format!(
                "code found in file at path \"{path}\":\n```\n{code}\n```"
            ))),
            None => match self.workspace.find_same_name(&path).await {
                Some(other) => bail!(
                    "We couldn't find a file at the path you provided, but we did find one at the path {other}. \
                     Did you mean to use that path? If so, please try again."
                ),
                None => bail!("We couldn't find a file at the path you provided. Please make sure you are using the correct path."),
            },
        }
    }
}

/// list-available-files：列出工作区全部文件
pub struct ListAvailableFilesTool {
    workspace: Workspace,
}

impl ListAvailableFilesTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for ListAvailableFilesTool {
    fn name(&self) -> &str {
        "list-available-files"
    }

    fn description(&self) -> &str {
        "Use this tool to get a list of all the files in the project to understand the file structure. \
         Input should be an empty string."
    }

    async fn execute(&self, _input: &TaskInput) -> anyhow::Result<Outcome> {
        let paths = self.workspace.file_paths().await;
        if paths.is_empty() {
            return Ok(Outcome::info("The project has no files yet."));
        }
        Ok(Outcome::info(format!(
            "These are the files available in the project, relative to the root of the repository:\n{}\n\n\
             You can set new content for any of these files, or create a new one if you need.",
            paths.join("\n")
        )))
    }
}

/// get-file-path-format-instructions：路径书写规范
pub struct FilePathInstructionsTool;

#[async_trait]
impl Tool for FilePathInstructionsTool {
    fn name(&self) -> &str {
        "get-file-path-format-instructions"
    }

    fn description(&self) -> &str {
        "Use this to get the instructions for how to format the path to a file. Input should be an empty string."
    }

    async fn execute(&self, _input: &TaskInput) -> anyhow::Result<Outcome> {
        Ok(Outcome::info(
            "The path should be formatted as follows:\n\
             - start with a forward slash (/)\n\
             - be relative to the root of the project\n\
             - never contain '..' segments\n\
             - follow good file naming conventions, for example: /src/components/MyComponent.js",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_then_duplicate_create_fails() {
        let ws = Workspace::new();
        let tool = CreateNewFileTool::new(ws.clone());
        let input = TaskInput::from(json!({"path": "src/Button.js", "code": "export default 1;"}));
        assert_eq!(
            tool.execute(&input).await.unwrap(),
            Outcome::success("File created successfully!")
        );
        assert!(ws.has_file("/src/Button.js").await);

        let err = tool.execute(&input).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_create_accepts_json_text_input() {
        let ws = Workspace::new();
        let tool = CreateNewFileTool::new(ws.clone());
        let input = TaskInput::from(r#"{"path": "/a.js", "code": "a"}"#);
        assert!(!tool.execute(&input).await.unwrap().is_error());
    }

    #[tokio::test]
    async fn test_create_requires_code() {
        let tool = CreateNewFileTool::new(Workspace::new());
        let input = TaskInput::from(json!({"path": "/a.js", "code": ""}));
        let err = tool.execute(&input).await.unwrap_err();
        assert!(err.to_string().contains("No code provided"));
    }

    #[tokio::test]
    async fn test_set_contents_suggests_same_name() {
        let ws = Workspace::with_files([("/App.js", "old")]);
        let tool = SetFileContentsTool::new(ws.clone());
        let err = tool
            .execute(&TaskInput::from(json!({"path": "/src/App.js", "code": "new"})))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/App.js"));

        let ok = tool
            .execute(&TaskInput::from(json!({"path": "/App.js", "code": "new"})))
            .await
            .unwrap();
        assert!(!ok.is_error());
        assert_eq!(ws.file("/App.js").await.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_get_contents_is_info() {
        let ws = Workspace::with_files([("/index.js", "render()")]);
        let tool = GetFileContentsTool::new(ws);
        let outcome = tool.execute(&"index.js".into()).await.unwrap();
        assert!(matches!(outcome, Outcome::Info(_)));
        assert!(outcome.message().contains("render()"));
        assert!(tool.execute(&"/missing.js".into()).await.is_err());
    }

    #[tokio::test]
    async fn test_list_files() {
        let ws = Workspace::with_files([("/App.js", ""), ("/src/a.js", "")]);
        let outcome = ListAvailableFilesTool::new(ws)
            .execute(&"".into())
            .await
            .unwrap();
        assert!(outcome.message().contains("/App.js\n/src/a.js"));
    }
}
