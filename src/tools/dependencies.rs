//! 依赖工具：install-dependency / list-installed-dependencies

use anyhow::bail;
use async_trait::async_trait;

use crate::core::TaskInput;
use crate::tools::{Outcome, Tool};
use crate::workspace::Workspace;

/// install-dependency：一次只安装一个依赖，已安装则报错
pub struct InstallDependencyTool {
    workspace: Workspace,
}

impl InstallDependencyTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for InstallDependencyTool {
    fn name(&self) -> &str {
        "install-dependency"
    }

    fn description(&self) -> &str {
        "Call this to install a new dependency. Input should be the name of the dependency."
    }

    async fn execute(&self, input: &TaskInput) -> anyhow::Result<Outcome> {
        let raw = input.as_text();
        let names: Vec<&str> = raw.split_whitespace().collect();
        match names.as_slice() {
            [] => bail!("Input must be provided"),
            [name] => {
                if self.workspace.has_dependency(name).await {
                    bail!("{name} is already installed, it does not need to be installed again.");
                }
                self.workspace.add_dependency(*name, "latest").await;
                tracing::info!(dependency = %name, "dependency installed");
                Ok(Outcome::success(format!(
                    "Successfully installed package \"{name}\", you can now use it in the project."
                )))
            }
            many => {
                let mut installed = Vec::new();
                for name in many {
                    if self.workspace.has_dependency(name).await {
                        installed.push(*name);
                    }
                }
                if installed.is_empty() {
                    bail!("You may only install one dependency at a time.");
                }
                bail!(
                    "Multiple errors:\n  - {} are already installed, they do not need to be installed again.\n  - You may only install one dependency at a time.",
                    installed.join(" & ")
                )
            }
        }
    }
}

/// list-installed-dependencies：列出已安装依赖
pub struct ListDependenciesTool {
    workspace: Workspace,
}

impl ListDependenciesTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for ListDependenciesTool {
    fn name(&self) -> &str {
        "list-installed-dependencies"
    }

    fn description(&self) -> &str {
        "Call this to get a list of all the dependencies in the project, useful to know which modules you can import. \
         Input should be an empty string."
    }

    async fn execute(&self, _input: &TaskInput) -> anyhow::Result<Outcome> {
        let deps = self.workspace.dependencies().await;
        if deps.is_empty() {
            return Ok(Outcome::info("No dependencies installed"));
        }
        let names: Vec<&str> = deps.keys().map(String::as_str).collect();
        Ok(Outcome::info(format!(
            "Here is the list of installed dependencies:\n\n{}",
            names.join("\n")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_install_once() {
        let ws = Workspace::new();
        let tool = InstallDependencyTool::new(ws.clone());
        assert!(!tool.execute(&"lodash".into()).await.unwrap().is_error());
        assert!(ws.has_dependency("lodash").await);

        let err = tool.execute(&"lodash".into()).await.unwrap_err();
        assert!(err.to_string().contains("already installed"));
    }

    #[tokio::test]
    async fn test_install_rejects_multiple() {
        let ws = Workspace::new();
        ws.add_dependency("react", "18").await;
        let tool = InstallDependencyTool::new(ws);

        let err = tool.execute(&"axios dayjs".into()).await.unwrap_err();
        assert_eq!(err.to_string(), "You may only install one dependency at a time.");

        let err = tool.execute(&"react axios".into()).await.unwrap_err();
        assert!(err.to_string().contains("react are already installed"));
    }

    #[tokio::test]
    async fn test_list_dependencies() {
        let ws = Workspace::new();
        let tool = ListDependenciesTool::new(ws.clone());
        assert_eq!(
            tool.execute(&"".into()).await.unwrap(),
            Outcome::info("No dependencies installed")
        );
        ws.add_dependency("zod", "latest").await;
        assert!(tool.execute(&"".into()).await.unwrap().message().contains("zod"));
    }
}
