//! 工具层：Tool trait、三态 Outcome、注册表与执行器，以及基于 Workspace 的内置工具

pub mod dependencies;
pub mod executor;
pub mod files;
pub mod outcome;
pub mod registry;

pub use dependencies::{InstallDependencyTool, ListDependenciesTool};
pub use executor::ToolExecutor;
pub use files::{
    CreateNewFileTool, FilePathInstructionsTool, GetFileContentsTool, ListAvailableFilesTool,
    SetFileContentsTool,
};
pub use outcome::Outcome;
pub use registry::{Tool, ToolRegistry};

use crate::workspace::Workspace;

/// 注册全部工作区工具（顺序即 prompt 中可用工具的展示顺序）
pub fn workspace_toolset(workspace: &Workspace) -> ToolRegistry {
    let mut tools = ToolRegistry::new();
    tools.register(ListAvailableFilesTool::new(workspace.clone()));
    tools.register(GetFileContentsTool::new(workspace.clone()));
    tools.register(CreateNewFileTool::new(workspace.clone()));
    tools.register(SetFileContentsTool::new(workspace.clone()));
    tools.register(FilePathInstructionsTool);
    tools.register(InstallDependencyTool::new(workspace.clone()));
    tools.register(ListDependenciesTool::new(workspace.clone()));
    tools
}
