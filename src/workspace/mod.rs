//! 工作区：工具读写的文件与依赖存储
//!
//! Workspace 是可克隆句柄（Arc<RwLock<..>>），在构建工具时显式传入；编排器从不直接访问它。
//! 路径统一规范为以 `/` 开头，禁止 `..` 逃逸。可从磁盘目录加载并回写。

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use walkdir::WalkDir;

use crate::core::AgentError;

#[derive(Debug, Default)]
struct WorkspaceState {
    files: BTreeMap<String, String>,
    dependencies: BTreeMap<String, String>,
}

/// 工作区句柄
#[derive(Clone, Debug, Default)]
pub struct Workspace {
    inner: Arc<RwLock<WorkspaceState>>,
}

/// 规范化工作区路径：去掉 `./`，补前导 `/`，拒绝 `..` 与空路径
pub fn normalize_path(path: &str) -> Result<String, AgentError> {
    let trimmed = path.trim().trim_start_matches("./");
    let mut parts = Vec::new();
    for part in trimmed.split('/') {
        match part {
            "" | "." => continue,
            ".." => return Err(AgentError::Workspace(format!("Path escape attempt: {path}"))),
            p => parts.push(p),
        }
    }
    if parts.is_empty() {
        return Err(AgentError::Workspace("Empty path".to_string()));
    }
    Ok(format!("/{}", parts.join("/")))
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用初始文件构建（路径非法的条目被跳过）
    pub fn with_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: Into<String>,
    {
        let mut state = WorkspaceState::default();
        for (path, code) in files {
            match normalize_path(path.as_ref()) {
                Ok(p) => {
                    state.files.insert(p, code.into());
                }
                Err(e) => tracing::warn!(error = %e, "skipping initial file"),
            }
        }
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// 从磁盘目录加载文本文件（跳过隐藏条目与非 UTF-8 文件）
    pub fn from_dir(root: impl AsRef<Path>) -> Result<Self, AgentError> {
        let root = root.as_ref();
        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
        for entry in walker {
            let entry = entry.map_err(|e| AgentError::Workspace(format!("Walk failed: {e}")))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = match entry.path().strip_prefix(root) {
                Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
                Err(_) => continue,
            };
            match std::fs::read_to_string(entry.path()) {
                Ok(code) => files.push((rel, code)),
                Err(e) => tracing::debug!(path = %rel, error = %e, "skipping unreadable file"),
            }
        }
        tracing::info!(root = %root.display(), files = files.len(), "workspace loaded");
        Ok(Self::with_files(files))
    }

    /// 把所有文件写回磁盘目录
    pub async fn flush_to_dir(&self, root: impl AsRef<Path>) -> Result<usize, AgentError> {
        let root = root.as_ref();
        let state = self.inner.read().await;
        for (path, code) in &state.files {
            let target = root.join(path.trim_start_matches('/'));
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AgentError::Workspace(format!("Create dir failed: {e}")))?;
            }
            std::fs::write(&target, code)
                .map_err(|e| AgentError::Workspace(format!("Write failed: {e}")))?;
        }
        Ok(state.files.len())
    }

    pub async fn file(&self, path: &str) -> Option<String> {
        let path = normalize_path(path).ok()?;
        self.inner.read().await.files.get(&path).cloned()
    }

    pub async fn has_file(&self, path: &str) -> bool {
        self.file(path).await.is_some()
    }

    pub async fn file_paths(&self) -> Vec<String> {
        self.inner.read().await.files.keys().cloned().collect()
    }

    /// 写入文件，返回规范化后的路径
    pub async fn write_file(&self, path: &str, code: impl Into<String>) -> Result<String, AgentError> {
        let path = normalize_path(path)?;
        self.inner.write().await.files.insert(path.clone(), code.into());
        Ok(path)
    }

    /// 其他目录下同名文件（用于「是否想用这个路径」提示）
    pub async fn find_same_name(&self, path: &str) -> Option<String> {
        let path = normalize_path(path).ok()?;
        let name = path.rsplit('/').next()?.to_string();
        self.inner
            .read()
            .await
            .files
            .keys()
            .find(|p| **p != path && p.rsplit('/').next() == Some(name.as_str()))
            .cloned()
    }

    pub async fn dependencies(&self) -> BTreeMap<String, String> {
        self.inner.read().await.dependencies.clone()
    }

    pub async fn has_dependency(&self, name: &str) -> bool {
        self.inner.read().await.dependencies.contains_key(name)
    }

    pub async fn add_dependency(&self, name: impl Into<String>, version: impl Into<String>) {
        self.inner
            .write()
            .await
            .dependencies
            .insert(name.into(), version.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("src/app.js").unwrap(), "/src/app.js");
        assert_eq!(normalize_path("./src//app.js").unwrap(), "/src/app.js");
        assert_eq!(normalize_path("/App.js").unwrap(), "/App.js");
        assert!(normalize_path("../../etc/passwd").is_err());
        assert!(normalize_path("src/../../x").is_err());
        assert!(normalize_path("  ").is_err());
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let ws = Workspace::new();
        let path = ws.write_file("src/a.js", "let a;").await.unwrap();
        assert_eq!(path, "/src/a.js");
        assert_eq!(ws.file("/src/a.js").await.as_deref(), Some("let a;"));
        assert!(ws.has_file("src/a.js").await);
    }

    #[tokio::test]
    async fn test_find_same_name() {
        let ws = Workspace::with_files([("/App.js", "x")]);
        assert_eq!(ws.find_same_name("/src/App.js").await.as_deref(), Some("/App.js"));
        assert!(ws.find_same_name("/src/Other.js").await.is_none());
    }

    #[tokio::test]
    async fn test_load_and_flush_dir() {
        let src = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(src.path().join("src")).unwrap();
        std::fs::create_dir_all(src.path().join(".git")).unwrap();
        std::fs::write(src.path().join("App.js"), "app").unwrap();
        std::fs::write(src.path().join("src/b.js"), "b").unwrap();
        std::fs::write(src.path().join(".git/HEAD"), "ref").unwrap();

        let ws = Workspace::from_dir(src.path()).unwrap();
        assert_eq!(ws.file_paths().await, vec!["/App.js", "/src/b.js"]);

        ws.write_file("/src/c.js", "c").await.unwrap();
        let out = tempfile::tempdir().unwrap();
        assert_eq!(ws.flush_to_dir(out.path()).await.unwrap(), 3);
        assert_eq!(std::fs::read_to_string(out.path().join("src/c.js")).unwrap(), "c");
    }
}
