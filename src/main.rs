//! Taskloop 命令行入口
//!
//! 用法：`taskloop <objective...>`。加载工作区目录、按配置选择 LLM 后端、运行编排器，
//! 结束后把工作区写回磁盘并打印摘要。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use taskloop::config::load_config;
use taskloop::core::{create_llm_from_config, AgentBuilder, AgentSnapshot};
use taskloop::observability;
use taskloop::workspace::Workspace;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let objective = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if objective.trim().is_empty() {
        eprintln!("usage: taskloop <objective...>");
        std::process::exit(2);
    }

    let config_path = std::env::var("TASKLOOP_CONFIG").ok().map(PathBuf::from);
    let cfg = load_config(config_path).context("Failed to load config")?;

    let root = cfg
        .app
        .workspace_root
        .clone()
        .unwrap_or_else(|| PathBuf::from("workspace"));
    std::fs::create_dir_all(&root)
        .with_context(|| format!("Failed to create workspace dir {}", root.display()))?;
    let workspace = Workspace::from_dir(&root).context("Failed to load workspace")?;

    let llm = create_llm_from_config(&cfg);
    let listener = Arc::new(|snapshot: &AgentSnapshot| {
        tracing::debug!(
            phase = ?snapshot.phase,
            iteration = snapshot.iteration,
            current = ?snapshot.current_task.as_ref().map(|t| t.id),
            queue = snapshot.queue.len(),
            completed = snapshot.completed.len(),
            "state changed"
        );
    });
    let mut orchestrator = AgentBuilder::new(cfg, workspace.clone(), llm)
        .with_listener(listener)
        .build();

    let result = orchestrator.run(&objective).await;

    let written = workspace
        .flush_to_dir(&root)
        .await
        .context("Failed to write workspace")?;
    tracing::info!(root = %root.display(), files = written, "workspace flushed");

    match result {
        Ok(report) => {
            println!(
                "run {} finished: {:?} after {} iterations",
                report.run_id, report.termination, report.iterations
            );
            for done in &report.completed {
                println!("  [{}] {} -> {}", done.task.id, done.task.name, done.outcome);
            }
            Ok(())
        }
        Err(e) if e.is_contract_violation() => {
            eprintln!("reasoning engine contract violation: {e}");
            std::process::exit(3);
        }
        Err(e) => Err(e).context("Run failed"),
    }
}
