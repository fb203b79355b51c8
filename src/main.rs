use std::io::IsTerminal;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use taskbridge::cli::{Cli, Commands};
use taskbridge::config::{self, AppConfig};
use taskbridge::exchange::Coordinator;
use taskbridge::exchange::confirm::StdinConfirmation;
use taskbridge::exchange::indicator::{LogIndicator, Spinner, StatusIndicator};
use taskbridge::exchange::journal::ExchangeJournal;
use taskbridge::model::{Task, TaskBatch};
use taskbridge::research;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only instructions and results.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = config::load_config(&cli)?;
    let prompt_dir = std::env::current_dir()
        .context("Failed to resolve working directory")?
        .join(&config.prompt_dir);
    tracing::info!(
        prompt_dir = %prompt_dir.display(),
        unique_response_names = config.unique_response_names,
        strict_validation = config.strict_validation,
        "Config loaded"
    );

    if config.spinner && std::io::stderr().is_terminal() {
        let coordinator = build_coordinator(&prompt_dir, &config, Spinner);
        run(cli.command, &config, &coordinator).await
    } else {
        let coordinator = build_coordinator(&prompt_dir, &config, LogIndicator);
        run(cli.command, &config, &coordinator).await
    }
}

fn build_coordinator<S: StatusIndicator>(
    prompt_dir: &Path,
    config: &AppConfig,
    indicator: S,
) -> Coordinator<StdinConfirmation, S> {
    let coordinator = Coordinator::new(prompt_dir, StdinConfirmation::stdin(), indicator)
        .with_unique_response_names(config.unique_response_names)
        .with_strict_validation(config.strict_validation);

    if !config.journal {
        return coordinator;
    }
    match ExchangeJournal::open(prompt_dir) {
        Ok(journal) => coordinator.with_journal(journal),
        Err(e) => {
            tracing::warn!("Exchange journal disabled: {e:#}");
            coordinator
        }
    }
}

async fn run<S: StatusIndicator>(
    command: Commands,
    config: &AppConfig,
    coordinator: &Coordinator<StdinConfirmation, S>,
) -> anyhow::Result<()> {
    match command {
        Commands::ParsePrd { prd, output, .. } => {
            let content = tokio::fs::read_to_string(&prd)
                .await
                .with_context(|| format!("Failed to read PRD at {}", prd.display()))?;
            let batch = coordinator
                .generate_tasks(&content, &prd.display().to_string(), config.num_tasks)
                .await?;
            tracing::info!(tasks = batch.tasks.len(), "Tasks generated");
            emit(&batch, output.as_deref()).await
        }
        Commands::Expand {
            tasks,
            id,
            next_id,
            context,
            research: with_research,
            ..
        } => {
            let task = load_task(&tasks, id).await?;
            let subtasks = if with_research {
                research::subtasks_with_research(
                    coordinator,
                    &task,
                    config.num_subtasks,
                    next_id,
                    &context,
                )
                .await?
            } else {
                coordinator
                    .generate_subtasks(&task, config.num_subtasks, next_id, &context)
                    .await?
            };
            emit(&subtasks, None).await
        }
        Commands::Analyze {
            tasks,
            id,
            research: with_research,
        } => {
            let task = load_task(&tasks, id).await?;
            let analysis = if with_research {
                research::complexity_with_research(coordinator, &task).await?
            } else {
                coordinator.analyze_complexity(&task).await?
            };
            emit(&analysis, None).await
        }
        Commands::Research { query, context } => {
            let findings = coordinator.research(&query, &context).await?;
            emit(&findings, None).await
        }
    }
}

async fn load_task(tasks_path: &Path, id: u32) -> anyhow::Result<Task> {
    let text = tokio::fs::read_to_string(tasks_path)
        .await
        .with_context(|| format!("Failed to read task list at {}", tasks_path.display()))?;
    let batch: TaskBatch = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse task list at {}", tasks_path.display()))?;
    batch
        .find(id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Task {id} not found in {}", tasks_path.display()))
}

/// Pretty-print a result to `output`, or stdout when none is given.
async fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            tokio::fs::write(path, format!("{json}\n"))
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
