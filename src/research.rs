//! Research-augmented requests.
//!
//! Runs a research exchange first, then folds its findings into the context
//! of a subtask or complexity exchange. Both exchanges go through the same
//! [`Coordinator`] back to back. If research fails, its error is returned and
//! the dependent exchange never starts. The coordinator already logs each
//! exchange failure; this module only notes which step was skipped.

use crate::error::ExchangeError;
use crate::exchange::Coordinator;
use crate::exchange::confirm::Confirmation;
use crate::exchange::indicator::StatusIndicator;
use crate::model::{ComplexityAnalysis, ResearchResult, Subtask, Task};

pub fn subtask_research_query(task: &Task) -> String {
    format!(
        "Research best practices, implementation approaches, and technical considerations for: {} - {}",
        task.title, task.description
    )
}

pub fn complexity_research_query(task: &Task) -> String {
    format!(
        "Analyze implementation complexity factors for: {} - {}",
        task.title, task.description
    )
}

/// Context block handed to subtask generation: analysis, best practices and
/// code example descriptions, then any caller-supplied context.
pub fn subtask_context(research: &ResearchResult, additional_context: &str) -> String {
    let approaches = research
        .code_examples
        .iter()
        .map(|ex| format!("- {}", ex.description))
        .collect::<Vec<_>>()
        .join("\n");

    let mut context = format!(
        "\nBased on research findings:\n{}\n\nBest practices to consider:\n{}\n\nPotential implementation approaches:\n{}\n",
        research.analysis,
        research.best_practices.join("\n"),
        approaches,
    );
    if !additional_context.is_empty() {
        context.push_str(&format!("\nAdditional context provided: {additional_context}\n"));
    }
    context
}

/// Copy of `task` whose details are extended with research findings. Every
/// other field is unchanged, and the original details remain a substring.
pub fn enrich_task(task: &Task, research: &ResearchResult) -> Task {
    let original = if task.details.is_empty() {
        "No details provided"
    } else {
        task.details.as_str()
    };
    let details = format!(
        "{original}\n\nResearch-based complexity considerations:\n{}\n\nTechnical factors:\n{}\n\nImplementation challenges:\n{}\n",
        research.analysis,
        research.best_practices.join("\n"),
        research.pitfalls.join("\n"),
    );

    Task {
        details,
        ..task.clone()
    }
}

/// Generate subtasks for `task`, informed by a prior research exchange.
pub async fn subtasks_with_research<C, S>(
    coordinator: &Coordinator<C, S>,
    task: &Task,
    num_subtasks: u32,
    next_subtask_id: u32,
    additional_context: &str,
) -> Result<Vec<Subtask>, ExchangeError>
where
    C: Confirmation,
    S: StatusIndicator,
{
    tracing::info!("Generating research for task {} to help with subtask creation...", task.id);

    let research = coordinator
        .research(&subtask_research_query(task), &task.details)
        .await
        .inspect_err(|_| {
            tracing::error!("Research failed; skipping subtask generation for task {}", task.id)
        })?;

    let context = subtask_context(&research, additional_context);
    coordinator
        .generate_subtasks(task, num_subtasks, next_subtask_id, &context)
        .await
}

/// Analyse the complexity of `task` with research findings folded into its
/// details.
pub async fn complexity_with_research<C, S>(
    coordinator: &Coordinator<C, S>,
    task: &Task,
) -> Result<ComplexityAnalysis, ExchangeError>
where
    C: Confirmation,
    S: StatusIndicator,
{
    tracing::info!("Researching complexity factors for task {}...", task.id);

    let research = coordinator
        .research(&complexity_research_query(task), &task.details)
        .await
        .inspect_err(|_| {
            tracing::error!("Research failed; skipping complexity analysis for task {}", task.id)
        })?;

    let enriched = enrich_task(task, &research);
    coordinator.analyze_complexity(&enriched).await
}
