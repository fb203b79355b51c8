//! Typed task data model.
//!
//! These are the shapes a parsed response must satisfy before it becomes part
//! of the task graph. Field names on the wire are camelCase to match the
//! output format requested in the prompts. Every field is required: serde
//! rejects a payload with a missing field instead of filling in a default.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a task or subtask. Freshly generated items are always
/// [`TaskStatus::Pending`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// A top-level development task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    /// IDs of prerequisite tasks; each must be lower than `id`.
    pub dependencies: Vec<u32>,
    pub priority: Priority,
    pub details: String,
    pub test_strategy: String,
}

/// A subtask produced by expanding a [`Task`].
///
/// Order is meaningful: earlier subtasks are prerequisites of later ones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub details: String,
    pub test_strategy: String,
}

/// Provenance block attached to a generated task list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMetadata {
    pub project_name: String,
    pub total_tasks: u32,
    pub source_file: String,
    pub generated_at: String,
}

/// Top-level object of a task generation response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskBatch {
    pub tasks: Vec<Task>,
    pub metadata: TaskMetadata,
}

impl TaskBatch {
    pub fn find(&self, id: u32) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityAnalysis {
    /// Echo of the analysed task's id.
    pub task_id: u32,
    /// 1 (trivial) through 10 (extremely complex).
    pub complexity_score: u8,
    pub explanation: String,
    /// Between 2 and 6 inclusive.
    pub recommended_subtasks: u8,
    pub complexity_factors: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeExample {
    pub language: String,
    pub description: String,
    pub code: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationLink {
    pub title: String,
    pub url: String,
    pub description: String,
}

/// Findings returned by a research exchange. Only consumed internally to
/// enrich a follow-up exchange, or printed by the `research` command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResult {
    pub query: String,
    pub analysis: String,
    pub code_examples: Vec<CodeExample>,
    pub best_practices: Vec<String>,
    pub pitfalls: Vec<String>,
    pub documentation_links: Vec<DocumentationLink>,
    pub summary: String,
}
