//! Prompt/response exchange coordinator.
//!
//! An exchange writes a prompt to the prompt directory, waits for an operator
//! to save the assistant's answer to a known response path, then reads that
//! file back and parses it as JSON. All four exchange kinds share the single
//! [`Coordinator::run_exchange`] state machine; they differ only in prompt
//! template and file names.
//!
//! ```text
//! compose prompt -> [indicator] write prompt files -> print instructions
//!     -> confirm (indefinite) -> check response exists -> read -> parse
//! ```

pub mod confirm;
pub mod indicator;
pub mod journal;
pub mod prompt;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ExchangeError;
use crate::model::{ComplexityAnalysis, ResearchResult, Subtask, Task, TaskBatch};
use crate::schema;
use confirm::Confirmation;
use indicator::StatusIndicator;
use journal::{ExchangeJournal, JournalEntry};
use prompt::PromptFile;

/// Shown to the operator while the exchange is suspended.
pub const CONFIRM_MESSAGE: &str =
    "Press Enter once you have saved the assistant's response to continue...";

/// Default prompt directory, relative to the working directory.
pub const DEFAULT_PROMPT_DIR: &str = "cursor_prompts";

const RULE: &str = "--------------------------------------------------------------";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeKind {
    GenerateTasks,
    GenerateSubtasks,
    AnalyzeComplexity,
    Research,
}

impl ExchangeKind {
    pub const ALL: [ExchangeKind; 4] = [
        Self::GenerateTasks,
        Self::GenerateSubtasks,
        Self::AnalyzeComplexity,
        Self::Research,
    ];

    /// Prompt files written for this kind, in reading order.
    pub fn prompt_file_names(self) -> &'static [&'static str] {
        match self {
            Self::GenerateTasks => &["system_prompt.txt", "user_prompt.txt"],
            Self::GenerateSubtasks => &["subtask_prompt.txt"],
            Self::AnalyzeComplexity => &["complexity_prompt.txt"],
            Self::Research => &["research_prompt.txt"],
        }
    }

    /// Response file name without the `.json` extension.
    pub fn response_stem(self) -> &'static str {
        match self {
            Self::GenerateTasks => "cursor_response",
            Self::GenerateSubtasks => "subtask_response",
            Self::AnalyzeComplexity => "complexity_response",
            Self::Research => "research_response",
        }
    }

    fn activity(self) -> &'static str {
        match self {
            Self::GenerateTasks => "generating tasks",
            Self::GenerateSubtasks => "generating subtasks",
            Self::AnalyzeComplexity => "analyzing task complexity",
            Self::Research => "generating research",
        }
    }

    fn instruction_lines(self) -> (&'static str, &'static str) {
        match self {
            Self::GenerateTasks => (
                "To generate tasks with your assistant:",
                "Ask the assistant to generate the tasks based on these prompts",
            ),
            Self::GenerateSubtasks => (
                "To generate subtasks with your assistant:",
                "Ask the assistant to generate the subtasks based on this prompt",
            ),
            Self::AnalyzeComplexity => (
                "To analyze task complexity with your assistant:",
                "Ask the assistant to analyze the task complexity based on this prompt",
            ),
            Self::Research => (
                "To generate research with your assistant:",
                "Ask the assistant to research this topic and respond in the requested format",
            ),
        }
    }
}

impl fmt::Display for ExchangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GenerateTasks => "task generation",
            Self::GenerateSubtasks => "subtask generation",
            Self::AnalyzeComplexity => "complexity analysis",
            Self::Research => "research",
        };
        f.write_str(name)
    }
}

/// Inputs for one exchange. The variant determines the [`ExchangeKind`].
#[derive(Clone, Debug)]
pub enum ExchangeRequest<'a> {
    GenerateTasks {
        prd_content: &'a str,
        prd_path: &'a str,
        num_tasks: u32,
    },
    GenerateSubtasks {
        task: &'a Task,
        num_subtasks: u32,
        next_subtask_id: u32,
        additional_context: &'a str,
    },
    AnalyzeComplexity {
        task: &'a Task,
    },
    Research {
        query: &'a str,
        context: &'a str,
    },
}

impl ExchangeRequest<'_> {
    pub fn kind(&self) -> ExchangeKind {
        match self {
            Self::GenerateTasks { .. } => ExchangeKind::GenerateTasks,
            Self::GenerateSubtasks { .. } => ExchangeKind::GenerateSubtasks,
            Self::AnalyzeComplexity { .. } => ExchangeKind::AnalyzeComplexity,
            Self::Research { .. } => ExchangeKind::Research,
        }
    }

    /// Reject inputs no prompt can be composed for: zero counts, and subtask
    /// ids running past `u32::MAX`.
    pub fn validate(&self) -> Result<(), ExchangeError> {
        let invalid = |message: String| {
            Err(ExchangeError::InvalidRequest {
                kind: self.kind(),
                message,
            })
        };
        match *self {
            Self::GenerateTasks { num_tasks: 0, .. } => {
                invalid("task count must be at least 1".to_string())
            }
            Self::GenerateSubtasks { num_subtasks: 0, .. } => {
                invalid("subtask count must be at least 1".to_string())
            }
            Self::GenerateSubtasks {
                num_subtasks,
                next_subtask_id,
                ..
            } if next_subtask_id.checked_add(num_subtasks - 1).is_none() => invalid(format!(
                "{num_subtasks} subtasks starting at id {next_subtask_id} overflow the id range"
            )),
            _ => Ok(()),
        }
    }

    /// Message for the busy indicator.
    pub fn status_message(&self) -> String {
        match self {
            Self::GenerateTasks { .. } => "Generating tasks from PRD...".to_string(),
            Self::GenerateSubtasks {
                task, num_subtasks, ..
            } => format!(
                "Preparing to generate {num_subtasks} subtasks for task {}...",
                task.id
            ),
            Self::AnalyzeComplexity { task } => {
                format!("Preparing complexity analysis for task {}...", task.id)
            }
            Self::Research { query, .. } => format!("Preparing research for: {query}..."),
        }
    }
}

/// Resolved on-disk locations for one exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeFiles {
    pub prompts: Vec<PathBuf>,
    pub response: PathBuf,
}

impl ExchangeFiles {
    /// With a `correlation` id the response file becomes
    /// `<stem>-<correlation>.json`, so a file left over from another run
    /// can never be mistaken for this exchange's answer.
    pub fn resolve(prompt_dir: &Path, kind: ExchangeKind, correlation: Option<&str>) -> Self {
        let stem = kind.response_stem();
        let response = match correlation {
            Some(id) => format!("{stem}-{id}.json"),
            None => format!("{stem}.json"),
        };
        Self {
            prompts: kind
                .prompt_file_names()
                .iter()
                .map(|name| prompt_dir.join(name))
                .collect(),
            response: prompt_dir.join(response),
        }
    }
}

/// Operator-facing instructions naming the prompt and response paths.
pub fn instructions(kind: ExchangeKind, files: &ExchangeFiles) -> String {
    let (heading, ask) = kind.instruction_lines();
    let mut out = format!("\n{RULE}\n{heading}\n");

    if let [system, user] = files.prompts.as_slice() {
        out.push_str("1. Open the following files in your assistant:\n");
        out.push_str(&format!("   - System prompt: {}\n", system.display()));
        out.push_str(&format!("   - User prompt: {}\n", user.display()));
    } else {
        out.push_str("1. Open the following file in your assistant:\n");
        for path in &files.prompts {
            out.push_str(&format!("   - {}\n", path.display()));
        }
    }
    out.push_str(&format!("2. {ask}\n"));
    out.push_str("3. Save the response as JSON to:\n");
    out.push_str(&format!("   - {}\n", files.response.display()));
    out.push_str("4. Continue this process when ready\n");
    out.push_str(RULE);
    out.push('\n');
    out
}

/// Drives exchanges one at a time through the file-based handoff.
pub struct Coordinator<C, S> {
    prompt_dir: PathBuf,
    confirmation: C,
    indicator: S,
    unique_response_names: bool,
    strict_validation: bool,
    journal: Option<Mutex<ExchangeJournal>>,
}

impl<C: Confirmation, S: StatusIndicator> Coordinator<C, S> {
    pub fn new(prompt_dir: impl Into<PathBuf>, confirmation: C, indicator: S) -> Self {
        Self {
            prompt_dir: prompt_dir.into(),
            confirmation,
            indicator,
            unique_response_names: false,
            strict_validation: true,
            journal: None,
        }
    }

    pub fn with_unique_response_names(mut self, enabled: bool) -> Self {
        self.unique_response_names = enabled;
        self
    }

    pub fn with_strict_validation(mut self, enabled: bool) -> Self {
        self.strict_validation = enabled;
        self
    }

    pub fn with_journal(mut self, journal: ExchangeJournal) -> Self {
        self.journal = Some(Mutex::new(journal));
        self
    }

    pub fn prompt_dir(&self) -> &Path {
        &self.prompt_dir
    }

    /// Run one exchange and return the parsed response as-is.
    ///
    /// # Errors
    ///
    /// - [`ExchangeError::Filesystem`] if the prompt directory or files cannot
    ///   be written, or the response cannot be read.
    /// - [`ExchangeError::Confirmation`] if the confirmation port fails.
    /// - [`ExchangeError::MissingResponse`] if no response file exists after
    ///   confirmation.
    /// - [`ExchangeError::MalformedResponse`] if the response is not JSON.
    ///
    /// - [`ExchangeError::InvalidRequest`] if a count is zero or the subtask
    ///   ids would not fit in a `u32`. Nothing is written in that case.
    ///
    /// Every error is logged at error level before being returned.
    pub async fn run_exchange(&self, request: &ExchangeRequest<'_>) -> Result<Value, ExchangeError> {
        let kind = request.kind();
        self.drive(request)
            .await
            .map_err(|e| self.fail(kind, e))
    }

    async fn drive(&self, request: &ExchangeRequest<'_>) -> Result<Value, ExchangeError> {
        let kind = request.kind();
        request.validate()?;
        let prompts = prompt::compose(request);
        let correlation = self
            .unique_response_names
            .then(|| Uuid::new_v4().simple().to_string()[..8].to_string());
        let files = ExchangeFiles::resolve(&self.prompt_dir, kind, correlation.as_deref());
        self.record(JournalEntry::start(kind, &files.response));

        let handle = self.indicator.start(&request.status_message());
        let written = self.write_prompts(&files, &prompts).await;
        self.indicator.stop(handle).await;
        written?;
        self.record(JournalEntry::prompt_written(kind, &files.prompts));

        if tokio::fs::try_exists(&files.response).await.unwrap_or(false) {
            tracing::warn!(
                path = %files.response.display(),
                "Response file already exists before confirmation; it may be left over from an earlier run"
            );
        }

        println!("{}", instructions(kind, &files));
        self.confirmation
            .confirm(CONFIRM_MESSAGE, &files)
            .await
            .map_err(ExchangeError::Confirmation)?;

        let (value, bytes) = read_response(&files.response).await?;
        tracing::info!(kind = %kind, path = %files.response.display(), bytes, "Response accepted");
        self.record(JournalEntry::response_accepted(kind, &files.response, bytes));
        Ok(value)
    }

    async fn write_prompts(
        &self,
        files: &ExchangeFiles,
        prompts: &[PromptFile],
    ) -> Result<(), ExchangeError> {
        tokio::fs::create_dir_all(&self.prompt_dir)
            .await
            .map_err(|e| ExchangeError::filesystem(&self.prompt_dir, e))?;

        for (path, prompt) in files.prompts.iter().zip(prompts) {
            tokio::fs::write(path, &prompt.contents)
                .await
                .map_err(|e| ExchangeError::filesystem(path, e))?;
            tracing::debug!(path = %path.display(), "Prompt written");
        }
        Ok(())
    }

    /// Generate a dependency-ordered task list from a PRD.
    pub async fn generate_tasks(
        &self,
        prd_content: &str,
        prd_path: &str,
        num_tasks: u32,
    ) -> Result<TaskBatch, ExchangeError> {
        let kind = ExchangeKind::GenerateTasks;
        let value = self
            .run_exchange(&ExchangeRequest::GenerateTasks {
                prd_content,
                prd_path,
                num_tasks,
            })
            .await?;
        let batch: TaskBatch = self.decode(kind, value)?;

        if batch.tasks.len() != num_tasks as usize {
            tracing::warn!(
                requested = num_tasks,
                returned = batch.tasks.len(),
                "Task count differs from the requested number"
            );
        }
        self.enforce(kind, schema::check_task_batch(&batch))?;
        Ok(batch)
    }

    /// Expand `task` into `num_subtasks` subtasks numbered from `next_subtask_id`.
    pub async fn generate_subtasks(
        &self,
        task: &Task,
        num_subtasks: u32,
        next_subtask_id: u32,
        additional_context: &str,
    ) -> Result<Vec<Subtask>, ExchangeError> {
        let kind = ExchangeKind::GenerateSubtasks;
        let value = self
            .run_exchange(&ExchangeRequest::GenerateSubtasks {
                task,
                num_subtasks,
                next_subtask_id,
                additional_context,
            })
            .await?;
        let subtasks: Vec<Subtask> = self.decode(kind, value)?;

        if subtasks.len() != num_subtasks as usize {
            tracing::warn!(
                task_id = task.id,
                requested = num_subtasks,
                returned = subtasks.len(),
                "Subtask count differs from the requested number"
            );
        }
        self.enforce(kind, schema::check_subtasks(&subtasks, next_subtask_id))?;
        Ok(subtasks)
    }

    pub async fn analyze_complexity(&self, task: &Task) -> Result<ComplexityAnalysis, ExchangeError> {
        let kind = ExchangeKind::AnalyzeComplexity;
        let value = self
            .run_exchange(&ExchangeRequest::AnalyzeComplexity { task })
            .await?;
        let analysis: ComplexityAnalysis = self.decode(kind, value)?;
        self.enforce(kind, schema::check_complexity(&analysis, task.id))?;
        Ok(analysis)
    }

    pub async fn research(&self, query: &str, context: &str) -> Result<ResearchResult, ExchangeError> {
        let value = self
            .run_exchange(&ExchangeRequest::Research { query, context })
            .await?;
        self.decode(ExchangeKind::Research, value)
    }

    fn decode<T: DeserializeOwned>(&self, kind: ExchangeKind, value: Value) -> Result<T, ExchangeError> {
        serde_json::from_value(value)
            .map_err(|e| self.fail(kind, ExchangeError::schema(kind, e.to_string())))
    }

    /// Semantic violations are fatal in strict mode and warnings otherwise.
    fn enforce(&self, kind: ExchangeKind, check: Result<(), String>) -> Result<(), ExchangeError> {
        match check {
            Ok(()) => Ok(()),
            Err(message) if self.strict_validation => {
                Err(self.fail(kind, ExchangeError::schema(kind, message)))
            }
            Err(message) => {
                tracing::warn!(kind = %kind, "Accepting response despite schema violation: {message}");
                Ok(())
            }
        }
    }

    fn fail(&self, kind: ExchangeKind, error: ExchangeError) -> ExchangeError {
        tracing::error!("Error {}: {error}", kind.activity());
        self.record(JournalEntry::failed(kind, error.to_string()));
        error
    }

    /// Journal write failures never fail the exchange.
    fn record(&self, entry: JournalEntry) {
        let Some(journal) = &self.journal else {
            return;
        };
        let mut journal = journal.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = journal.record(&entry) {
            tracing::warn!(
                "Failed to write exchange journal at {}: {e:#}",
                journal.path().display()
            );
        }
    }
}

async fn read_response(path: &Path) -> Result<(Value, usize), ExchangeError> {
    let missing = || ExchangeError::MissingResponse {
        path: path.to_path_buf(),
    };

    match tokio::fs::try_exists(path).await {
        Ok(true) => {}
        Ok(false) => return Err(missing()),
        Err(e) => return Err(ExchangeError::filesystem(path, e)),
    }

    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            missing()
        } else {
            ExchangeError::filesystem(path, e)
        }
    })?;

    let value = serde_json::from_str(&text).map_err(|source| ExchangeError::MalformedResponse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((value, text.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn response_paths_are_distinct_per_kind() {
        let dir = Path::new("/work/cursor_prompts");
        let responses: HashSet<PathBuf> = ExchangeKind::ALL
            .iter()
            .map(|&kind| ExchangeFiles::resolve(dir, kind, None).response)
            .collect();
        assert_eq!(responses.len(), 4);
    }

    #[test]
    fn fixed_file_names_match_layout() {
        let dir = Path::new("p");
        let tasks = ExchangeFiles::resolve(dir, ExchangeKind::GenerateTasks, None);
        assert_eq!(
            tasks.prompts,
            vec![dir.join("system_prompt.txt"), dir.join("user_prompt.txt")]
        );
        assert_eq!(tasks.response, dir.join("cursor_response.json"));

        let complexity = ExchangeFiles::resolve(dir, ExchangeKind::AnalyzeComplexity, None);
        assert_eq!(complexity.prompts, vec![dir.join("complexity_prompt.txt")]);
        assert_eq!(complexity.response, dir.join("complexity_response.json"));
    }

    #[test]
    fn correlation_id_suffixes_response_only() {
        let dir = Path::new("p");
        let files = ExchangeFiles::resolve(dir, ExchangeKind::GenerateSubtasks, Some("1a2b3c4d"));
        assert_eq!(files.prompts, vec![dir.join("subtask_prompt.txt")]);
        assert_eq!(files.response, dir.join("subtask_response-1a2b3c4d.json"));
    }

    #[test]
    fn instructions_name_both_task_prompts_and_response() {
        let files = ExchangeFiles::resolve(Path::new("p"), ExchangeKind::GenerateTasks, None);
        let text = instructions(ExchangeKind::GenerateTasks, &files);
        assert!(text.contains("System prompt: p/system_prompt.txt"));
        assert!(text.contains("User prompt: p/user_prompt.txt"));
        assert!(text.contains("   - p/cursor_response.json"));
    }

    #[test]
    fn instructions_for_single_prompt_kinds() {
        let files = ExchangeFiles::resolve(Path::new("p"), ExchangeKind::Research, None);
        let text = instructions(ExchangeKind::Research, &files);
        assert!(text.contains("To generate research with your assistant:"));
        assert!(text.contains("   - p/research_prompt.txt"));
        assert!(text.contains("   - p/research_response.json"));
    }

    #[test]
    fn overflowing_subtask_ids_are_rejected() {
        let task = crate::model::Task {
            id: 1,
            title: "t".to_string(),
            description: "d".to_string(),
            status: crate::model::TaskStatus::Pending,
            dependencies: vec![],
            priority: crate::model::Priority::Low,
            details: String::new(),
            test_strategy: String::new(),
        };
        let request = |num_subtasks, next_subtask_id| ExchangeRequest::GenerateSubtasks {
            task: &task,
            num_subtasks,
            next_subtask_id,
            additional_context: "",
        };

        assert!(request(1, u32::MAX).validate().is_ok());
        assert!(matches!(
            request(3, u32::MAX).validate(),
            Err(ExchangeError::InvalidRequest { .. })
        ));
        assert!(request(0, 1).validate().is_err());
        assert!(request(3, 1).validate().is_ok());
    }

    #[test]
    fn zero_task_count_is_rejected() {
        let request = ExchangeRequest::GenerateTasks {
            prd_content: "PRD",
            prd_path: "prd.txt",
            num_tasks: 0,
        };
        assert!(matches!(
            request.validate(),
            Err(ExchangeError::InvalidRequest { kind: ExchangeKind::GenerateTasks, .. })
        ));
    }

    #[test]
    fn kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(ExchangeKind::AnalyzeComplexity).unwrap(),
            serde_json::json!("analyze_complexity")
        );
        assert_eq!(ExchangeKind::GenerateSubtasks.to_string(), "subtask generation");
    }
}
