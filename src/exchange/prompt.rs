//! Prompt templates for each exchange kind.
//!
//! Composition is deterministic: the same request always yields byte-identical
//! prompt text. Every input value is embedded verbatim, alongside a
//! description of the required output shape and the instruction to answer
//! with JSON only.

use super::ExchangeRequest;
use crate::model::Task;

/// One prompt file to be written for an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptFile {
    pub name: &'static str,
    pub contents: String,
}

const JSON_ONLY: &str =
    "Important: Your response must be valid JSON only, with no additional explanation or comments.";

const NO_DETAILS: &str = "No additional details provided";

/// Compose the prompt file(s) for a request, in the order the operator
/// should read them.
pub fn compose(request: &ExchangeRequest<'_>) -> Vec<PromptFile> {
    let names = request.kind().prompt_file_names();
    let contents = match request {
        ExchangeRequest::GenerateTasks {
            prd_content,
            prd_path,
            num_tasks,
        } => vec![
            task_system_prompt(prd_path, *num_tasks),
            format!(
                "Here's the Product Requirements Document (PRD) to break down into {num_tasks} tasks:\n\n{prd_content}"
            ),
        ],
        ExchangeRequest::GenerateSubtasks {
            task,
            num_subtasks,
            next_subtask_id,
            additional_context,
        } => vec![subtask_prompt(
            task,
            *num_subtasks,
            *next_subtask_id,
            additional_context,
        )],
        ExchangeRequest::AnalyzeComplexity { task } => vec![complexity_prompt(task)],
        ExchangeRequest::Research { query, context } => vec![research_prompt(query, context)],
    };

    names
        .iter()
        .zip(contents)
        .map(|(&name, contents)| PromptFile { name, contents })
        .collect()
}

fn task_system_prompt(prd_path: &str, num_tasks: u32) -> String {
    format!(
        r#"You are an AI assistant helping to break down a Product Requirements Document (PRD) into a set of sequential development tasks.
Your goal is to create {num_tasks} well-structured, actionable development tasks based on the PRD provided.

Each task should follow this JSON structure:
{{
  "id": number,
  "title": string,
  "description": string,
  "status": "pending",
  "dependencies": number[] (IDs of tasks this depends on),
  "priority": "high" | "medium" | "low",
  "details": string (implementation details),
  "testStrategy": string (validation approach)
}}

Guidelines:
1. Create exactly {num_tasks} tasks, numbered from 1 to {num_tasks}
2. Each task should be atomic and focused on a single responsibility
3. Order tasks logically - consider dependencies and implementation sequence
4. Early tasks should focus on setup, core functionality first, then advanced features
5. Include clear validation/testing approach for each task
6. Set appropriate dependency IDs (a task can only depend on tasks with lower IDs)
7. Assign priority (high/medium/low) based on criticality and dependency order
8. Include detailed implementation guidance in the "details" field

Expected output format:
{{
  "tasks": [
    {{
      "id": 1,
      "title": "Setup Project Repository",
      "description": "...",
      ...
    }},
    ...
  ],
  "metadata": {{
    "projectName": "PRD Implementation",
    "totalTasks": {num_tasks},
    "sourceFile": "{prd_path}",
    "generatedAt": "YYYY-MM-DD"
  }}
}}

{JSON_ONLY}"#
    )
}

/// The `Title/Description/Details` block shared by the subtask and
/// complexity prompts.
fn task_block(task: &Task) -> String {
    let details = if task.details.is_empty() {
        NO_DETAILS
    } else {
        task.details.as_str()
    };
    format!(
        "Title: {}\nDescription: {}\nDetails: {details}",
        task.title, task.description
    )
}

fn additional_context_line(context: &str) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!("Additional context: {context}\n")
    }
}

fn subtask_prompt(
    task: &Task,
    num_subtasks: u32,
    next_subtask_id: u32,
    additional_context: &str,
) -> String {
    let last_id = next_subtask_id.saturating_add(num_subtasks.saturating_sub(1));
    let task_block = task_block(task);
    let context = additional_context_line(additional_context);
    format!(
        r#"You are an expert software developer breaking down a development task into smaller subtasks.

Task to break down:
{task_block}

{context}
Create exactly {num_subtasks} subtasks that divide this task into logical, manageable pieces.
Each subtask should follow this JSON format:
{{
  "id": number,  // Subtask ID, starting from {next_subtask_id}
  "title": string,  // Brief, descriptive title
  "description": string,  // What needs to be done
  "status": "pending",
  "details": string,  // Implementation details and guidance
  "testStrategy": string  // How to verify this subtask is complete
}}

Guidelines:
1. Create exactly {num_subtasks} subtasks, numbered from {next_subtask_id} to {last_id}
2. Each subtask should be atomic and focused
3. Order subtasks logically - earlier subtasks should be prerequisites for later ones
4. Include clear implementation details and testing approach
5. Make sure all aspects of the parent task are covered by the subtasks

Expected output format:
[
  {{
    "id": {next_subtask_id},
    "title": "First Subtask",
    "description": "...",
    ...
  }},
  ...
]

Important: Your response must be valid JSON array only, with no additional explanation or comments."#
    )
}

fn complexity_prompt(task: &Task) -> String {
    let task_block = task_block(task);
    let task_id = task.id;
    format!(
        r#"You are an expert software developer analyzing the complexity of a development task.

Task to analyze:
{task_block}

Analyze this task and provide:
1. A complexity score from 1-10 (where 1 is trivial and 10 is extremely complex)
2. A brief explanation of why you assigned this score
3. Recommended number of subtasks (between 2-6)
4. List of factors contributing to complexity

Expected output format:
{{
  "taskId": {task_id},
  "complexityScore": number,
  "explanation": string,
  "recommendedSubtasks": number,
  "complexityFactors": [
    string,
    string,
    ...
  ]
}}

{JSON_ONLY}"#
    )
}

fn research_prompt(query: &str, context: &str) -> String {
    let context = additional_context_line(context);
    format!(
        r#"You are an AI research assistant helping a developer with a technical question.

Research query: {query}

{context}
Please conduct detailed research on this topic and provide:
1. A thorough analysis of the question
2. Relevant code examples and implementation approaches
3. Best practices and potential pitfalls
4. Links to relevant documentation (if applicable)
5. A summary of your findings

Expected output format:
{{
  "query": "{query}",
  "analysis": string,
  "codeExamples": [
    {{
      "language": string,
      "description": string,
      "code": string
    }},
    ...
  ],
  "bestPractices": [
    string,
    ...
  ],
  "pitfalls": [
    string,
    ...
  ],
  "documentationLinks": [
    {{
      "title": string,
      "url": string,
      "description": string
    }},
    ...
  ],
  "summary": string
}}

{JSON_ONLY}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, TaskStatus};

    fn sample_task() -> Task {
        Task {
            id: 4,
            title: "Build REST API".to_string(),
            description: "Expose task endpoints".to_string(),
            status: TaskStatus::Pending,
            dependencies: vec![1, 2],
            priority: Priority::High,
            details: "Use axum with JSON bodies".to_string(),
            test_strategy: "Integration tests".to_string(),
        }
    }

    #[test]
    fn task_generation_writes_system_and_user_prompts() {
        let files = compose(&ExchangeRequest::GenerateTasks {
            prd_content: "A todo app with sharing.",
            prd_path: "docs/prd.txt",
            num_tasks: 7,
        });

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "system_prompt.txt");
        assert_eq!(files[1].name, "user_prompt.txt");
        assert!(files[0].contents.contains("Create exactly 7 tasks, numbered from 1 to 7"));
        assert!(files[0].contents.contains(r#""sourceFile": "docs/prd.txt""#));
        assert!(files[0].contents.ends_with(JSON_ONLY));
        assert!(files[1].contents.ends_with("A todo app with sharing."));
    }

    #[test]
    fn subtask_prompt_numbers_from_next_id() {
        let task = sample_task();
        let files = compose(&ExchangeRequest::GenerateSubtasks {
            task: &task,
            num_subtasks: 3,
            next_subtask_id: 5,
            additional_context: "",
        });

        let prompt = &files[0].contents;
        assert_eq!(files[0].name, "subtask_prompt.txt");
        assert!(prompt.contains("Title: Build REST API"));
        assert!(prompt.contains("Description: Expose task endpoints"));
        assert!(prompt.contains("Details: Use axum with JSON bodies"));
        assert!(prompt.contains("numbered from 5 to 7"));
        assert!(prompt.contains(r#""id": 5,"#));
        assert!(!prompt.contains("Additional context:"));
    }

    #[test]
    fn subtask_prompt_includes_additional_context_when_given() {
        let task = sample_task();
        let files = compose(&ExchangeRequest::GenerateSubtasks {
            task: &task,
            num_subtasks: 2,
            next_subtask_id: 1,
            additional_context: "Prefer tower middleware",
        });
        assert!(files[0].contents.contains("Additional context: Prefer tower middleware\n"));
    }

    #[test]
    fn subtask_ids_near_max_do_not_panic() {
        let task = sample_task();
        let files = compose(&ExchangeRequest::GenerateSubtasks {
            task: &task,
            num_subtasks: 3,
            next_subtask_id: u32::MAX,
            additional_context: "",
        });
        assert!(files[0].contents.contains(&format!("numbered from {} to {}", u32::MAX, u32::MAX)));
    }

    #[test]
    fn empty_details_use_placeholder() {
        let mut task = sample_task();
        task.details.clear();
        let files = compose(&ExchangeRequest::AnalyzeComplexity { task: &task });
        assert!(files[0].contents.contains("Details: No additional details provided"));
        assert!(files[0].contents.contains(r#""taskId": 4,"#));
    }

    #[test]
    fn research_prompt_embeds_query_twice() {
        let files = compose(&ExchangeRequest::Research {
            query: "How to shard SQLite?",
            context: "",
        });
        let prompt = &files[0].contents;
        assert_eq!(files[0].name, "research_prompt.txt");
        assert!(prompt.contains("Research query: How to shard SQLite?"));
        assert!(prompt.contains(r#""query": "How to shard SQLite?""#));
    }

    #[test]
    fn composition_is_deterministic_and_input_sensitive() {
        let a = compose(&ExchangeRequest::Research {
            query: "Q",
            context: "c",
        });
        let b = compose(&ExchangeRequest::Research {
            query: "Q",
            context: "c",
        });
        let c = compose(&ExchangeRequest::Research {
            query: "Q",
            context: "d",
        });
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
