//! Semantic checks applied after a response has been deserialized.
//!
//! serde already guarantees shape (all fields present, right types). These
//! checks cover the invariants serde cannot express: id numbering, the
//! dependency ordering that keeps the task graph acyclic, and score ranges.
//! Each check returns a human-readable description of the first violation.

use crate::model::{ComplexityAnalysis, Subtask, TaskBatch, TaskStatus};

pub const COMPLEXITY_SCORE_RANGE: std::ops::RangeInclusive<u8> = 1..=10;
pub const RECOMMENDED_SUBTASKS_RANGE: std::ops::RangeInclusive<u8> = 2..=6;

/// Task ids must run 1, 2, 3, ... and every dependency must point at a lower id.
pub fn check_task_batch(batch: &TaskBatch) -> Result<(), String> {
    for (index, task) in batch.tasks.iter().enumerate() {
        let expected = index as u32 + 1;
        if task.id != expected {
            return Err(format!(
                "task at position {index} has id {}, expected {expected}",
                task.id
            ));
        }
        if task.status != TaskStatus::Pending {
            return Err(format!("task {} is not pending", task.id));
        }
        if let Some(dep) = task.dependencies.iter().find(|&&dep| dep >= task.id) {
            return Err(format!(
                "task {} depends on {dep}, which is not a lower id",
                task.id
            ));
        }
    }

    let total = batch.metadata.total_tasks as usize;
    if total != batch.tasks.len() {
        return Err(format!(
            "metadata.totalTasks is {total} but {} tasks were returned",
            batch.tasks.len()
        ));
    }
    Ok(())
}

/// Subtask ids must run contiguously from `next_subtask_id`.
pub fn check_subtasks(subtasks: &[Subtask], next_subtask_id: u32) -> Result<(), String> {
    for (offset, subtask) in subtasks.iter().enumerate() {
        let expected = u32::try_from(offset)
            .ok()
            .and_then(|offset| next_subtask_id.checked_add(offset))
            .ok_or_else(|| format!("subtask at position {offset} has an id past {}", u32::MAX))?;
        if subtask.id != expected {
            return Err(format!(
                "subtask at position {offset} has id {}, expected {expected}",
                subtask.id
            ));
        }
        if subtask.status != TaskStatus::Pending {
            return Err(format!("subtask {} is not pending", subtask.id));
        }
    }
    Ok(())
}

pub fn check_complexity(analysis: &ComplexityAnalysis, task_id: u32) -> Result<(), String> {
    if analysis.task_id != task_id {
        return Err(format!(
            "taskId is {}, expected {task_id}",
            analysis.task_id
        ));
    }
    if !COMPLEXITY_SCORE_RANGE.contains(&analysis.complexity_score) {
        return Err(format!(
            "complexityScore {} is outside 1-10",
            analysis.complexity_score
        ));
    }
    if !RECOMMENDED_SUBTASKS_RANGE.contains(&analysis.recommended_subtasks) {
        return Err(format!(
            "recommendedSubtasks {} is outside 2-6",
            analysis.recommended_subtasks
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, Task, TaskMetadata};

    fn task(id: u32, dependencies: Vec<u32>) -> Task {
        Task {
            id,
            title: format!("Task {id}"),
            description: "desc".to_string(),
            status: TaskStatus::Pending,
            dependencies,
            priority: Priority::Medium,
            details: "details".to_string(),
            test_strategy: "tests".to_string(),
        }
    }

    fn batch(tasks: Vec<Task>) -> TaskBatch {
        TaskBatch {
            metadata: TaskMetadata {
                project_name: "PRD Implementation".to_string(),
                total_tasks: tasks.len() as u32,
                source_file: "prd.txt".to_string(),
                generated_at: "2026-01-01".to_string(),
            },
            tasks,
        }
    }

    fn subtask(id: u32) -> Subtask {
        Subtask {
            id,
            title: format!("Subtask {id}"),
            description: "desc".to_string(),
            status: TaskStatus::Pending,
            details: "details".to_string(),
            test_strategy: "tests".to_string(),
        }
    }

    #[test]
    fn accepts_well_formed_batch() {
        let b = batch(vec![task(1, vec![]), task(2, vec![1]), task(3, vec![1, 2])]);
        assert!(check_task_batch(&b).is_ok());
    }

    #[test]
    fn rejects_forward_dependency() {
        let b = batch(vec![task(1, vec![2]), task(2, vec![])]);
        let err = check_task_batch(&b).unwrap_err();
        assert!(err.contains("depends on 2"), "{err}");
    }

    #[test]
    fn rejects_self_dependency() {
        let b = batch(vec![task(1, vec![]), task(2, vec![2])]);
        assert!(check_task_batch(&b).is_err());
    }

    #[test]
    fn rejects_gap_in_ids() {
        let b = batch(vec![task(1, vec![]), task(3, vec![1])]);
        let err = check_task_batch(&b).unwrap_err();
        assert!(err.contains("expected 2"), "{err}");
    }

    #[test]
    fn rejects_total_tasks_mismatch() {
        let mut b = batch(vec![task(1, vec![])]);
        b.metadata.total_tasks = 4;
        assert!(check_task_batch(&b).is_err());
    }

    #[test]
    fn subtasks_start_at_next_id() {
        assert!(check_subtasks(&[subtask(4), subtask(5)], 4).is_ok());
        assert!(check_subtasks(&[subtask(1), subtask(2)], 4).is_err());
        assert!(check_subtasks(&[subtask(4), subtask(6)], 4).is_err());
    }

    #[test]
    fn subtask_ids_past_max_are_violations_not_panics() {
        assert!(check_subtasks(&[subtask(u32::MAX)], u32::MAX).is_ok());
        let err = check_subtasks(&[subtask(u32::MAX), subtask(0)], u32::MAX).unwrap_err();
        assert!(err.contains("position 1"), "{err}");
    }

    #[test]
    fn complexity_ranges_are_enforced() {
        let mut analysis = ComplexityAnalysis {
            task_id: 7,
            complexity_score: 5,
            explanation: "moderate".to_string(),
            recommended_subtasks: 3,
            complexity_factors: vec!["auth".to_string()],
        };
        assert!(check_complexity(&analysis, 7).is_ok());
        assert!(check_complexity(&analysis, 8).is_err());

        analysis.complexity_score = 11;
        assert!(check_complexity(&analysis, 7).is_err());

        analysis.complexity_score = 10;
        analysis.recommended_subtasks = 1;
        assert!(check_complexity(&analysis, 7).is_err());
    }
}
