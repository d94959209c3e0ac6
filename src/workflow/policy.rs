use crate::models::{Subtask, TaskStatus, WorkflowKind};

/// True only when the task has at least one subtask and every one of them is
/// complete. A task with no subtasks is never considered complete, so
/// creating the first subtask of a task can never advance it by itself.
pub fn all_subtasks_complete(subtasks: &[Subtask]) -> bool {
    !subtasks.is_empty() && subtasks.iter().all(|s| s.completed)
}

/// Decide what a subtask completion change means for the parent task.
///
/// Returns the status the task should move to, or `None` when it must stay
/// where it is. AUTOMATED projects advance a fully completed task to
/// IN_REVIEW; a task already at IN_REVIEW or COMPLETED is left alone, and
/// un-completing a subtask never moves a task backwards. CUSTOM projects
/// leave status entirely to the members.
pub fn decide(
    workflow: WorkflowKind,
    current: TaskStatus,
    all_complete: bool,
) -> Option<TaskStatus> {
    match workflow {
        WorkflowKind::Custom => None,
        WorkflowKind::Automated => {
            if !all_complete {
                return None;
            }
            match current {
                TaskStatus::Backlog | TaskStatus::InProgress => Some(TaskStatus::InReview),
                TaskStatus::InReview | TaskStatus::Completed => None,
            }
        }
    }
}
