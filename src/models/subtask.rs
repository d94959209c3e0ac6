use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A checklist item owned by exactly one task.
///
/// Subtasks are the completion criteria the workflow engine watches: on
/// AUTOMATED boards, a task whose subtasks are all completed is moved to
/// review. A task with no subtasks is never considered complete by that
/// signal; the feature only engages for tasks that actually use the
/// checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtask {
    pub id: i64,
    pub task_id: i64,
    pub title: String,
    pub completed: bool,
    /// Display order within the checklist. Stable for sorting, not unique.
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new subtask. New subtasks start incomplete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubtaskInput {
    pub title: String,
    /// Defaults to the end of the checklist if not specified.
    pub position: Option<i64>,
}

/// Input for updating a subtask. All fields are optional for partial updates.
///
/// Whether `completed` is present in the payload matters beyond its value:
/// the update handler runs the workflow engine only when the field was
/// touched. Title or position edits alone never trigger a board transition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSubtaskInput {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub position: Option<i64>,
}
