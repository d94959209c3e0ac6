use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An append-only audit record of a task field change.
///
/// The activity trail is like `git log` for a board: it answers "what
/// changed, from what, to what, and when". Entries are written exactly once
/// per status change (whether it came from the workflow engine or from a
/// manual edit) and are never mutated or deleted by this service.
///
/// `task_title` is a snapshot taken at write time, so the trail stays
/// readable after the task itself is renamed or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: i64,
    pub project_id: i64,
    pub task_id: i64,
    pub task_title: String,
    /// Name of the changed field. Currently always `"status"`.
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    pub created_at: DateTime<Utc>,
}

/// A pending activity record, built by callers of the recorder.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub project_id: i64,
    pub task_id: i64,
    pub task_title: String,
    pub field: String,
    pub old_value: String,
    pub new_value: String,
}

impl NewActivity {
    /// Build a status-change record from the transition endpoints.
    pub fn status_change(
        project_id: i64,
        task_id: i64,
        task_title: impl Into<String>,
        old: crate::models::TaskStatus,
        new: crate::models::TaskStatus,
    ) -> Self {
        Self {
            project_id,
            task_id,
            task_title: task_title.into(),
            field: "status".to_string(),
            old_value: old.as_str().to_string(),
            new_value: new.as_str().to_string(),
        }
    }
}
