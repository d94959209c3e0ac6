use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-form project documentation (markdown supported).
///
/// Notes capture decisions, meeting minutes, or context that outlives any
/// single task. They belong to a project, not to the task lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNoteInput {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Input for updating a note. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNoteInput {
    pub title: Option<String>,
    pub content: Option<String>,
}
