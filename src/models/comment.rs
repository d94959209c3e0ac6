use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A discussion comment attached to a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub task_id: i64,
    /// Authoring user. Opaque external id.
    pub author_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentInput {
    pub author_id: i64,
    pub content: String,
}
