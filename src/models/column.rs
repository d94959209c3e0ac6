use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-defined board lane.
///
/// Projects with a CUSTOM workflow arrange tasks in their own columns
/// instead of the built-in status lanes. Columns are plain display
/// structure: they carry no transition semantics and the workflow engine
/// ignores them entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomColumn {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateColumnInput {
    pub name: String,
    /// Defaults to the end of the board if not specified.
    pub position: Option<i64>,
}

/// Input for updating a column. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateColumnInput {
    pub name: Option<String>,
    pub position: Option<i64>,
}
