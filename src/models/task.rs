use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::subtask::Subtask;

/// A unit of work on a project board.
///
/// Tasks carry the lifecycle [`TaskStatus`] that the workflow engine manages.
/// On AUTOMATED boards the engine advances a task to `InReview` when its last
/// open subtask is completed; the engine never moves a task backward, so
/// reopening a subtask later leaves the status where it is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Display order within the board lane. Stable for sorting, not unique.
    pub position: i64,
    /// Assigned user, if any. Opaque external id.
    pub assignee_id: Option<i64>,
    pub tags: Vec<String>,
    /// Custom board lane, for projects with a CUSTOM workflow.
    pub column_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The lifecycle status of a task.
///
/// The member set and its `SCREAMING_SNAKE_CASE` spelling are part of the
/// client contract. The automated workflow only ever moves a task *forward*
/// along this sequence (and only into `InReview`); `Completed` is terminal
/// and reached through explicit user action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Backlog,
    InProgress,
    InReview,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "BACKLOG",
            Self::InProgress => "IN_PROGRESS",
            Self::InReview => "IN_REVIEW",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "BACKLOG" => Some(Self::Backlog),
            "IN_PROGRESS" => Some(Self::InProgress),
            "IN_REVIEW" => Some(Self::InReview),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Task priority for board sorting and display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            _ => None,
        }
    }
}

/// Input for creating a new task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: Option<String>,
    /// Initial status. Defaults to `Backlog` if not specified.
    pub status: Option<TaskStatus>,
    /// Defaults to `Medium` if not specified.
    pub priority: Option<TaskPriority>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub assignee_id: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub column_id: Option<i64>,
}

/// Input for updating a task. All fields are optional for partial updates;
/// an absent field leaves the stored value untouched.
///
/// Manual status edits made through this input are audited exactly like
/// engine-driven transitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub position: Option<i64>,
    pub assignee_id: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub column_id: Option<i64>,
}

/// A task with its ordered subtask checklist, used for detail responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskWithSubtasks {
    #[serde(flatten)]
    pub task: Task,
    pub subtasks: Vec<Subtask>,
}
