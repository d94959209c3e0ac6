use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project containing tasks, members, notes, and an activity trail.
///
/// Projects are the top-level organizational unit. The [`WorkflowKind`] chosen
/// at creation decides how the board behaves and is **immutable** afterwards:
/// switching a live board between automated and custom semantics is not
/// supported, so the update input deliberately carries no workflow field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Governs automated status transitions. Fixed at creation.
    pub workflow: WorkflowKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-project workflow configuration.
///
/// - `Automated`: completing the last open subtask moves the owning task to
///   `IN_REVIEW` automatically.
/// - `Custom`: statuses only change through explicit user action; the
///   workflow engine never touches tasks on these boards.
///
/// The wire spelling (`AUTOMATED` / `CUSTOM`) is part of the client contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowKind {
    Automated,
    Custom,
}

impl WorkflowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Automated => "AUTOMATED",
            Self::Custom => "CUSTOM",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "AUTOMATED" => Some(Self::Automated),
            "CUSTOM" => Some(Self::Custom),
            _ => None,
        }
    }
}

/// A user's membership in a project.
///
/// User identity lives outside this service; `user_id` is an opaque numeric
/// id issued by the authentication layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMember {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub role: MemberRole,
    pub created_at: DateTime<Utc>,
}

/// Role of a member within a project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Owner,
    Member,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Member => "MEMBER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "OWNER" => Some(Self::Owner),
            "MEMBER" => Some(Self::Member),
            _ => None,
        }
    }
}

/// Input for creating a new project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectInput {
    pub name: String,
    pub description: Option<String>,
    /// Workflow mode. Defaults to `Automated` if not specified.
    pub workflow: Option<WorkflowKind>,
}

/// Input for updating an existing project. All fields are optional for
/// partial updates. The workflow mode is intentionally absent: it cannot be
/// changed after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProjectInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Input for adding a member to a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMemberInput {
    pub user_id: i64,
    /// Defaults to `Member` if not specified.
    pub role: Option<MemberRole>,
}
