//! Domain models for taskdeck.
//!
//! # Core Concepts
//!
//! ## Board Entities
//!
//! - [`Project`]: Top-level container. Its [`WorkflowKind`] is fixed at
//!   creation and governs whether task statuses advance automatically.
//! - [`Task`]: A unit of work on a project board, carrying a lifecycle
//!   [`TaskStatus`] that the workflow engine may advance.
//! - [`Subtask`]: Checklist item owned by exactly one task. Completing the
//!   last open subtask is what drives automated status transitions.
//! - [`CustomColumn`]: User-defined board lane for CUSTOM-workflow projects.
//!
//! ## Collaboration Entities
//!
//! - [`ProjectMember`]: Links an external user id to a project with a role.
//! - [`Comment`]: Discussion attached to a task.
//! - [`Note`]: Free-form project documentation.
//!
//! ## Audit & Delivery
//!
//! - [`ActivityEntry`]: Append-only record of a status change. Written once
//!   per transition, never mutated or deleted here.
//! - [`Notification`]: Per-user inbox record with read/unread state.

mod activity;
mod column;
mod comment;
mod note;
mod notification;
mod project;
mod subtask;
mod task;

pub use activity::*;
pub use column::*;
pub use comment::*;
pub use note::*;
pub use notification::*;
pub use project::*;
pub use subtask::*;
pub use task::*;
