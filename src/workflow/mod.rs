//! Task-completion workflow.
//!
//! When a subtask flips between complete and incomplete, the engine decides
//! whether the parent task should advance, persists the move, writes it to
//! the project activity trail, and hands the transition to the configured
//! hook so interested parties can be told about it.
//!
//! The decision rules live in [`policy`] as pure functions; the engine only
//! sequences reads and writes around them.

mod policy;
mod recorder;

pub use policy::{all_subtasks_complete, decide};
pub use recorder::ActivityRecorder;

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::db::Database;
use crate::models::{NewActivity, NewNotification, NotificationKind, TaskStatus};

/// A status change the engine has already persisted. Hooks receive this
/// after the fact; they observe, they cannot veto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEvent {
    pub task_id: i64,
    pub project_id: i64,
    pub task_title: String,
    pub assignee_id: Option<i64>,
    pub old_status: TaskStatus,
    pub new_status: TaskStatus,
}

pub type TransitionHook = Arc<dyn Fn(&TransitionEvent) + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// A live task points at a project row that no longer exists. Foreign
    /// keys should make this impossible, so it is surfaced instead of being
    /// treated like the benign deleted-mid-flight races.
    #[error("task {task_id} references missing project {project_id}")]
    ProjectMissing { task_id: i64, project_id: i64 },
    #[error(transparent)]
    Db(#[from] anyhow::Error),
}

/// Coordinates everything that has to happen when a subtask's completion
/// state changes: aggregate the checklist, apply the project's workflow
/// policy, persist the status move, audit it, and fan it out.
pub struct WorkflowEngine {
    db: Database,
    recorder: ActivityRecorder,
    hook: Option<TransitionHook>,
}

impl WorkflowEngine {
    pub fn new(db: Database) -> Self {
        let recorder = ActivityRecorder::new(db.clone());
        Self {
            db,
            recorder,
            hook: None,
        }
    }

    pub fn with_hook(db: Database, hook: TransitionHook) -> Self {
        let mut engine = Self::new(db);
        engine.hook = Some(hook);
        engine
    }

    /// The recorder the engine audits through. Handlers that change a task's
    /// status directly record through this same recorder, so the activity
    /// trail gets exactly one entry per status change regardless of who
    /// caused it.
    pub fn recorder(&self) -> &ActivityRecorder {
        &self.recorder
    }

    /// React to a completion change on one of `task_id`'s subtasks.
    ///
    /// The task's current status is re-read here rather than trusted from
    /// the caller, so a concurrent manual edit cannot be clobbered by a
    /// stale decision. A task deleted between the caller's write and this
    /// evaluation is a benign race and a quiet no-op; a missing project row
    /// under a live task is an integrity fault and comes back as
    /// [`WorkflowError::ProjectMissing`].
    pub fn on_subtask_completion_changed(&self, task_id: i64) -> Result<(), WorkflowError> {
        let subtasks = self.db.get_subtasks_by_task(task_id)?;
        let all_complete = all_subtasks_complete(&subtasks);

        let Some(task) = self.db.get_task(task_id)? else {
            debug!("Task {task_id} gone before evaluation, nothing to do");
            return Ok(());
        };

        let Some(project) = self.db.get_project(task.project_id)? else {
            return Err(WorkflowError::ProjectMissing {
                task_id,
                project_id: task.project_id,
            });
        };

        let Some(next) = decide(project.workflow, task.status, all_complete) else {
            return Ok(());
        };

        if !self.db.set_task_status(task_id, next)? {
            debug!("Task {task_id} gone before the status write, nothing to do");
            return Ok(());
        }

        info!(
            "Task {} advanced {} -> {} by workflow",
            task_id,
            task.status.as_str(),
            next.as_str()
        );

        self.recorder.record(NewActivity::status_change(
            task.project_id,
            task.id,
            task.title.clone(),
            task.status,
            next,
        ));

        if let Some(hook) = &self.hook {
            hook(&TransitionEvent {
                task_id: task.id,
                project_id: task.project_id,
                task_title: task.title,
                assignee_id: task.assignee_id,
                old_status: task.status,
                new_status: next,
            });
        }

        Ok(())
    }
}

/// The standard delivery hook: fan a persisted transition out as
/// notifications. A task with an assignee notifies just the assignee; an
/// unassigned task notifies every member of the project. Delivery failures
/// are logged and dropped, never propagated back into the transition.
pub fn notification_fanout(db: Database) -> TransitionHook {
    Arc::new(move |event| {
        let recipients: Vec<i64> = match event.assignee_id {
            Some(user_id) => vec![user_id],
            None => match db.get_project_members(event.project_id) {
                Ok(members) => members.into_iter().map(|m| m.user_id).collect(),
                Err(e) => {
                    error!(
                        "Could not resolve recipients for task {}: {e}",
                        event.task_id
                    );
                    return;
                }
            },
        };

        let title = format!("Task moved to {}", event.new_status.as_str());
        let message = format!(
            "\"{}\" moved from {} to {}",
            event.task_title,
            event.old_status.as_str(),
            event.new_status.as_str()
        );

        for user_id in recipients {
            let notification = NewNotification {
                user_id,
                kind: NotificationKind::StatusChange,
                title: title.clone(),
                message: message.clone(),
            };
            if let Err(e) = db.create_notification(notification) {
                error!(
                    "Could not notify user {user_id} about task {}: {e}",
                    event.task_id
                );
            }
        }
    })
}
