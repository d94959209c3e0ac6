use tracing::{error, warn};

use crate::db::Database;
use crate::models::NewActivity;

const MAX_ATTEMPTS: u32 = 3;

/// Appends entries to the project activity trail.
///
/// The trail is best-effort but persistent-minded: a failed write is retried
/// a couple of times, and only then given up on. Callers never see the
/// failure, since a status change that already happened must not be rolled
/// back because its audit entry could not be written.
pub struct ActivityRecorder {
    db: Database,
}

impl ActivityRecorder {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn record(&self, entry: NewActivity) {
        for attempt in 1..=MAX_ATTEMPTS {
            match self.db.insert_activity(&entry) {
                Ok(_) => return,
                Err(e) if attempt < MAX_ATTEMPTS => {
                    warn!(
                        "Activity write for task {} failed (attempt {attempt}/{MAX_ATTEMPTS}), retrying: {e}",
                        entry.task_id
                    );
                }
                Err(e) => {
                    error!(
                        "Dropping activity entry for task {} ({}: {:?} -> {:?}) after {MAX_ATTEMPTS} attempts: {e}",
                        entry.task_id, entry.field, entry.old_value, entry.new_value
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateProjectInput, CreateTaskInput, TaskStatus};

    #[test]
    fn record_appends_to_the_trail() {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();

        let project = db
            .create_project(CreateProjectInput {
                name: "Trail".to_string(),
                description: None,
                workflow: None,
            })
            .unwrap();
        let task = db
            .create_task(
                project.id,
                CreateTaskInput {
                    title: "Ship it".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();

        let recorder = ActivityRecorder::new(db.clone());
        recorder.record(NewActivity::status_change(
            project.id,
            task.id,
            task.title.clone(),
            TaskStatus::Backlog,
            TaskStatus::InReview,
        ));

        let trail = db.project_activity(project.id).unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].field, "status");
        assert_eq!(trail[0].old_value, "BACKLOG");
        assert_eq!(trail[0].new_value, "IN_REVIEW");
        assert_eq!(trail[0].task_title, "Ship it");
    }

    #[test]
    fn entries_survive_task_deletion() {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();

        let project = db
            .create_project(CreateProjectInput {
                name: "Trail".to_string(),
                description: None,
                workflow: None,
            })
            .unwrap();
        let task = db
            .create_task(
                project.id,
                CreateTaskInput {
                    title: "Ephemeral".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();

        let recorder = ActivityRecorder::new(db.clone());
        recorder.record(NewActivity::status_change(
            project.id,
            task.id,
            task.title.clone(),
            TaskStatus::Backlog,
            TaskStatus::InProgress,
        ));

        assert!(db.delete_task(task.id).unwrap());

        let trail = db.project_activity(project.id).unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].task_title, "Ephemeral");
    }
}
