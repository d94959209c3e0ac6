use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::db::Database;
use crate::models::*;
use crate::workflow::WorkflowError;

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Projects
// ============================================================

pub async fn get_all_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<Project>>, (StatusCode, String)> {
    let projects = state.db.get_all_projects().map_err(internal_error)?;
    Ok(Json(projects))
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(input): Json<CreateProjectInput>,
) -> Result<(StatusCode, Json<Project>), (StatusCode, String)> {
    let project = state.db.create_project(input).map_err(internal_error)?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Project>, (StatusCode, String)> {
    let project = state.db.get_project(id).map_err(internal_error)?;
    project
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("Project {id} not found")))
}

pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateProjectInput>,
) -> Result<Json<Project>, (StatusCode, String)> {
    let project = state.db.update_project(id, input).map_err(internal_error)?;
    project
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("Project {id} not found")))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = state.db.delete_project(id).map_err(internal_error)?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("Project {id} not found")))
    }
}

// ============================================================
// Project members
// ============================================================

pub async fn get_project_members(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ProjectMember>>, (StatusCode, String)> {
    let members = state.db.get_project_members(id).map_err(internal_error)?;
    Ok(Json(members))
}

pub async fn add_project_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<AddMemberInput>,
) -> Result<(StatusCode, Json<ProjectMember>), (StatusCode, String)> {
    let member = state.db.add_member(id, input).map_err(internal_error)?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn remove_project_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    let removed = state.db.remove_member(id).map_err(internal_error)?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("Member {id} not found")))
    }
}

// ============================================================
// Custom columns
// ============================================================

pub async fn get_project_columns(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<CustomColumn>>, (StatusCode, String)> {
    let columns = state.db.get_project_columns(id).map_err(internal_error)?;
    Ok(Json(columns))
}

pub async fn create_column(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<CreateColumnInput>,
) -> Result<(StatusCode, Json<CustomColumn>), (StatusCode, String)> {
    let column = state.db.create_column(id, input).map_err(internal_error)?;
    Ok((StatusCode::CREATED, Json(column)))
}

pub async fn update_column(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateColumnInput>,
) -> Result<Json<CustomColumn>, (StatusCode, String)> {
    let column = state.db.update_column(id, input).map_err(internal_error)?;
    column
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("Column {id} not found")))
}

pub async fn delete_column(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = state.db.delete_column(id).map_err(internal_error)?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("Column {id} not found")))
    }
}

// ============================================================
// Tasks
// ============================================================

pub async fn get_project_tasks(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Task>>, (StatusCode, String)> {
    let tasks = state.db.get_tasks_by_project(id).map_err(internal_error)?;
    Ok(Json(tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<CreateTaskInput>,
) -> Result<(StatusCode, Json<Task>), (StatusCode, String)> {
    let task = state.db.create_task(id, input).map_err(internal_error)?;

    if let Some(assignee) = task.assignee_id {
        notify_assignment(&state.db, assignee, &task);
    }

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TaskWithSubtasks>, (StatusCode, String)> {
    let task = state.db.get_task_with_subtasks(id).map_err(internal_error)?;
    task.map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("Task {id} not found")))
}

/// Partial task update. A manual `status` edit goes through the same
/// recorder as engine transitions, so the activity trail sees every status
/// change exactly once no matter where it came from.
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateTaskInput>,
) -> Result<Json<Task>, (StatusCode, String)> {
    let existing = state
        .db
        .get_task(id)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, format!("Task {id} not found")))?;

    let updated = state
        .db
        .update_task(id, input)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, format!("Task {id} not found")))?;

    if updated.status != existing.status {
        state.engine.recorder().record(NewActivity::status_change(
            updated.project_id,
            updated.id,
            updated.title.clone(),
            existing.status,
            updated.status,
        ));
    }

    if updated.assignee_id != existing.assignee_id {
        if let Some(assignee) = updated.assignee_id {
            notify_assignment(&state.db, assignee, &updated);
        }
    }

    Ok(Json(updated))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = state.db.delete_task(id).map_err(internal_error)?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("Task {id} not found")))
    }
}

// ============================================================
// Subtasks
// ============================================================

pub async fn get_task_subtasks(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Subtask>>, (StatusCode, String)> {
    let subtasks = state.db.get_subtasks_by_task(id).map_err(internal_error)?;
    Ok(Json(subtasks))
}

pub async fn create_subtask(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<CreateSubtaskInput>,
) -> Result<(StatusCode, Json<Subtask>), (StatusCode, String)> {
    let subtask = state.db.create_subtask(id, input).map_err(internal_error)?;
    Ok((StatusCode::CREATED, Json(subtask)))
}

/// Update a subtask. When the request touches `completed` (in either
/// direction) the workflow engine is consulted after the write so the
/// parent task can advance if its checklist just finished.
pub async fn update_subtask(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateSubtaskInput>,
) -> Result<Json<Subtask>, (StatusCode, String)> {
    let completion_changed = input.completed.is_some();

    let subtask = state
        .db
        .update_subtask(id, input)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, format!("Subtask {id} not found")))?;

    if completion_changed {
        state
            .engine
            .on_subtask_completion_changed(subtask.task_id)
            .map_err(workflow_error)?;
    }

    Ok(Json(subtask))
}

pub async fn delete_subtask(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = state.db.delete_subtask(id).map_err(internal_error)?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("Subtask {id} not found")))
    }
}

// ============================================================
// Comments
// ============================================================

pub async fn get_task_comments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Comment>>, (StatusCode, String)> {
    let comments = state.db.get_comments_by_task(id).map_err(internal_error)?;
    Ok(Json(comments))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<CreateCommentInput>,
) -> Result<(StatusCode, Json<Comment>), (StatusCode, String)> {
    let comment = state.db.create_comment(id, input).map_err(internal_error)?;

    // Tell the assignee, unless they wrote the comment themselves.
    match state.db.get_task(id) {
        Ok(Some(task)) => {
            if let Some(assignee) = task.assignee_id {
                if assignee != comment.author_id {
                    let notification = NewNotification {
                        user_id: assignee,
                        kind: NotificationKind::CommentAdded,
                        title: "New comment".to_string(),
                        message: format!("New comment on \"{}\"", task.title),
                    };
                    if let Err(e) = state.db.create_notification(notification) {
                        tracing::warn!("Could not deliver comment notification: {e}");
                    }
                }
            }
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("Could not resolve task {id} for comment delivery: {e}"),
    }

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = state.db.delete_comment(id).map_err(internal_error)?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("Comment {id} not found")))
    }
}

// ============================================================
// Notes
// ============================================================

pub async fn get_project_notes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Note>>, (StatusCode, String)> {
    let notes = state.db.get_notes_by_project(id).map_err(internal_error)?;
    Ok(Json(notes))
}

pub async fn create_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<CreateNoteInput>,
) -> Result<(StatusCode, Json<Note>), (StatusCode, String)> {
    let note = state.db.create_note(id, input).map_err(internal_error)?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Note>, (StatusCode, String)> {
    let note = state.db.get_note(id).map_err(internal_error)?;
    note.map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("Note {id} not found")))
}

pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateNoteInput>,
) -> Result<Json<Note>, (StatusCode, String)> {
    let note = state.db.update_note(id, input).map_err(internal_error)?;
    note.map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("Note {id} not found")))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = state.db.delete_note(id).map_err(internal_error)?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("Note {id} not found")))
    }
}

// ============================================================
// Activity
// ============================================================

pub async fn get_project_activity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ActivityEntry>>, (StatusCode, String)> {
    let entries = state.db.project_activity(id).map_err(internal_error)?;
    Ok(Json(entries))
}

// ============================================================
// Notifications
// ============================================================

#[derive(Debug, Deserialize)]
pub struct NotificationListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn get_user_notifications(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<Vec<Notification>>, (StatusCode, String)> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);
    let notifications = state
        .db
        .list_notifications(id, page, limit)
        .map_err(internal_error)?;
    Ok(Json(notifications))
}

pub async fn get_unread_count(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UnreadCount>, (StatusCode, String)> {
    let count = state.db.unread_count(id).map_err(internal_error)?;
    Ok(Json(UnreadCount { count }))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Notification>, (StatusCode, String)> {
    let marked = state.db.mark_notification_read(id).map_err(internal_error)?;
    if !marked {
        return Err((StatusCode::NOT_FOUND, format!("Notification {id} not found")));
    }
    let notification = state
        .db
        .get_notification(id)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, format!("Notification {id} not found")))?;
    Ok(Json(notification))
}

pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let marked = state
        .db
        .mark_all_notifications_read(id)
        .map_err(internal_error)?;
    Ok(Json(serde_json::json!({ "marked": marked })))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = state.db.delete_notification(id).map_err(internal_error)?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("Notification {id} not found")))
    }
}

// ============================================================
// Error conversion
// ============================================================

fn notify_assignment(db: &Database, user_id: i64, task: &Task) {
    let notification = NewNotification {
        user_id,
        kind: NotificationKind::TaskAssigned,
        title: "Task assigned to you".to_string(),
        message: format!("You were assigned \"{}\"", task.title),
    };
    if let Err(e) = db.create_notification(notification) {
        tracing::warn!(
            "Could not deliver assignment notification for task {}: {e}",
            task.id
        );
    }
}

/// Map store errors onto HTTP. Errors carrying a caller-addressable message
/// (missing parent, empty field) pass through as 400; anything else is
/// logged and collapsed to an opaque 500.
fn internal_error(err: anyhow::Error) -> (StatusCode, String) {
    let msg = err.to_string();
    if msg.contains("not found") || msg.contains("cannot be empty") {
        (StatusCode::BAD_REQUEST, msg)
    } else {
        tracing::error!("Internal server error: {msg}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    }
}

fn workflow_error(err: WorkflowError) -> (StatusCode, String) {
    match err {
        WorkflowError::ProjectMissing { .. } => {
            tracing::error!("Workflow integrity fault: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
        WorkflowError::Db(e) => internal_error(e),
    }
}
