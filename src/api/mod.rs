//! HTTP surface.
//!
//! Routes are versioned under `/api/v1`. The router owns an engine wired
//! with the notification fan-out hook, so any status change that happens via
//! these endpoints is audited and delivered the same way.

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{delete, get, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;
use crate::workflow::{notification_fanout, WorkflowEngine};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub engine: Arc<WorkflowEngine>,
}

pub fn create_router(db: Database) -> Router {
    let engine = Arc::new(WorkflowEngine::with_hook(
        db.clone(),
        notification_fanout(db.clone()),
    ));
    let state = AppState { db, engine };

    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/projects",
            get(handlers::get_all_projects).post(handlers::create_project),
        )
        .route(
            "/projects/{id}",
            get(handlers::get_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        )
        .route(
            "/projects/{id}/members",
            get(handlers::get_project_members).post(handlers::add_project_member),
        )
        .route(
            "/projects/{id}/columns",
            get(handlers::get_project_columns).post(handlers::create_column),
        )
        .route(
            "/projects/{id}/tasks",
            get(handlers::get_project_tasks).post(handlers::create_task),
        )
        .route(
            "/projects/{id}/notes",
            get(handlers::get_project_notes).post(handlers::create_note),
        )
        .route(
            "/projects/{id}/activity",
            get(handlers::get_project_activity),
        )
        .route("/members/{id}", delete(handlers::remove_project_member))
        .route(
            "/columns/{id}",
            put(handlers::update_column).delete(handlers::delete_column),
        )
        .route(
            "/tasks/{id}",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route(
            "/tasks/{id}/subtasks",
            get(handlers::get_task_subtasks).post(handlers::create_subtask),
        )
        .route(
            "/tasks/{id}/comments",
            get(handlers::get_task_comments).post(handlers::create_comment),
        )
        .route(
            "/subtasks/{id}",
            put(handlers::update_subtask).delete(handlers::delete_subtask),
        )
        .route("/comments/{id}", delete(handlers::delete_comment))
        .route(
            "/notes/{id}",
            get(handlers::get_note)
                .put(handlers::update_note)
                .delete(handlers::delete_note),
        )
        .route("/notifications/{id}", delete(handlers::delete_notification))
        .route(
            "/notifications/{id}/read",
            put(handlers::mark_notification_read),
        )
        .route(
            "/users/{id}/notifications",
            get(handlers::get_user_notifications),
        )
        .route(
            "/users/{id}/notifications/unread-count",
            get(handlers::get_unread_count),
        )
        .route(
            "/users/{id}/notifications/read-all",
            put(handlers::mark_all_notifications_read),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
