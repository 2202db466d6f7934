//! JSON backend for projects and the tasks nested under them.

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod payload;
pub mod state;
pub mod status;
pub mod store;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use handlers::{projects, tasks};
pub use state::AppState;

/// Builds the application router.
///
/// ```text
/// GET                      /
/// GET    POST              /projects/
/// GET    PUT PATCH DELETE  /projects/{project_id}/
/// GET    POST              /projects/{project_id}/tasks/
/// GET    PUT PATCH DELETE  /projects/{project_id}/tasks/{id}/
/// ```
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::api_root))
        .route("/projects/", get(projects::list).post(projects::create))
        .route(
            "/projects/:project_id/",
            get(projects::get_by_id)
                .put(projects::update)
                .patch(projects::partial_update)
                .delete(projects::delete),
        )
        .route(
            "/projects/:project_id/tasks/",
            get(tasks::list).post(tasks::create),
        )
        .route(
            "/projects/:project_id/tasks/:id/",
            get(tasks::get_by_id)
                .put(tasks::update)
                .patch(tasks::partial_update)
                .delete(tasks::delete),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
