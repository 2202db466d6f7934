//! Handlers for the `/projects/` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::models::{Project, ProjectId};
use crate::payload::{Mode, ProjectInput};
use crate::state::AppState;
use crate::store::ProjectStore;

/// GET /projects/
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Project>>> {
    let projects = state.with_db(|db| Ok(db.list_projects()?)).await?;
    Ok(Json(projects))
}

/// POST /projects/
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ProjectInput>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let new_project = input.into_new()?;
    let project = state
        .with_db(move |db| Ok(db.create_project(&new_project)?))
        .await?;
    tracing::info!(project_id = project.id, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /projects/{id}/
pub async fn get_by_id(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProjectId>,
) -> AppResult<Json<Project>> {
    let project = state
        .with_db(move |db| db.get_project(id)?.ok_or_else(|| not_found(id)))
        .await?;
    Ok(Json(project))
}

/// PUT /projects/{id}/
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProjectId>,
    ApiJson(input): ApiJson<ProjectInput>,
) -> AppResult<Json<Project>> {
    save(state, id, input, Mode::Full).await.map(Json)
}

/// PATCH /projects/{id}/
pub async fn partial_update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProjectId>,
    ApiJson(input): ApiJson<ProjectInput>,
) -> AppResult<Json<Project>> {
    save(state, id, input, Mode::Partial).await.map(Json)
}

/// DELETE /projects/{id}/
///
/// Removes the project's tasks along with it.
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProjectId>,
) -> AppResult<StatusCode> {
    let deleted = state.with_db(move |db| Ok(db.delete_project(id)?)).await?;
    if !deleted {
        return Err(not_found(id));
    }
    tracing::info!(project_id = id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn save(
    state: AppState,
    id: ProjectId,
    input: ProjectInput,
    mode: Mode,
) -> AppResult<Project> {
    let project = state
        .with_db(move |db| {
            let mut project = db.get_project(id)?.ok_or_else(|| not_found(id))?;
            input.into_changes(mode)?.apply_to(&mut project);
            db.update_project(&project)?.ok_or_else(|| not_found(id))
        })
        .await?;
    tracing::info!(project_id = id, "Project updated");
    Ok(project)
}

fn not_found(id: ProjectId) -> AppError {
    AppError::not_found("Project", id)
}
