//! Handlers for tasks nested under `/projects/{project_id}/tasks/`.
//!
//! Every lookup is scoped to the project in the path. Creates and updates
//! re-derive the task status before the row is written.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{ProjectId, Task, TaskId};
use crate::payload::{Mode, TaskFilterParams, TaskInput};
use crate::state::AppState;
use crate::status;
use crate::store::{ProjectStore, TaskStore};

/// GET /projects/{project_id}/tasks/?status=&due_date=
pub async fn list(
    State(state): State<AppState>,
    ApiPath(project_id): ApiPath<ProjectId>,
    ApiQuery(params): ApiQuery<TaskFilterParams>,
) -> AppResult<Json<Vec<Task>>> {
    let filter = params.into_filter()?;
    let tasks = state
        .with_db(move |db| {
            require_project(db, project_id)?;
            Ok(db.list_tasks(project_id, &filter)?)
        })
        .await?;
    Ok(Json(tasks))
}

/// POST /projects/{project_id}/tasks/
pub async fn create(
    State(state): State<AppState>,
    ApiPath(project_id): ApiPath<ProjectId>,
    ApiJson(input): ApiJson<TaskInput>,
) -> AppResult<(StatusCode, Json<Task>)> {
    let task = state
        .with_db(move |db| {
            require_project(db, project_id)?;
            let new_task = input.into_new(project_id, status::today())?;
            Ok(db.create_task(&new_task)?)
        })
        .await?;
    tracing::info!(
        project_id,
        task_id = task.id,
        status = %task.status,
        "Task created"
    );
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /projects/{project_id}/tasks/{id}/
pub async fn get_by_id(
    State(state): State<AppState>,
    ApiPath((project_id, id)): ApiPath<(ProjectId, TaskId)>,
) -> AppResult<Json<Task>> {
    let task = state
        .with_db(move |db| db.get_task(project_id, id)?.ok_or_else(|| not_found(id)))
        .await?;
    Ok(Json(task))
}

/// PUT /projects/{project_id}/tasks/{id}/
pub async fn update(
    State(state): State<AppState>,
    ApiPath((project_id, id)): ApiPath<(ProjectId, TaskId)>,
    ApiJson(input): ApiJson<TaskInput>,
) -> AppResult<Json<Task>> {
    save(state, project_id, id, input, Mode::Full).await.map(Json)
}

/// PATCH /projects/{project_id}/tasks/{id}/
pub async fn partial_update(
    State(state): State<AppState>,
    ApiPath((project_id, id)): ApiPath<(ProjectId, TaskId)>,
    ApiJson(input): ApiJson<TaskInput>,
) -> AppResult<Json<Task>> {
    save(state, project_id, id, input, Mode::Partial).await.map(Json)
}

/// DELETE /projects/{project_id}/tasks/{id}/
pub async fn delete(
    State(state): State<AppState>,
    ApiPath((project_id, id)): ApiPath<(ProjectId, TaskId)>,
) -> AppResult<StatusCode> {
    let deleted = state
        .with_db(move |db| Ok(db.delete_task(project_id, id)?))
        .await?;
    if !deleted {
        return Err(not_found(id));
    }
    tracing::info!(project_id, task_id = id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn save(
    state: AppState,
    project_id: ProjectId,
    id: TaskId,
    input: TaskInput,
    mode: Mode,
) -> AppResult<Task> {
    let task = state
        .with_db(move |db| {
            let mut task = db.get_task(project_id, id)?.ok_or_else(|| not_found(id))?;
            input
                .into_changes(project_id, mode)?
                .apply_to(&mut task, status::today());
            db.update_task(&task)?.ok_or_else(|| not_found(id))
        })
        .await?;
    tracing::info!(
        project_id,
        task_id = id,
        status = %task.status,
        "Task updated"
    );
    Ok(task)
}

fn require_project(db: &Database, project_id: ProjectId) -> AppResult<()> {
    match db.get_project(project_id)? {
        Some(_) => Ok(()),
        None => Err(AppError::not_found("Project", project_id)),
    }
}

fn not_found(id: TaskId) -> AppError {
    AppError::not_found("Task", id)
}
