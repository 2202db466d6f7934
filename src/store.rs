//! Repository contracts for projects and tasks.
//!
//! Stores assign ids and timestamps. Task operations are always addressed
//! through the owning project: a task id that belongs to another project
//! behaves exactly like a missing one.

use chrono::NaiveDate;

use crate::models::{NewProject, NewTask, Project, ProjectId, Task, TaskId, TaskStatus};

/// Exact-match filters for listing a project's tasks; unset fields match
/// everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
}

pub trait ProjectStore {
    type Error;

    fn list_projects(&self) -> Result<Vec<Project>, Self::Error>;
    fn get_project(&self, id: ProjectId) -> Result<Option<Project>, Self::Error>;
    fn create_project(&self, project: &NewProject) -> Result<Project, Self::Error>;
    /// Persists the mutable fields of `project` and refreshes `updated_at`.
    /// Returns `None` when the project no longer exists.
    fn update_project(&self, project: &Project) -> Result<Option<Project>, Self::Error>;
    /// Deletes the project and all of its tasks.
    fn delete_project(&self, id: ProjectId) -> Result<bool, Self::Error>;
}

pub trait TaskStore {
    type Error;

    fn list_tasks(
        &self,
        project_id: ProjectId,
        filter: &TaskFilter,
    ) -> Result<Vec<Task>, Self::Error>;
    fn get_task(&self, project_id: ProjectId, id: TaskId) -> Result<Option<Task>, Self::Error>;
    fn create_task(&self, task: &NewTask) -> Result<Task, Self::Error>;
    /// Persists the mutable fields of `task` and refreshes `updated_at`.
    /// `project_id` is used for scoping only and is never rewritten.
    fn update_task(&self, task: &Task) -> Result<Option<Task>, Self::Error>;
    fn delete_task(&self, project_id: ProjectId, id: TaskId) -> Result<bool, Self::Error>;
}
