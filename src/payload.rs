//! Request payloads and their validation.
//!
//! Bodies deserialize into loose DTOs where every field is optional, then
//! get validated into typed values. Collecting all problems before failing
//! gives clients one `fields` map per request instead of the first error
//! only. Task payloads run the status evaluator as their last step.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{AppError, AppResult, FieldErrors};
use crate::models::{NewProject, NewTask, Project, ProjectId, Task, TaskStatus};
use crate::status;
use crate::store::TaskFilter;

pub const MAX_NAME_CHARS: usize = 200;

const DATE_FORMAT: &str = "%Y-%m-%d";

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";
const NULL: &str = "This field may not be null.";
const NOT_STRING: &str = "Not a valid string.";
const BAD_DATE: &str = "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";

/// Whether absent required fields are an error (`PUT`, `POST`) or simply
/// left unchanged (`PATCH`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Full,
    Partial,
}

/// Keeps an explicit `null` as `Some(Value::Null)`; only an absent field
/// is `None`. Field types are checked during validation so a wrong type is
/// reported against its field.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectInput {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,
}

/// Validated field updates for an existing project.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

impl ProjectInput {
    pub fn into_new(self) -> AppResult<NewProject> {
        let changes = self.into_changes(Mode::Full)?;
        Ok(NewProject {
            name: changes.name.unwrap_or_default(),
            description: changes.description.flatten(),
        })
    }

    pub fn into_changes(self, mode: Mode) -> AppResult<ProjectChanges> {
        let mut errors = FieldErrors::new();
        let name = name_field(&mut errors, "name", self.name, mode);
        let description = nullable_text(&mut errors, "description", self.description);
        errors.finish(ProjectChanges { name, description })
    }
}

impl ProjectChanges {
    pub fn apply_to(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskInput {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub project_id: Option<Value>,
}

/// Validated field updates for an existing task.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
}

impl TaskInput {
    /// Validates a create payload for a task under `project_id` and runs
    /// the status evaluator against `today`.
    pub fn into_new(self, project_id: ProjectId, today: NaiveDate) -> AppResult<NewTask> {
        let changes = self.into_changes(project_id, Mode::Full)?;
        // Full mode has already rejected a missing title or due date.
        let (Some(title), Some(due_date)) = (changes.title, changes.due_date) else {
            return Err(AppError::Internal("validated task is missing fields".into()));
        };
        let requested = changes.status.unwrap_or_default();
        Ok(NewTask {
            project_id,
            title,
            description: changes.description.flatten(),
            due_date,
            status: status::evaluate(due_date, requested, today),
        })
    }

    pub fn into_changes(self, project_id: ProjectId, mode: Mode) -> AppResult<TaskChanges> {
        let mut errors = FieldErrors::new();

        let title = name_field(&mut errors, "title", self.title, mode);
        let description = nullable_text(&mut errors, "description", self.description);

        let due_date = match self.due_date {
            Some(Value::String(raw)) => match parse_date(&raw) {
                Some(date) => Some(date),
                None => {
                    errors.add("due_date", BAD_DATE);
                    None
                }
            },
            Some(Value::Null) => {
                errors.add("due_date", NULL);
                None
            }
            Some(_) => {
                errors.add("due_date", BAD_DATE);
                None
            }
            None => {
                if mode == Mode::Full {
                    errors.add("due_date", REQUIRED);
                }
                None
            }
        };

        let status = match self.status {
            Some(Value::Null) => {
                errors.add("status", NULL);
                None
            }
            Some(value) => text(&mut errors, "status", value).and_then(|raw| {
                match raw.parse::<TaskStatus>() {
                    Ok(status) => Some(status),
                    Err(err) => {
                        errors.add("status", err.to_string());
                        None
                    }
                }
            }),
            None => None,
        };

        if let Some(value) = self.project_id {
            let body_project = match &value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<ProjectId>().ok(),
                _ => None,
            };
            match body_project {
                Some(body_project) if body_project == project_id => {}
                Some(_) => errors.add(
                    "project_id",
                    format!("Tasks cannot be moved; expected project {project_id}."),
                ),
                None => errors.add(
                    "project_id",
                    format!("Incorrect type. Expected pk value, received {value}."),
                ),
            }
        }

        errors.finish(TaskChanges {
            title,
            description,
            due_date,
            status,
        })
    }
}

impl TaskChanges {
    /// Applies the changes, then re-derives the status for `today`.
    pub fn apply_to(self, task: &mut Task, today: NaiveDate) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        task.check_status(today);
    }
}

/// Raw `?status=&due_date=` query parameters for listing tasks.
#[derive(Debug, Default, Deserialize)]
pub struct TaskFilterParams {
    pub status: Option<String>,
    pub due_date: Option<String>,
}

impl TaskFilterParams {
    /// Empty values count as absent.
    pub fn into_filter(self) -> AppResult<TaskFilter> {
        let mut errors = FieldErrors::new();
        let mut filter = TaskFilter::default();

        if let Some(raw) = self.status.filter(|s| !s.is_empty()) {
            match raw.parse::<TaskStatus>() {
                Ok(status) => filter.status = Some(status),
                Err(err) => errors.add("status", format!("Select a valid choice. {err}")),
            }
        }
        if let Some(raw) = self.due_date.filter(|s| !s.is_empty()) {
            match parse_date(&raw) {
                Some(date) => filter.due_date = Some(date),
                None => errors.add("due_date", "Enter a valid date."),
            }
        }

        errors.finish(filter)
    }
}

/// Strings pass through; numbers are accepted in their JSON text form.
fn text(errors: &mut FieldErrors, field: &'static str, value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => {
            errors.add(field, NOT_STRING);
            None
        }
    }
}

fn nullable_text(
    errors: &mut FieldErrors,
    field: &'static str,
    value: Option<Value>,
) -> Option<Option<String>> {
    match value? {
        Value::Null => Some(None),
        value => text(errors, field, value).map(|s| Some(trimmed(s))),
    }
}

fn name_field(
    errors: &mut FieldErrors,
    field: &'static str,
    value: Option<Value>,
    mode: Mode,
) -> Option<String> {
    let value = match value {
        Some(Value::Null) => {
            errors.add(field, NULL);
            return None;
        }
        Some(value) => text(errors, field, value)?,
        None => {
            if mode == Mode::Full {
                errors.add(field, REQUIRED);
            }
            return None;
        }
    };

    let value = trimmed(value);
    if value.is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    if value.chars().count() > MAX_NAME_CHARS {
        errors.add(
            field,
            format!("Ensure this field has no more than {MAX_NAME_CHARS} characters."),
        );
        return None;
    }
    Some(value)
}

fn trimmed(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}
