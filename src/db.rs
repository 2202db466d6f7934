use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::models::{NewProject, NewTask, Project, ProjectId, Task, TaskId, TaskStatus};
use crate::store::{ProjectStore, TaskFilter, TaskStore};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const PROJECT_COLUMNS: &str = "id, name, description, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, title, description, due_date, status, project_id, created_at, updated_at";

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens the database file, enabling foreign keys so project deletes
    /// cascade, and applies the schema.
    pub fn connect<P: AsRef<Path>>(path: P) -> rusqlite::Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                due_date TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'todo'
                    CHECK (status IN ('todo', 'in-progress', 'completed', 'overdue')),
                project_id INTEGER NOT NULL REFERENCES projects (id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_tasks_project_id ON tasks (project_id);
            "#,
        )?;
        Ok(())
    }
}

impl ProjectStore for Database {
    type Error = rusqlite::Error;

    fn list_projects(&self) -> rusqlite::Result<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id"))?;
        let rows = stmt.query_map([], project_from_row)?;
        rows.collect()
    }

    fn get_project(&self, id: ProjectId) -> rusqlite::Result<Option<Project>> {
        self.conn
            .query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
                params![id],
                project_from_row,
            )
            .optional()
    }

    fn create_project(&self, project: &NewProject) -> rusqlite::Result<Project> {
        let now = current_timestamp();
        let stamp = format_timestamp(now);
        self.conn.execute(
            "INSERT INTO projects (name, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![project.name, project.description, stamp],
        )?;
        Ok(Project {
            id: self.conn.last_insert_rowid(),
            name: project.name.clone(),
            description: project.description.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    fn update_project(&self, project: &Project) -> rusqlite::Result<Option<Project>> {
        let now = current_timestamp();
        let updated = self.conn.execute(
            "UPDATE projects SET name = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
            params![project.name, project.description, format_timestamp(now), project.id],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        self.get_project(project.id)
    }

    fn delete_project(&self, id: ProjectId) -> rusqlite::Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

impl TaskStore for Database {
    type Error = rusqlite::Error;

    fn list_tasks(
        &self,
        project_id: ProjectId,
        filter: &TaskFilter,
    ) -> rusqlite::Result<Vec<Task>> {
        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = ?");
        let mut values = vec![Value::Integer(project_id)];
        if let Some(status) = filter.status {
            sql.push_str(" AND status = ?");
            values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(due_date) = filter.due_date {
            sql.push_str(" AND due_date = ?");
            values.push(Value::Text(format_date(due_date)));
        }
        sql.push_str(" ORDER BY id");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), task_from_row)?;
        rows.collect()
    }

    fn get_task(&self, project_id: ProjectId, id: TaskId) -> rusqlite::Result<Option<Task>> {
        self.conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND project_id = ?2"),
                params![id, project_id],
                task_from_row,
            )
            .optional()
    }

    fn create_task(&self, task: &NewTask) -> rusqlite::Result<Task> {
        let now = current_timestamp();
        let stamp = format_timestamp(now);
        self.conn.execute(
            "INSERT INTO tasks (title, description, due_date, status, project_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                task.title,
                task.description,
                format_date(task.due_date),
                task.status.as_str(),
                task.project_id,
                stamp,
            ],
        )?;
        Ok(Task {
            id: self.conn.last_insert_rowid(),
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date,
            status: task.status,
            project_id: task.project_id,
            created_at: now,
            updated_at: now,
        })
    }

    fn update_task(&self, task: &Task) -> rusqlite::Result<Option<Task>> {
        let now = current_timestamp();
        let updated = self.conn.execute(
            "UPDATE tasks
             SET title = ?1, description = ?2, due_date = ?3, status = ?4, updated_at = ?5
             WHERE id = ?6 AND project_id = ?7",
            params![
                task.title,
                task.description,
                format_date(task.due_date),
                task.status.as_str(),
                format_timestamp(now),
                task.id,
                task.project_id,
            ],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        self.get_task(task.project_id, task.id)
    }

    fn delete_task(&self, project_id: ProjectId, id: TaskId) -> rusqlite::Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM tasks WHERE id = ?1 AND project_id = ?2",
            params![id, project_id],
        )?;
        Ok(deleted > 0)
    }
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: parse_datetime(3, &row.get::<_, String>(3)?)?,
        updated_at: parse_datetime(4, &row.get::<_, String>(4)?)?,
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let due_date: String = row.get(3)?;
    let status: String = row.get(4)?;
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        due_date: NaiveDate::parse_from_str(&due_date, "%Y-%m-%d")
            .map_err(|err| conversion_error(3, err))?,
        status: status
            .parse::<TaskStatus>()
            .map_err(|err| conversion_error(4, err))?,
        project_id: row.get(5)?,
        created_at: parse_datetime(6, &row.get::<_, String>(6)?)?,
        updated_at: parse_datetime(7, &row.get::<_, String>(7)?)?,
    })
}

/// Timestamps are stored with microsecond precision; truncating up front
/// keeps the returned entity equal to what a later read yields.
fn current_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn format_date(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

fn parse_datetime(column: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| conversion_error(column, err))
}

fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err))
}
