use std::path::PathBuf;
use std::sync::Arc;

use crate::db::Database;
use crate::error::{AppError, AppResult};

/// Shared state handed to every handler. Each request opens its own
/// connection to the database file.
#[derive(Clone)]
pub struct AppState {
    db_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Arc::new(db_path.into()),
        }
    }

    /// Runs `f` against a fresh connection on the blocking thread pool.
    pub async fn with_db<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Database) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db_path = Arc::clone(&self.db_path);
        tokio::task::spawn_blocking(move || {
            let db = Database::connect(db_path.as_path())?;
            f(&db)
        })
        .await
        .map_err(|err| AppError::Internal(format!("database task failed: {err}")))?
    }
}
