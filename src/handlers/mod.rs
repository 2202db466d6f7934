pub mod projects;
pub mod tasks;

use axum::Json;
use serde_json::{json, Value};

/// GET /
pub async fn api_root() -> Json<Value> {
    Json(json!({ "projects": "/projects/" }))
}
