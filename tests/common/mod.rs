#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use chrono::{Duration, NaiveDate, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use taskboard::AppState;

/// Router backed by its own database file. Keep the value alive for the
/// whole test; dropping it removes the database.
pub struct TestApp {
    _dir: TempDir,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let router = taskboard::router(AppState::new(dir.path().join("test.db")));
        Self { _dir: dir, router }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(empty(Method::GET, uri)).await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        self.send(empty(Method::DELETE, uri)).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.send(with_json(Method::POST, uri, body)).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.send(with_json(Method::PUT, uri, body)).await
    }

    pub async fn patch_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.send(with_json(Method::PATCH, uri, body)).await
    }

    /// Creates a project and returns its id.
    pub async fn create_project(&self, name: &str) -> i64 {
        let response = self
            .post_json(
                "/projects/",
                serde_json::json!({ "name": name, "description": "Project description" }),
            )
            .await;
        body_json(response).await["id"].as_i64().unwrap()
    }

    /// Creates a task due `due` under `project_id` and returns the response body.
    pub async fn create_task(&self, project_id: i64, title: &str, due: NaiveDate) -> Value {
        let response = self
            .post_json(
                &format!("/projects/{project_id}/tasks/"),
                serde_json::json!({
                    "title": title,
                    "description": "Task description",
                    "due_date": due.to_string(),
                    "status": "todo",
                }),
            )
            .await;
        body_json(response).await
    }

    pub async fn count(&self, uri: &str) -> usize {
        body_json(self.get(uri).await).await.as_array().unwrap().len()
    }
}

fn empty(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn with_json(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn days_from_today(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}
