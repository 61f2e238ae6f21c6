#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use std::sync::Arc;

use noteful_server::{AppState, repository::Repository, router};

pub struct Reply {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
}

pub fn app_with(repo: Arc<dyn Repository>) -> Router {
    router(AppState::new(repo))
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Reply {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    send_request(app, request).await
}

pub async fn send_request(app: &Router, request: Request<Body>) -> Reply {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    Reply {
        status,
        location,
        body,
    }
}

pub async fn create(app: &Router, family: &str, body: Value) -> Value {
    let reply = send(app, "POST", &format!("/api/{family}"), Some(body)).await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    reply.body
}

pub fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}
