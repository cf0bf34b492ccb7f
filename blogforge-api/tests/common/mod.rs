//! Common test utilities for integration tests
//!
//! Every test gets a router over a fresh in-memory store and a temporary
//! upload directory, so no database or Redis is needed.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use blogforge_api::{
    app::{build_router, AppState},
    config::Config,
};
use blogforge_shared::{
    auth::password::hash_password,
    models::user::{NewUser, User, UserRole, UserStatus},
    store::{MemoryStore, UserStore},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-that-is-long-enough";
pub const PASSWORD: &str = "secret123";

/// Test context holding the router and its state
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
    _uploads: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let uploads = TempDir::new().expect("temp dir");

        let mut config = Config::default();
        config.jwt.secret = TEST_SECRET.to_string();
        config.upload.save_path = uploads.path().to_path_buf();
        config.upload.max_size_mb = 1;
        config.server.public_base_url = "http://blog.test".to_string();

        let state = AppState::new(Arc::new(MemoryStore::new()), None, config);
        let app = build_router(state.clone());

        Self {
            app,
            state,
            _uploads: uploads,
        }
    }

    /// Sends a request and returns the status and the JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.call(request).await
    }

    pub async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("non-JSON body: {}", String::from_utf8_lossy(&bytes))
            })
        };

        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Value {
        let (status, body) = self.send(Method::GET, uri, token, None).await;
        assert_eq!(status, StatusCode::OK, "GET {} -> {}", uri, body);
        body
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Value {
        let (status, body) = self.send(Method::POST, uri, token, Some(body)).await;
        assert_eq!(status, StatusCode::OK, "POST {} -> {}", uri, body);
        body
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Value {
        let (status, body) = self.send(Method::PUT, uri, token, Some(body)).await;
        assert_eq!(status, StatusCode::OK, "PUT {} -> {}", uri, body);
        body
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Value {
        let (status, body) = self.send(Method::DELETE, uri, token, None).await;
        assert_eq!(status, StatusCode::OK, "DELETE {} -> {}", uri, body);
        body
    }

    /// Registers a user and returns its ID
    pub async fn register(&self, username: &str) -> i64 {
        let body = self
            .post(
                "/api/v1/register",
                None,
                json!({"username": username, "password": PASSWORD}),
            )
            .await;
        assert_eq!(body["code"], 200, "{}", body);
        body["data"]["id"].as_i64().unwrap()
    }

    /// Logs in and returns `(access_token, refresh_token)`
    pub async fn login(&self, username: &str, password: &str) -> (String, String) {
        let body = self
            .post(
                "/api/v1/login",
                None,
                json!({"username": username, "password": password}),
            )
            .await;
        assert_eq!(body["code"], 200, "{}", body);
        (
            body["data"]["token"].as_str().unwrap().to_string(),
            body["data"]["refresh_token"].as_str().unwrap().to_string(),
        )
    }

    /// Registers and logs in a regular user, returning `(id, access_token)`
    pub async fn user(&self, username: &str) -> (i64, String) {
        let id = self.register(username).await;
        let (token, _) = self.login(username, PASSWORD).await;
        (id, token)
    }

    /// Seeds an account directly in the store
    pub async fn seed_user(&self, username: &str, role: UserRole, status: UserStatus) -> User {
        self.state
            .store
            .create_user(NewUser {
                username: username.to_string(),
                email: None,
                password_hash: hash_password(PASSWORD).unwrap(),
                nickname: username.to_string(),
                role,
                status,
            })
            .await
            .unwrap()
    }

    /// Seeds an admin and returns its access token
    pub async fn admin(&self) -> String {
        self.seed_user("admin", UserRole::Admin, UserStatus::Active)
            .await;
        let (token, _) = self.login("admin", PASSWORD).await;
        token
    }

    pub async fn create_category(&self, admin: &str, name: &str, sort: i32) -> i64 {
        let body = self
            .post(
                "/api/v1/admin/categories",
                Some(admin),
                json!({"name": name, "sort": sort}),
            )
            .await;
        assert_eq!(body["code"], 200, "{}", body);
        body["data"]["id"].as_i64().unwrap()
    }

    pub async fn create_tag(&self, admin: &str, name: &str) -> i64 {
        let body = self
            .post("/api/v1/admin/tags", Some(admin), json!({"name": name}))
            .await;
        assert_eq!(body["code"], 200, "{}", body);
        body["data"]["id"].as_i64().unwrap()
    }

    pub async fn create_article(&self, token: &str, article: Value) -> i64 {
        let body = self.post("/api/v1/articles", Some(token), article).await;
        assert_eq!(body["code"], 200, "{}", body);
        body["data"]["id"].as_i64().unwrap()
    }
}
