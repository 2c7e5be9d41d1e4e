use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database};
use serde_json::Value;
use tower::ServiceExt;

use recipe_api::{db, server::config::ServerConfig, web};

pub struct TestApp {
    pub router: Router,
}

/// Builds the full application router on top of a fresh in-memory SQLite
/// database. A single-connection pool keeps the whole test on one database.
pub async fn spawn_app() -> TestApp {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);

    let db_pool = Database::connect(opt).await.expect("connect to sqlite");
    db::create_tables(&db_pool).await.expect("create tables");

    let config = Arc::new(ServerConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-jwt-secret".to_string(),
    });

    TestApp {
        router: web::create_axum_router(db_pool, config),
    }
}

impl TestApp {
    /// Dispatches a request through the router and returns the status plus
    /// the decoded body (JSON when possible, the raw text otherwise, `Null`
    /// for an empty body).
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("build request"),
            None => builder.body(Body::empty()).expect("build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("dispatch request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> Value {
        let (status, body) = self
            .request(
                "POST",
                "/api/users",
                None,
                Some(serde_json::json!({ "email": email, "password": password, "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/auth-token",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    pub async fn register_and_login(&self, email: &str) -> String {
        self.register(email, "test-password-123", "Test User").await;
        self.login(email, "test-password-123").await
    }

    pub async fn create_tag(&self, token: &str, name: &str) -> Value {
        let (status, body) = self
            .request(
                "POST",
                "/api/tags",
                Some(token),
                Some(serde_json::json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create tag failed: {body}");
        body
    }

    pub async fn create_recipe(&self, token: &str, payload: Value) -> Value {
        let (status, body) = self
            .request("POST", "/api/recipes", Some(token), Some(payload))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create recipe failed: {body}");
        body
    }
}
