use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::TimeDelta;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use tower::ServiceExt;

use bazaar_core::auth::{TokenConfig, TokenService};
use bazaar_core::user::{NewUser, Role, User};
use bazaar_db::Database;
use bazaar_server::routes;
use bazaar_server::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret-with-enough-bytes";

pub struct TestApp {
    pub router: Router,
    pub db: Database,
    pub tokens: TokenService,
    _container: ContainerAsync<GenericImage>,
}

/// Spin up a PostgreSQL container and return the test app.
pub async fn setup_test_app() -> TestApp {
    let container = GenericImage::new("postgres", "16")
        .with_exposed_port(ContainerPort::Tcp(5432))
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_PASSWORD", "postgres")
        .with_env_var("POSTGRES_DB", "bazaar_test")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");

    let url = format!("postgresql://postgres:postgres@{host}:{port}/bazaar_test");

    let db = Database::from_pool(retry_connect(&url).await);
    db.migrate().await.expect("Failed to run migrations");

    let tokens = TokenService::new(
        &TokenConfig::new(TEST_SECRET, TimeDelta::hours(1)).expect("valid token config"),
    );
    let state = Arc::new(AppState {
        db: db.clone(),
        tokens: tokens.clone(),
    });

    TestApp {
        router: routes::router(state),
        db,
        tokens,
        _container: container,
    }
}

async fn retry_connect(url: &str) -> PgPool {
    for _ in 0..30 {
        if let Ok(pool) = PgPoolOptions::new().max_connections(10).connect(url).await {
            return pool;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    panic!("Failed to connect to test database");
}

impl TestApp {
    /// Insert an account directly and return it with a valid token.
    ///
    /// The stored hash is a placeholder; use the register endpoint when a
    /// test needs to log in with a password.
    pub async fn user_with_token(&self, email: &str, role: Role) -> (User, String) {
        let user = self
            .db
            .user_repo()
            .create(&NewUser {
                name: format!("{role} user"),
                email: email.to_string(),
                password_hash: "unused".to_string(),
                role,
            })
            .await
            .unwrap();
        let token = self.tokens.issue(&user).unwrap();
        (user, token)
    }

    pub async fn token_for(&self, role: Role) -> String {
        self.user_with_token(&format!("{role}@example.com"), role)
            .await
            .1
    }

    /// Send a request and return the status and JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_raw(request).await
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Create a product through the API as an admin and return its JSON.
    pub async fn create_product(&self, token: &str, sku: &str, price: &str, stock: i32) -> Value {
        let (status, json) = self
            .send(
                Method::POST,
                "/api/products",
                Some(token),
                Some(serde_json::json!({
                    "name": format!("Product {sku}"),
                    "sku": sku,
                    "price": price,
                    "stock": stock,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create product failed: {json}");
        json["data"].clone()
    }
}
