pub mod auth;
pub mod error;
pub mod leads;
pub mod middleware;
pub mod quotes;
pub mod users;
pub mod verification;
pub mod webhook;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tracing::error;

use tradelink_db::Database;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::require_auth;

/// Every HTTP route, with auth applied to the protected half.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/signin", post(auth::signin))
        .route("/webhooks/verification", post(webhook::verification_webhook))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/signout", post(auth::signout))
        .route("/auth/me", get(auth::me))
        .route("/users", get(users::list_users))
        .route("/users/{user_id}", get(users::get_user))
        .route("/leads", get(leads::list_leads).post(leads::create_lead))
        .route("/quotes", get(quotes::list_quotes).post(quotes::create_quote))
        .route(
            "/verification",
            post(verification::submit).layer(DefaultBodyLimit::max(verification::MAX_BODY_BYTES)),
        )
        .route("/verification/{user_id}", get(verification::status))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Run a blocking database call off the async runtime.
pub(crate) async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(ApiError::from)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    use tradelink_db::Database;

    use crate::auth::AppStateInner;

    pub const WEBHOOK_SECRET: &str = "whsec_test";

    pub fn signup_body(email: &str, user_type: &str) -> Value {
        let trades = if user_type == "tradesperson" {
            json!(["Plumber"])
        } else {
            json!([])
        };
        json!({
            "email": email,
            "password": "correct-horse",
            "profile": {
                "name": "Test User",
                "type": user_type,
                "location": "London",
                "trades": trades,
            }
        })
    }

    #[derive(Clone)]
    pub struct TestApp {
        pub router: Router,
    }

    impl TestApp {
        pub fn new() -> Self {
            Self::with_webhook_secret(Some(WEBHOOK_SECRET))
        }

        pub fn with_webhook_secret(secret: Option<&str>) -> Self {
            let state = Arc::new(AppStateInner {
                db: Database::open_in_memory().unwrap(),
                jwt_secret: "test-secret".into(),
                webhook_secret: secret.map(str::to_string),
                token_ttl_days: 1,
            });
            Self {
                router: super::router(state),
            }
        }

        pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
            let response = self.router.clone().oneshot(req).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                    Value::String(String::from_utf8_lossy(&bytes).into_owned())
                })
            };
            (status, body)
        }

        pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
            let mut req = Request::get(uri);
            if let Some(token) = token {
                req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
            }
            self.send(req.body(Body::empty()).unwrap()).await
        }

        pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
            let mut req = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
            if let Some(token) = token {
                req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
            }
            self.send(req.body(Body::from(body.to_string())).unwrap()).await
        }

        /// Create an account and return its id and token.
        pub async fn signup(&self, email: &str, user_type: &str) -> (Uuid, String) {
            let (status, body) = self.post("/auth/signup", None, signup_body(email, user_type)).await;
            assert_eq!(status, StatusCode::CREATED, "{}", body);
            (
                body["user_id"].as_str().unwrap().parse().unwrap(),
                body["token"].as_str().unwrap().to_string(),
            )
        }
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = TestApp::new();
        let (status, body) = app.get("/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("ok".into()));
    }
}
