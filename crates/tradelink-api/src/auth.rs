use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{debug, info};
use uuid::Uuid;

use tradelink_db::Database;
use tradelink_types::api::{AuthSession, Claims, SignInRequest, SignUpRequest};
use tradelink_types::models::{AccountStatus, MembershipType, User, UserType};

use crate::blocking;
use crate::error::ApiError;

/// Starting balance for a new tradesperson account.
pub const SIGNUP_CREDITS: f64 = 50.0;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Shared secret for provider callbacks. Unset means signatures are not checked.
    pub webhook_secret: Option<String>,
    pub token_ttl_days: i64,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.trim().to_lowercase();
    validate_email(&email)?;
    if req.password.len() < 8 {
        return Err(ApiError::Validation("password must be at least 8 characters".into()));
    }
    let name = req.profile.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }
    if req.profile.user_type == UserType::Tradesperson && req.profile.trades.is_empty() {
        return Err(ApiError::Validation("tradespeople must list at least one trade".into()));
    }

    let lookup = email.clone();
    if blocking(&state, move |db| db.get_credentials_by_email(&lookup))
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("email already registered".into()));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|_| ApiError::PasswordHash)?
        .to_string();

    let mut user = User::new(Uuid::new_v4(), name, email.clone(), req.profile.user_type);
    user.location = req.profile.location;
    user.trades = req.profile.trades;
    user.working_area = req.profile.working_area;
    user.credits = Some(match user.user_type {
        UserType::Tradesperson => SIGNUP_CREDITS,
        UserType::Homeowner => 0.0,
    });
    user.membership_type = Some(MembershipType::None);
    user.rating = Some(0.0);
    user.reviews = Some(0);
    user.verified = Some(false);
    user.account_status = Some(AccountStatus::Active);

    let user_id = user.id;
    // A concurrent sign-up for the same email can pass the lookup above.
    if !blocking(&state, move |db| db.create_account(&user, &password_hash)).await? {
        return Err(ApiError::Conflict("email already registered".into()));
    }

    let token = create_token(&state, user_id, &email)?;
    info!("New {} account {}", req.profile.user_type.as_str(), user_id);

    Ok((
        StatusCode::CREATED,
        Json(AuthSession {
            user_id,
            email,
            token,
        }),
    ))
}

pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<AuthSession>, ApiError> {
    let email = req.email.trim().to_lowercase();
    let lookup = email.clone();
    let creds = blocking(&state, move |db| db.get_credentials_by_email(&lookup))
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let parsed_hash = PasswordHash::new(&creds.password).map_err(|_| ApiError::PasswordHash)?;
    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::InvalidCredentials)?;

    let user_id: Uuid = creds.user_id.parse().map_err(|_| ApiError::Internal)?;
    let token = create_token(&state, user_id, &creds.email)?;

    Ok(Json(AuthSession {
        user_id,
        email: creds.email,
        token,
    }))
}

/// Tokens are stateless; signing out only needs the client to drop its token.
pub async fn signout(Extension(claims): Extension<Claims>) -> StatusCode {
    debug!("User {} signed out", claims.sub);
    StatusCode::NO_CONTENT
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<User>, ApiError> {
    load_user(&state, claims.sub).await.map(Json)
}

/// Fetch a profile by id, 404 when absent.
pub(crate) async fn load_user(state: &AppState, user_id: Uuid) -> Result<User, ApiError> {
    let id = user_id.to_string();
    let row = blocking(state, move |db| db.get_user_by_id(&id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {}", user_id)))?;
    Ok(row.into_user()?)
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ApiError::Validation("invalid email address".into()))
    }
}

pub(crate) fn create_token(state: &AppState, user_id: Uuid, email: &str) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(state.token_ttl_days)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.jwt_secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::{TestApp, signup_body};

    #[test]
    fn email_shapes() {
        assert!(super::validate_email("a@b.co").is_ok());
        assert!(super::validate_email("a@b").is_err());
        assert!(super::validate_email("@b.co").is_err());
        assert!(super::validate_email("a@@b.co").is_err());
        assert!(super::validate_email("a@b..co").is_err());
    }

    #[tokio::test]
    async fn signup_creates_profile_with_defaults() {
        let app = TestApp::new();
        let (status, body) = app
            .post("/auth/signup", None, signup_body("Alex@Example.com", "tradesperson"))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["email"], "alex@example.com");
        let token = body["token"].as_str().unwrap().to_string();

        let (status, me) = app.get("/auth/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["type"], "tradesperson");
        assert_eq!(me["credits"], 50.0);
        assert_eq!(me["membership_type"], "none");
        assert_eq!(me["verified"], false);
        assert_eq!(me["account_status"], "active");
        assert_eq!(me["trades"], json!(["Plumber"]));
    }

    #[tokio::test]
    async fn signup_validation_and_conflict() {
        let app = TestApp::new();

        let mut short = signup_body("a@example.com", "homeowner");
        short["password"] = json!("short");
        let (status, body) = app.post("/auth/signup", None, short).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");

        let mut no_trades = signup_body("b@example.com", "tradesperson");
        no_trades["profile"]["trades"] = json!([]);
        let (status, _) = app.post("/auth/signup", None, no_trades).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app.post("/auth/signup", None, signup_body("c@example.com", "homeowner")).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = app.post("/auth/signup", None, signup_body("c@example.com", "homeowner")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "CONFLICT");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_signups_for_one_email_conflict() {
        let app = TestApp::new();
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let app = app.clone();
            tasks.spawn(async move {
                app.post("/auth/signup", None, signup_body("race@example.com", "homeowner"))
                    .await
            });
        }

        let mut created = 0;
        while let Some(result) = tasks.join_next().await {
            let (status, body) = result.unwrap();
            match status {
                StatusCode::CREATED => created += 1,
                StatusCode::CONFLICT => assert_eq!(body["error"], "CONFLICT"),
                other => panic!("unexpected {}: {}", other, body),
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn signin_checks_password() {
        let app = TestApp::new();
        app.post("/auth/signup", None, signup_body("sarah@example.com", "homeowner")).await;

        let (status, body) = app
            .post("/auth/signin", None, json!({"email": "sarah@example.com", "password": "correct-horse"}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["token"].is_string());

        let (status, body) = app
            .post("/auth/signin", None, json!({"email": "sarah@example.com", "password": "wrong-horse"}))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "INVALID_CREDENTIALS");

        let (status, _) = app
            .post("/auth/signin", None, json!({"email": "nobody@example.com", "password": "correct-horse"}))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn protected_routes_need_a_valid_token() {
        let app = TestApp::new();
        let (status, _) = app.get("/auth/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = app.get("/auth/me", Some("not-a-jwt")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = app.signup("dave@example.com", "homeowner").await.1;
        let (status, _) = app.post("/auth/signout", Some(&token), json!({})).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
