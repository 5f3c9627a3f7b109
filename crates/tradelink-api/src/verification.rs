//! Identity verification submission.
//!
//! The document provider is simulated: every submission opens a session that
//! starts out `PENDING` and is settled later by the provider webhook.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use tradelink_types::api::{
    Claims, PersonalDetails, VerificationRequest, VerificationResponse, VerificationStatusResponse,
};
use tradelink_types::models::{ProviderCheck, VerificationData, VerificationStatus};

use crate::auth::{AppState, load_user};
use crate::blocking;
use crate::error::ApiError;
use crate::leads::require_text;

pub const PROVIDER_NAME: &str = "simulated";
pub const CHECK_DOCUMENT: &str = "DOCUMENT_AUTHENTICITY";
pub const CHECK_FACE: &str = "FACIAL_SIMILARITY";

/// Request body cap for a submission: three phone photos, base64-encoded.
pub const MAX_BODY_BYTES: usize = 40 * 1024 * 1024;

/// What the provider reports when a session is opened.
struct ProviderSession {
    session_id: String,
    status: String,
    checks: Vec<ProviderCheck>,
}

fn open_provider_session() -> ProviderSession {
    let pending = |check: &str| ProviderCheck {
        check_type: check.to_string(),
        result: "PENDING".to_string(),
    };
    ProviderSession {
        session_id: format!("idv_session_{}", Uuid::new_v4()),
        status: "PENDING".to_string(),
        checks: vec![pending(CHECK_DOCUMENT), pending(CHECK_FACE)],
    }
}

/// Map a provider status and its checks onto ours. `COMPLETED` only counts as
/// verified when both the document and the face checks passed.
pub fn resolve_status(provider_status: &str, checks: &[ProviderCheck]) -> VerificationStatus {
    let passed = |name: &str| {
        checks
            .iter()
            .any(|c| c.check_type == name && c.result == "PASS")
    };
    match provider_status {
        "COMPLETED" if passed(CHECK_DOCUMENT) && passed(CHECK_FACE) => VerificationStatus::Verified,
        "COMPLETED" | "FAILED" => VerificationStatus::Rejected,
        _ => VerificationStatus::Pending,
    }
}

fn decode_image(label: &str, encoded: &str) -> Result<Vec<u8>, ApiError> {
    let bytes = B64
        .decode(encoded.trim())
        .map_err(|_| ApiError::Validation(format!("{} image is not valid base64", label)))?;
    if bytes.is_empty() {
        return Err(ApiError::Validation(format!("{} image is empty", label)));
    }
    Ok(bytes)
}

fn validate_personal_details(details: &PersonalDetails) -> Result<(), ApiError> {
    require_text("first_name", &details.first_name)?;
    require_text("date_of_birth", &details.date_of_birth)?;
    require_text("address", &details.address)?;
    require_text("postcode", &details.postcode)
}

/// Digest of the submitted images, in front, back, selfie order.
fn document_digest(images: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for image in images {
        hasher.update(image);
    }
    hex::encode(hasher.finalize())
}

pub async fn submit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<VerificationRequest>,
) -> Result<Json<VerificationResponse>, ApiError> {
    if req.user_id != claims.sub {
        return Err(ApiError::Forbidden("you can only verify your own account".into()));
    }

    let front = decode_image("front", &req.front_image_base64)?;
    let back = match req.back_image_base64.as_deref() {
        Some(encoded) if !encoded.trim().is_empty() => Some(decode_image("back", encoded)?),
        _ if req.document_type.needs_back_image() => {
            return Err(ApiError::Validation(format!(
                "back image is required for {}",
                req.document_type.as_str()
            )));
        }
        _ => None,
    };
    let selfie = decode_image("selfie", &req.selfie_image_base64)?;
    validate_personal_details(&req.personal_details)?;

    let mut images = vec![front.as_slice()];
    if let Some(back) = &back {
        images.push(back.as_slice());
    }
    images.push(selfie.as_slice());
    let digest = document_digest(&images);

    let session = open_provider_session();
    let status = resolve_status(&session.status, &session.checks);
    let verified = status == VerificationStatus::Verified;
    let data = VerificationData {
        provider: Some(PROVIDER_NAME.to_string()),
        session_id: Some(session.session_id.clone()),
        provider_status: Some(session.status),
        submitted_at: Some(Utc::now()),
        document_type: Some(req.document_type.as_str().to_string()),
        document_digest: Some(digest),
        ..Default::default()
    };

    let user_id = req.user_id.to_string();
    let updated = blocking(&state, move |db| {
        db.update_verification(&user_id, status, verified, &data)
    })
    .await?;
    if !updated {
        return Err(ApiError::NotFound(format!("user {}", req.user_id)));
    }

    info!(
        "Verification session {} opened for {} ({})",
        session.session_id,
        req.user_id,
        status.as_str()
    );

    Ok(Json(VerificationResponse {
        success: true,
        message: Some("Verification submitted successfully".into()),
        session_id: Some(session.session_id),
        status: Some(status),
        error: None,
    }))
}

pub async fn status(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<VerificationStatusResponse>, ApiError> {
    let user = load_user(&state, user_id).await?;
    Ok(Json(VerificationStatusResponse {
        status: user.verification_status,
        verified: user.verified.unwrap_or(false),
        data: user.verification_data,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use uuid::Uuid;

    use super::*;
    use crate::test_support::TestApp;

    fn check(name: &str, result: &str) -> ProviderCheck {
        ProviderCheck {
            check_type: name.into(),
            result: result.into(),
        }
    }

    fn request_body(user_id: Uuid, document_type: &str, back: Option<&str>) -> Value {
        let mut body = json!({
            "user_id": user_id,
            "document_type": document_type,
            "front_image_base64": B64.encode(b"front"),
            "selfie_image_base64": B64.encode(b"selfie"),
            "personal_details": {
                "first_name": "Alex",
                "last_name": "Thompson",
                "date_of_birth": "1985-03-02",
                "address": "1 High Street",
                "postcode": "N1 1AA"
            }
        });
        if let Some(back) = back {
            body["back_image_base64"] = json!(back);
        }
        body
    }

    #[test]
    fn status_mapping() {
        let both = [check(CHECK_DOCUMENT, "PASS"), check(CHECK_FACE, "PASS")];
        let one = [check(CHECK_DOCUMENT, "PASS"), check(CHECK_FACE, "FAIL")];
        assert_eq!(resolve_status("COMPLETED", &both), VerificationStatus::Verified);
        assert_eq!(resolve_status("COMPLETED", &one), VerificationStatus::Rejected);
        assert_eq!(resolve_status("COMPLETED", &[]), VerificationStatus::Rejected);
        assert_eq!(resolve_status("FAILED", &both), VerificationStatus::Rejected);
        assert_eq!(resolve_status("PENDING", &both), VerificationStatus::Pending);
        assert_eq!(resolve_status("ONGOING", &[]), VerificationStatus::Pending);
    }

    #[test]
    fn digest_covers_every_image() {
        let a = document_digest(&[&b"front"[..], &b"selfie"[..]]);
        let b = document_digest(&[&b"front"[..], &b"back"[..], &b"selfie"[..]]);
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn submission_opens_a_pending_session() {
        let app = TestApp::new();
        let (alex, token) = app.signup("alex@example.com", "tradesperson").await;

        let (status, body) = app
            .post("/verification", Some(&token), request_body(alex, "passport", None))
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["success"], true);
        assert_eq!(body["status"], "pending");
        let session = body["session_id"].as_str().unwrap();
        assert!(session.starts_with("idv_session_"));

        let (status, body) = app.get(&format!("/verification/{}", alex), Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "pending");
        assert_eq!(body["verified"], false);
        assert_eq!(body["data"]["session_id"], session);
        assert_eq!(body["data"]["provider"], "simulated");
        assert_eq!(body["data"]["document_type"], "passport");
        assert_eq!(body["data"]["document_digest"].as_str().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn submission_is_validated() {
        let app = TestApp::new();
        let (alex, token) = app.signup("alex@example.com", "tradesperson").await;

        let (status, _) = app
            .post("/verification", Some(&token), request_body(alex, "driving_licence", None))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut bad_image = request_body(alex, "passport", None);
        bad_image["front_image_base64"] = json!("not base64!");
        let (status, _) = app.post("/verification", Some(&token), bad_image).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut no_postcode = request_body(alex, "passport", None);
        no_postcode["personal_details"]["postcode"] = json!("");
        let (status, _) = app.post("/verification", Some(&token), no_postcode).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let back = B64.encode(b"back");
        let (status, _) = app
            .post("/verification", Some(&token), request_body(alex, "national_id", Some(&back)))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn accepts_photo_sized_images() {
        let app = TestApp::new();
        let (alex, token) = app.signup("alex@example.com", "tradesperson").await;

        let photo = vec![0xAB_u8; 3 * 1024 * 1024];
        let mut body = request_body(alex, "driving_licence", Some(&B64.encode(&photo)));
        body["front_image_base64"] = json!(B64.encode(&photo));
        body["selfie_image_base64"] = json!(B64.encode(&photo));
        assert!(body.to_string().len() > 2 * 1024 * 1024);

        let (status, body) = app.post("/verification", Some(&token), body).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["status"], "pending");
    }

    #[tokio::test]
    async fn cannot_verify_someone_else() {
        let app = TestApp::new();
        let (_, token) = app.signup("alex@example.com", "tradesperson").await;
        let (maya, _) = app.signup("maya@example.com", "tradesperson").await;

        let (status, _) = app
            .post("/verification", Some(&token), request_body(maya, "passport", None))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
