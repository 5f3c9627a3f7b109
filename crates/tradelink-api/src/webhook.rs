//! Verification provider callback.
//!
//! Payloads may carry an HMAC-SHA256 signature over the raw body, hex-encoded
//! in `X-Provider-Signature`.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::{Value, json};
use sha2::Sha256;
use tracing::{debug, info, warn};

use tradelink_types::api::ProviderWebhook;
use tradelink_types::models::VerificationStatus;

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;
use crate::verification::resolve_status;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-provider-signature";
pub const SESSION_COMPLETION: &str = "session.completion";

/// HMAC-SHA256 keyed with `secret`, already fed `payload`.
fn payload_mac(secret: &str, payload: &[u8]) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload);
    Some(mac)
}

/// Verify a hex-encoded HMAC-SHA256 signature in constant time.
pub fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    payload_mac(secret, payload).is_some_and(|mac| mac.verify_slice(&expected).is_ok())
}

pub async fn verification_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    match state.webhook_secret.as_deref() {
        Some(secret) => {
            let signature = headers
                .get(SIGNATURE_HEADER)
                .and_then(|v| v.to_str().ok())
                .ok_or(ApiError::InvalidSignature)?;
            if !verify_signature(secret, &body, signature) {
                return Err(ApiError::InvalidSignature);
            }
        }
        None => warn!("Webhook signature not checked, no webhook secret configured"),
    }

    let payload: ProviderWebhook = serde_json::from_slice(&body)
        .map_err(|e| ApiError::Validation(format!("malformed webhook payload: {}", e)))?;

    let Some(event) = payload.event else {
        debug!("Webhook without event, ignoring");
        return Ok(Json(json!({ "success": true })));
    };
    let resource = match event.resource {
        Some(resource) if event.event_type == SESSION_COMPLETION => resource,
        _ => {
            debug!("Ignoring provider event {}", event.event_type);
            return Ok(Json(json!({ "success": true })));
        }
    };

    let session_id = resource.id.clone();
    let Some(row) = blocking(&state, move |db| db.find_user_by_verification_session(&session_id)).await? else {
        warn!("No user for verification session {}", resource.id);
        return Ok(Json(json!({ "success": true })));
    };
    let user = row.into_user()?;

    let provider_status = resource.status.unwrap_or_default();
    let status = resolve_status(&provider_status, &resource.checks);
    let verified = status == VerificationStatus::Verified;

    let mut data = user.verification_data.unwrap_or_default();
    data.webhook_status = Some(provider_status);
    data.webhook_checks = resource.checks;
    data.reviewed_at = Some(Utc::now());

    let user_id = user.id.to_string();
    blocking(&state, move |db| db.update_verification(&user_id, status, verified, &data)).await?;
    info!("User {} verification is now {}", user.id, status.as_str());

    Ok(Json(json!({ "success": true })))
}
