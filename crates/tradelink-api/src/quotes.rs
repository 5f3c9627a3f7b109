use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use tradelink_types::api::{Claims, CreateQuoteRequest};
use tradelink_types::models::QuoteRequest;

use crate::auth::{AppState, load_user};
use crate::blocking;
use crate::error::ApiError;
use crate::leads::require_text;

pub const DEFAULT_MAX_RESPONSES: u32 = 5;

pub async fn list_quotes(State(state): State<AppState>) -> Result<Json<Vec<QuoteRequest>>, ApiError> {
    let rows = blocking(&state, |db| db.list_quote_requests()).await?;
    let quotes = rows
        .into_iter()
        .map(|row| row.into_quote())
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Json(quotes))
}

pub async fn create_quote(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateQuoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let homeowner = load_user(&state, claims.sub).await?;
    if !homeowner.is_homeowner() {
        return Err(ApiError::Forbidden("only homeowners can request quotes".into()));
    }
    require_text("project_title", &req.project_title)?;
    require_text("project_description", &req.project_description)?;

    let quote = QuoteRequest {
        id: Uuid::new_v4(),
        homeowner_id: homeowner.id,
        homeowner_name: homeowner.name,
        project_title: req.project_title,
        project_description: req.project_description,
        category: req.category,
        location: req.location,
        budget: req.budget,
        urgency: req.urgency,
        contact_details: req.contact_details,
        responses: Vec::new(),
        max_responses: req.max_responses.unwrap_or(DEFAULT_MAX_RESPONSES),
        created_at: Utc::now(),
    };

    let stored = quote.clone();
    blocking(&state, move |db| db.insert_quote_request(&stored)).await?;
    info!("Quote request {} opened by {}", quote.id, quote.homeowner_id);

    Ok((StatusCode::CREATED, Json(quote)))
}
