use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use tradelink_core::pricing::BASE_LEAD_PRICE;
use tradelink_types::api::{Claims, CreateJobLeadRequest};
use tradelink_types::models::JobLead;

use crate::auth::{AppState, load_user};
use crate::blocking;
use crate::error::ApiError;

pub const DEFAULT_MAX_PURCHASES: u32 = 6;

pub async fn list_leads(State(state): State<AppState>) -> Result<Json<Vec<JobLead>>, ApiError> {
    let rows = blocking(&state, |db| db.list_job_leads()).await?;
    let leads = rows
        .into_iter()
        .map(|row| row.into_lead())
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Json(leads))
}

/// Post a new job. Only homeowners can post.
pub async fn create_lead(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateJobLeadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let poster = load_user(&state, claims.sub).await?;
    if !poster.is_homeowner() {
        return Err(ApiError::Forbidden("only homeowners can post jobs".into()));
    }
    require_text("title", &req.title)?;
    require_text("description", &req.description)?;
    require_text("category", &req.category)?;
    require_text("location", &req.location)?;

    let lead = JobLead {
        id: Uuid::new_v4(),
        title: req.title,
        description: req.description,
        category: req.category,
        location: req.location,
        budget: req.budget,
        urgency: req.urgency,
        posted_by: poster.id,
        posted_date: Utc::now(),
        contact_details: req.contact_details,
        purchased_by: Vec::new(),
        max_purchases: req.max_purchases.unwrap_or(DEFAULT_MAX_PURCHASES),
        price: req.price.unwrap_or(BASE_LEAD_PRICE),
        is_active: true,
        interests: Vec::new(),
        hired_tradesperson: None,
        dismissed_by: None,
    };

    let stored = lead.clone();
    blocking(&state, move |db| db.insert_job_lead(&stored)).await?;
    info!("Lead {} posted by {}", lead.id, poster.id);

    Ok((StatusCode::CREATED, Json(lead)))
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::Validation(format!("{} is required", field)))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::test_support::TestApp;

    fn lead_body(title: &str) -> Value {
        json!({
            "title": title,
            "description": "Replace two radiators",
            "category": "Heating",
            "location": "North London",
            "budget": "£500 - £800",
            "urgency": "High",
            "contact_details": {"name": "Sarah", "email": "sarah@example.com", "phone": "07700 900123"}
        })
    }

    #[tokio::test]
    async fn homeowner_posts_and_everyone_lists() {
        let app = TestApp::new();
        let (sarah, token) = app.signup("sarah@example.com", "homeowner").await;
        let (_, trade_token) = app.signup("alex@example.com", "tradesperson").await;

        let (status, lead) = app.post("/leads", Some(&token), lead_body("Radiators")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(lead["posted_by"], sarah.to_string());
        assert_eq!(lead["max_purchases"], 6);
        assert_eq!(lead["price"], 9.99);
        assert_eq!(lead["is_active"], true);

        let (status, leads) = app.get("/leads", Some(&trade_token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(leads.as_array().unwrap().len(), 1);
        assert_eq!(leads[0]["urgency"], "High");
        assert_eq!(leads[0]["contact_details"]["phone"], "07700 900123");
    }

    #[tokio::test]
    async fn tradespeople_cannot_post_and_titles_are_required() {
        let app = TestApp::new();
        let (_, trade_token) = app.signup("alex@example.com", "tradesperson").await;
        let (status, body) = app.post("/leads", Some(&trade_token), lead_body("Radiators")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "FORBIDDEN");

        let (_, token) = app.signup("sarah@example.com", "homeowner").await;
        let (status, _) = app.post("/leads", Some(&token), lead_body("  ")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
