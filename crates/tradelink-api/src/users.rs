use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use tradelink_types::models::User;

use crate::auth::{AppState, load_user};
use crate::blocking;
use crate::error::ApiError;

/// Every stored profile, newest first. Deleted accounts are included; the
/// client drops them when loading.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let rows = blocking(&state, |db| db.list_users()).await?;
    let users = rows
        .into_iter()
        .map(|row| row.into_user())
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    load_user(&state, user_id).await.map(Json)
}
