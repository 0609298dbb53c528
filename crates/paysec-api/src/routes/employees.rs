//! Employee registration, login and dashboard statistics

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use paysec_core::{AuthToken, DashboardStats, ErrorContext, Identity, Role};

use super::json_body;
use crate::error::ApiError;
use crate::AppState;

/// POST /api/employees/register
pub async fn register(State(state): State<AppState>, body: Bytes) -> Result<(StatusCode, Json<AuthToken>), ApiError> {
    let body = json_body(&body)?;
    let token = state.bank.register_employee(&body).await?;
    Ok((StatusCode::CREATED, Json(token)))
}

/// POST /api/employees/login
pub async fn login(State(state): State<AppState>, body: Bytes) -> Result<Json<AuthToken>, ApiError> {
    let body = json_body(&body)?;
    Ok(Json(state.bank.login(Role::Employee, &body).await?))
}

/// GET /api/employees/stats
pub async fn stats(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<DashboardStats>, ApiError> {
    state
        .bank
        .stats(&identity)
        .await
        .map(Json)
        .map_err(|e| ApiError::logged(e, ErrorContext::new("stats").with_user(&identity.email)))
}
