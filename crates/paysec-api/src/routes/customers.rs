//! Customer registration and login

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use paysec_core::{AuthToken, Role};

use super::json_body;
use crate::error::ApiError;
use crate::AppState;

/// POST /api/customers/register
pub async fn register(State(state): State<AppState>, body: Bytes) -> Result<(StatusCode, Json<AuthToken>), ApiError> {
    let body = json_body(&body)?;
    let token = state.bank.register_customer(&body).await?;
    Ok((StatusCode::CREATED, Json(token)))
}

/// POST /api/customers/login
pub async fn login(State(state): State<AppState>, body: Bytes) -> Result<Json<AuthToken>, ApiError> {
    let body = json_body(&body)?;
    Ok(Json(state.bank.login(Role::Customer, &body).await?))
}
