//! Reference data endpoints, used by the payment form

use axum::extract::State;
use axum::Json;
use std::collections::BTreeMap;

use crate::AppState;

/// GET /api/reference/currencies: code -> display name
pub async fn currencies(State(state): State<AppState>) -> Json<BTreeMap<String, String>> {
    Json(state.bank.reference().currencies.clone())
}

/// GET /api/reference/providers
pub async fn providers(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.bank.reference().providers.clone())
}
