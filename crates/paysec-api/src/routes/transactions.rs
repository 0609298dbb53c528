//! Transaction routes: submit, list with filters, review
//!
//! All three share `/api/customers/transactions` and require a bearer token.
//! Customers list only transactions they sent; employees list all of them.
//! Listing takes its filter from the query string, or from a JSON body of
//! the form `{"filter": {...}}` when one is sent.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use paysec_core::{validation, ErrorContext, Identity, TransactionView};
use paysec_parser::FilterCriteria;
use serde::Serialize;
use serde_json::Value;

use super::json_body;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct Created {
    pub message: String,
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

/// GET /api/customers/transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Result<Json<Vec<TransactionView>>, ApiError> {
    let context = || ErrorContext::new("list_transactions").with_user(&identity.email);

    let criteria = match json_body(&body)? {
        Value::Null => FilterCriteria::from_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
        body => FilterCriteria::from_body(&body),
    }
    .map_err(|e| ApiError::logged(e.into(), context()))?;

    let transactions = state
        .bank
        .list_transactions(&identity, criteria)
        .await
        .map_err(|e| ApiError::logged(e, context()))?;

    Ok(Json(transactions.iter().map(TransactionView::from).collect()))
}

/// POST /api/customers/transactions
pub async fn submit_transaction(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    body: Bytes,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let body = json_body(&body)?;
    let stored = state
        .bank
        .submit_transaction(&identity, &body)
        .await
        .map_err(|e| ApiError::logged(e, ErrorContext::new("submit_transaction").with_user(&identity.email)))?;

    Ok((
        StatusCode::CREATED,
        Json(Created {
            message: "Transaction created".to_string(),
            id: stored.id,
        }),
    ))
}

/// PATCH /api/customers/transactions with `{"oid": "...", "verified": bool}`
pub async fn review_transaction(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    body: Bytes,
) -> Result<Json<Message>, ApiError> {
    let context = || ErrorContext::new("review_transaction").with_user(&identity.email);

    let body = json_body(&body)?;
    let (oid, verified) = validation::validate_verification(&body).map_err(|e| ApiError::logged(e, context()))?;
    state
        .bank
        .set_verification(&identity, &oid, verified)
        .await
        .map_err(|e| ApiError::logged(e, context()))?;

    Ok(Json(Message {
        message: "Update successful".to_string(),
    }))
}
