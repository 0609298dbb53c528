//! Route modules for the API server
//!
//! Request bodies are read as raw bytes and parsed here so that malformed
//! JSON yields the same `{"message", "code"}` error shape as every other
//! failure.

pub mod customers;
pub mod employees;
pub mod reference;
pub mod transactions;

use axum::body::Bytes;
use paysec_core::CoreError;
use serde_json::Value;

use crate::error::ApiError;

/// Parse an optional JSON body; an empty body is `Value::Null`
pub(crate) fn json_body(bytes: &Bytes) -> Result<Value, ApiError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(|e| {
        log::debug!("rejecting malformed body: {}", e);
        ApiError::from(CoreError::malformed("Malformed JSON body"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_body() {
        assert_eq!(json_body(&Bytes::from_static(b"")).unwrap(), Value::Null);
        assert_eq!(json_body(&Bytes::from_static(b"  \n")).unwrap(), Value::Null);
        assert_eq!(json_body(&Bytes::from_static(br#"{"a":1}"#)).unwrap()["a"], 1);

        let err = json_body(&Bytes::from_static(b"{nope")).unwrap_err();
        assert_eq!(err.code, "MALFORMED_REQUEST");
    }
}
