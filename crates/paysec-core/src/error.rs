//! Error types for paysec-core
//!
//! Every failure a request can hit is a [`CoreError`]. The `Display` text of
//! each variant is the message returned to clients, so it is kept short and
//! free of internal detail; [`CoreError::to_details`] carries the rest for logs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use paysec_parser::ParseError;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MalformedRequest,
    ValidationError,
    Unauthorized,
    InvalidCredentials,
    MissingToken,
    Forbidden,
    AccountNotFound,
    TransactionNotFound,
    DuplicateEntry,
    InvalidId,
    RateLimited,
    StorageError,
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::MalformedRequest => write!(f, "MALFORMED_REQUEST"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::Unauthorized => write!(f, "UNAUTHORIZED"),
            ErrorCode::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            ErrorCode::MissingToken => write!(f, "MISSING_TOKEN"),
            ErrorCode::Forbidden => write!(f, "FORBIDDEN"),
            ErrorCode::AccountNotFound => write!(f, "ACCOUNT_NOT_FOUND"),
            ErrorCode::TransactionNotFound => write!(f, "TRANSACTION_NOT_FOUND"),
            ErrorCode::DuplicateEntry => write!(f, "DUPLICATE_ENTRY"),
            ErrorCode::InvalidId => write!(f, "INVALID_ID"),
            ErrorCode::RateLimited => write!(f, "RATE_LIMITED"),
            ErrorCode::StorageError => write!(f, "STORAGE_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestions.push(suggestion.to_string());
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Expected client mistakes
    Info,
    /// Rejected access attempts
    Warning,
    /// Operation failed on our side
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for paysec-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{message}")]
    MalformedRequest { message: String },

    #[error("{message}")]
    ValidationError { message: String },

    #[error("Unauthorized: Invalid token")]
    Unauthorized,

    #[error("Invalid password")]
    InvalidCredentials,

    #[error("No token provided.")]
    MissingToken,

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("User not found")]
    AccountNotFound { email: String },

    #[error("Transaction not found")]
    TransactionNotFound { id: String },

    #[error("{entry} already exists")]
    DuplicateEntry { entry: String },

    #[error("Invalid transaction id")]
    InvalidId { id: String },

    #[error("Too many requests from this IP, please try again after {window}")]
    RateLimited { window: String },

    #[error("Storage failure")]
    StorageError { message: String },

    #[error("Internal server error")]
    InternalError { message: String },
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::ValidationError {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        CoreError::MalformedRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CoreError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::MalformedRequest { .. } => ErrorCode::MalformedRequest,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::Unauthorized => ErrorCode::Unauthorized,
            CoreError::InvalidCredentials => ErrorCode::InvalidCredentials,
            CoreError::MissingToken => ErrorCode::MissingToken,
            CoreError::Forbidden { .. } => ErrorCode::Forbidden,
            CoreError::AccountNotFound { .. } => ErrorCode::AccountNotFound,
            CoreError::TransactionNotFound { .. } => ErrorCode::TransactionNotFound,
            CoreError::DuplicateEntry { .. } => ErrorCode::DuplicateEntry,
            CoreError::InvalidId { .. } => ErrorCode::InvalidId,
            CoreError::RateLimited { .. } => ErrorCode::RateLimited,
            CoreError::StorageError { .. } => ErrorCode::StorageError,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    /// HTTP status this error maps to
    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::MalformedRequest { .. }
            | CoreError::ValidationError { .. }
            | CoreError::InvalidId { .. }
            // login answers an unknown email with 400, not 404
            | CoreError::AccountNotFound { .. } => 400,
            CoreError::Unauthorized | CoreError::InvalidCredentials => 401,
            CoreError::MissingToken | CoreError::Forbidden { .. } => 403,
            CoreError::TransactionNotFound { .. } => 404,
            CoreError::DuplicateEntry { .. } => 409,
            CoreError::RateLimited { .. } => 429,
            CoreError::StorageError { .. } | CoreError::InternalError { .. } => 500,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::MalformedRequest { .. }
            | CoreError::ValidationError { .. }
            | CoreError::InvalidId { .. }
            | CoreError::AccountNotFound { .. }
            | CoreError::TransactionNotFound { .. }
            | CoreError::DuplicateEntry { .. } => ErrorSeverity::Info,
            CoreError::Unauthorized
            | CoreError::InvalidCredentials
            | CoreError::MissingToken
            | CoreError::Forbidden { .. }
            | CoreError::RateLimited { .. } => ErrorSeverity::Warning,
            CoreError::StorageError { .. } => ErrorSeverity::Error,
            CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::AccountNotFound { email } => details
                .with_detail(serde_json::json!({ "email": paysec_utils::mask_email(email) }))
                .with_suggestion("Register before logging in."),
            CoreError::TransactionNotFound { id } | CoreError::InvalidId { id } => details
                .with_detail(serde_json::json!({ "id": id }))
                .with_suggestion("Transaction ids are 24 hexadecimal characters."),
            CoreError::Forbidden { .. } => {
                details.with_suggestion("Log in with an employee account.")
            }
            CoreError::StorageError { message } | CoreError::InternalError { message } => {
                details.with_detail(serde_json::json!({ "cause": message }))
            }
            _ => details,
        }
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<ParseError> for CoreError {
    fn from(error: ParseError) -> Self {
        CoreError::ValidationError {
            message: error.to_string(),
        }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Masked email of the caller, if authenticated
    pub user: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            user: None,
        }
    }

    pub fn with_user(mut self, email: &str) -> Self {
        self.user = Some(paysec_utils::mask_email(email));
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Info => log::debug!(
                target: "paysec::error",
                "{} - Operation: {} - User: {:?}",
                error.to_details(),
                context.operation,
                context.user
            ),
            ErrorSeverity::Warning => log::warn!(
                target: "paysec::error",
                "{} - Operation: {} - User: {:?}",
                error.to_details(),
                context.operation,
                context.user
            ),
            ErrorSeverity::Error | ErrorSeverity::Critical => log::error!(
                target: "paysec::error",
                "{} - Operation: {} - User: {:?}",
                error.to_details(),
                context.operation,
                context.user
            ),
        }
    }
}
