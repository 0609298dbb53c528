//! Core data models for accounts and transactions

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{Role, VerificationStatus};

/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Object id assigned by the store
    pub id: String,
    /// Login identity, unique per role
    pub email: String,
    pub name: String,
    /// PHC-format password hash; never serialized to clients
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created: DateTime<Utc>,
    /// 13-digit id number (customers only)
    pub id_number: Option<String>,
    /// BIC or IBAN-like account number (customers only)
    pub account_number: Option<String>,
}

/// Account about to be stored
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub id_number: Option<String>,
    pub account_number: Option<String>,
}

/// Stored money transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    /// Server-assigned creation instant
    pub timestamp: DateTime<Utc>,
    pub sender: String,
    /// BIC of the receiving institution
    pub receiver: String,
    pub amount: Decimal,
    pub currency: String,
    pub provider: String,
    pub account_info: Option<String>,
    pub status: VerificationStatus,
}

/// Admitted transaction, not yet assigned an id
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub timestamp: DateTime<Utc>,
    pub sender: String,
    pub receiver: String,
    pub amount: Decimal,
    pub currency: String,
    pub provider: String,
    pub account_info: Option<String>,
    pub status: VerificationStatus,
}

impl NewTransaction {
    pub fn into_transaction(self, id: String) -> Transaction {
        Transaction {
            id,
            timestamp: self.timestamp,
            sender: self.sender,
            receiver: self.receiver,
            amount: self.amount,
            currency: self.currency,
            provider: self.provider,
            account_info: self.account_info,
            status: self.status,
        }
    }
}

/// Client-facing JSON shape of a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    #[serde(rename = "_id")]
    pub id: String,
    /// RFC 3339 with millisecond precision
    pub timestamp: String,
    pub sender: String,
    pub receiver: String,
    pub amount: String,
    pub currency: String,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_info: Option<String>,
    pub status: VerificationStatus,
    /// True only once an employee has verified the transaction
    pub verified: bool,
}

impl From<&Transaction> for TransactionView {
    fn from(t: &Transaction) -> Self {
        Self {
            id: t.id.clone(),
            timestamp: t.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            sender: t.sender.clone(),
            receiver: t.receiver.clone(),
            amount: t.amount.to_string(),
            currency: t.currency.clone(),
            provider: t.provider.clone(),
            account_info: t.account_info.clone(),
            status: t.status,
            verified: t.status.is_verified(),
        }
    }
}

/// Authenticated caller, decoded from a bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }
}

/// Token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account email
    pub sub: String,
    pub role: Role,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.sub,
            role: claims.role,
        }
    }
}

/// Result of a successful register or login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub message: String,
    pub token: String,
}

/// Review decision on a stored transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub id: String,
    pub previous: VerificationStatus,
    pub current: VerificationStatus,
}
