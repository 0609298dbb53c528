//! Request admission rules
//!
//! Each validator walks its rules in a fixed order and stops at the first
//! failure, so the client always sees the earliest problem with its body.

use chrono::{DateTime, Utc};
use paysec_parser::patterns;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};
use crate::models::NewTransaction;
use crate::reference::ReferenceData;
use crate::types::VerificationStatus;

pub const TRANSACTION_FIELDS: [&str; 6] = ["sender", "receiver", "amount", "currency", "provider", "accountInfo"];
const REQUIRED_TRANSACTION_FIELDS: [&str; 5] = ["sender", "receiver", "amount", "currency", "provider"];
pub const MAX_ACCOUNT_INFO_CHARS: usize = 256;

pub const PASSWORD_POLICY: &str = "Password must be at least 8 characters long, contain at least one uppercase letter, one lowercase letter, and one digit";

fn as_object(body: &Value) -> CoreResult<&Map<String, Value>> {
    match body {
        Value::Object(obj) => Ok(obj),
        _ => Err(CoreError::validation("No data provided")),
    }
}

fn check_key_count(obj: &Map<String, Value>, min: usize, max: usize) -> CoreResult<()> {
    let n = obj.len();
    if n < min {
        return Err(CoreError::validation(format!("Not enough data. Expected {} keys, got {}", min, n)));
    }
    if n > max {
        let expected = if min == max {
            format!("{}", max)
        } else {
            format!("at most {}", max)
        };
        return Err(CoreError::validation(format!("Too much data. Expected {} keys, got {}", expected, n)));
    }
    Ok(())
}

/// Missing, null and empty string all count as not provided
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

fn require_present(obj: &Map<String, Value>, fields: &[&str]) -> CoreResult<()> {
    match fields.iter().find(|f| is_blank(obj.get(**f))) {
        Some(field) => Err(CoreError::validation(format!("No {} provided", field))),
        None => Ok(()),
    }
}

/// String field that must satisfy `check`, else `message`
fn string_field<'a>(obj: &'a Map<String, Value>, field: &str, check: fn(&str) -> bool, message: &str) -> CoreResult<&'a str> {
    obj.get(field)
        .and_then(Value::as_str)
        .filter(|s| check(s))
        .ok_or_else(|| CoreError::validation(message))
}

// ==================== Transactions ====================

/// Admission rules for submitted transactions
pub struct TransactionValidator<'a> {
    reference: &'a ReferenceData,
}

impl<'a> TransactionValidator<'a> {
    pub fn new(reference: &'a ReferenceData) -> Self {
        Self { reference }
    }

    /// Validate a transaction body, stamping it with `now` as pending
    pub fn validate(&self, body: &Value, now: DateTime<Utc>) -> CoreResult<NewTransaction> {
        let obj = as_object(body)?;
        check_key_count(obj, REQUIRED_TRANSACTION_FIELDS.len(), TRANSACTION_FIELDS.len())?;
        if let Some(key) = obj.keys().find(|k| !TRANSACTION_FIELDS.contains(&k.as_str())) {
            return Err(CoreError::validation(format!("Unexpected field: {}", key)));
        }
        require_present(obj, &REQUIRED_TRANSACTION_FIELDS)?;

        let sender = string_field(obj, "sender", patterns::is_sender_email, "Invalid sender")?;
        let receiver = string_field(obj, "receiver", patterns::is_bic, "Invalid receiver")?;

        let amount = obj
            .get("amount")
            .and_then(patterns::parse_amount)
            .filter(|a| *a > Decimal::ZERO)
            .ok_or_else(|| CoreError::validation("Invalid amount"))?;

        let currency = obj
            .get("currency")
            .and_then(Value::as_str)
            .filter(|c| self.reference.has_currency(c))
            .ok_or_else(|| CoreError::validation("Invalid currency"))?;

        let provider = obj
            .get("provider")
            .and_then(Value::as_str)
            .filter(|p| self.reference.has_provider(p))
            .ok_or_else(|| CoreError::validation("Invalid provider"))?;

        let account_info = match obj.get("accountInfo") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.chars().count() <= MAX_ACCOUNT_INFO_CHARS => {
                if s.is_empty() {
                    None
                } else {
                    Some(s.clone())
                }
            }
            Some(_) => return Err(CoreError::validation("Invalid accountInfo")),
        };

        Ok(NewTransaction {
            timestamp: now,
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            amount,
            currency: currency.to_string(),
            provider: provider.to_string(),
            account_info,
            status: VerificationStatus::Pending,
        })
    }
}

// ==================== Accounts ====================

/// Validated customer sign-up
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRegistration {
    pub name: String,
    pub id_number: String,
    pub account_number: String,
    pub email: String,
    pub password: String,
}

/// Validated employee sign-up
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn password_field(obj: &Map<String, Value>) -> CoreResult<String> {
    string_field(obj, "password", patterns::is_strong_password, PASSWORD_POLICY).map(String::from)
}

fn email_field(obj: &Map<String, Value>) -> CoreResult<String> {
    string_field(obj, "email", patterns::is_account_email, "Invalid email format").map(String::from)
}

fn name_field(obj: &Map<String, Value>) -> CoreResult<String> {
    string_field(obj, "name", patterns::is_person_name, "Invalid name").map(String::from)
}

pub fn validate_customer_registration(body: &Value) -> CoreResult<CustomerRegistration> {
    let obj = as_object(body)?;
    check_key_count(obj, 5, 5)?;
    require_present(obj, &["name", "idNumber", "accountNumber", "email", "password"])?;

    let name = name_field(obj)?;
    let id_number = string_field(obj, "idNumber", patterns::is_id_number, "Invalid ID number")?.to_string();
    let account_number =
        string_field(obj, "accountNumber", patterns::is_account_number, "Invalid account number")?.to_string();
    let email = email_field(obj)?;
    let password = password_field(obj)?;

    Ok(CustomerRegistration {
        name,
        id_number,
        account_number,
        email,
        password,
    })
}

pub fn validate_employee_registration(body: &Value) -> CoreResult<EmployeeRegistration> {
    let obj = as_object(body)?;
    check_key_count(obj, 3, 3)?;
    require_present(obj, &["name", "email", "password"])?;

    Ok(EmployeeRegistration {
        name: name_field(obj)?,
        email: email_field(obj)?,
        password: password_field(obj)?,
    })
}

pub fn validate_login(body: &Value) -> CoreResult<LoginRequest> {
    let obj = as_object(body)?;
    check_key_count(obj, 2, 2)?;
    require_present(obj, &["email", "password"])?;

    Ok(LoginRequest {
        email: email_field(obj)?,
        password: password_field(obj)?,
    })
}

/// Parse a review body `{oid, verified}`
pub fn validate_verification(body: &Value) -> CoreResult<(String, bool)> {
    let obj = as_object(body)?;
    let oid = obj
        .get("oid")
        .and_then(Value::as_str)
        .ok_or_else(|| CoreError::InvalidId {
            id: obj.get("oid").map(|v| v.to_string()).unwrap_or_default(),
        })?;
    let verified = obj
        .get("verified")
        .and_then(Value::as_bool)
        .ok_or_else(|| CoreError::validation("Invalid verified value"))?;
    Ok((oid.to_string(), verified))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn message(result: CoreResult<impl std::fmt::Debug>) -> String {
        result.unwrap_err().to_string()
    }

    fn body() -> Value {
        json!({
            "sender": "alice@bank.com",
            "receiver": "ABSAZAJJ",
            "amount": "150.25",
            "currency": "ZAR",
            "provider": "SWIFT"
        })
    }

    fn validate(body: &Value) -> CoreResult<NewTransaction> {
        let reference = ReferenceData::builtin();
        TransactionValidator::new(&reference).validate(body, Utc::now())
    }

    #[test]
    fn test_valid_transaction() {
        let mut b = body();
        b["accountInfo"] = json!("March rent");
        let t = validate(&b).unwrap();
        assert_eq!(t.amount, Decimal::from_str("150.25").unwrap());
        assert_eq!(t.status, VerificationStatus::Pending);
        assert_eq!(t.account_info.as_deref(), Some("March rent"));
    }

    #[test]
    fn test_numeric_amount_accepted() {
        let mut b = body();
        b["amount"] = json!(99);
        assert_eq!(validate(&b).unwrap().amount, Decimal::from(99));
    }

    #[test]
    fn test_shape_rules() {
        assert_eq!(message(validate(&Value::Null)), "No data provided");
        assert_eq!(message(validate(&json!([1, 2]))), "No data provided");

        let mut b = body();
        b.as_object_mut().unwrap().remove("provider");
        assert_eq!(message(validate(&b)), "Not enough data. Expected 5 keys, got 4");

        let mut b = body();
        b["accountInfo"] = json!("x");
        b["note"] = json!("y");
        assert_eq!(message(validate(&b)), "Too much data. Expected at most 6 keys, got 7");

        let mut b = body();
        b["memo"] = json!("y");
        assert_eq!(message(validate(&b)), "Unexpected field: memo");
    }

    #[test]
    fn test_required_fields_in_order() {
        let mut b = body();
        b["receiver"] = json!("");
        b["currency"] = Value::Null;
        assert_eq!(message(validate(&b)), "No receiver provided");
    }

    #[test]
    fn test_amount_rules() {
        for bad in [json!(0), json!(-5), json!("-0.01"), json!("ten"), json!(true)] {
            let mut b = body();
            b["amount"] = bad.clone();
            assert_eq!(message(validate(&b)), "Invalid amount", "{bad}");
        }
    }

    #[test]
    fn test_reference_rules() {
        let mut b = body();
        b["currency"] = json!("BTC");
        assert_eq!(message(validate(&b)), "Invalid currency");

        let mut b = body();
        b["provider"] = json!("Western Union");
        assert_eq!(message(validate(&b)), "Invalid provider");
    }

    #[test]
    fn test_format_rules() {
        let mut b = body();
        b["sender"] = json!("alice");
        assert_eq!(message(validate(&b)), "Invalid sender");

        let mut b = body();
        b["receiver"] = json!("absazajj");
        assert_eq!(message(validate(&b)), "Invalid receiver");

        let mut b = body();
        b["accountInfo"] = json!("x".repeat(257));
        assert_eq!(message(validate(&b)), "Invalid accountInfo");

        let mut b = body();
        b["accountInfo"] = json!(12);
        assert_eq!(message(validate(&b)), "Invalid accountInfo");
    }

    #[test]
    fn test_customer_registration() {
        let ok = json!({
            "name": "Thandi O'Neil",
            "idNumber": "9001015800087",
            "accountNumber": "GB82WEST12345698765432",
            "email": "thandi@bank.co.za",
            "password": "Secur3Pass"
        });
        let reg = validate_customer_registration(&ok).unwrap();
        assert_eq!(reg.id_number, "9001015800087");

        let mut weak = ok.clone();
        weak["password"] = json!("password");
        assert_eq!(message(validate_customer_registration(&weak)), PASSWORD_POLICY);

        let mut bad_id = ok.clone();
        bad_id["idNumber"] = json!("123");
        assert_eq!(message(validate_customer_registration(&bad_id)), "Invalid ID number");

        let mut extra = ok;
        extra["role"] = json!("employee");
        assert_eq!(message(validate_customer_registration(&extra)), "Too much data. Expected 5 keys, got 6");
    }

    #[test]
    fn test_employee_registration_and_login() {
        let reg = validate_employee_registration(&json!({"name": "Sam", "email": "sam@bank.com", "password": "Str0ngPass"})).unwrap();
        assert_eq!(reg.name, "Sam");

        assert_eq!(
            message(validate_login(&json!({"email": "sam@bank.com"}))),
            "Not enough data. Expected 2 keys, got 1"
        );
        assert_eq!(
            message(validate_login(&json!({"email": "sam@bank", "password": "Str0ngPass"}))),
            "Invalid email format"
        );
        assert_eq!(
            message(validate_login(&json!({"username": "sam", "password": "Str0ngPass"}))),
            "No email provided"
        );
    }

    #[test]
    fn test_verification_body() {
        let (oid, verified) = validate_verification(&json!({"oid": "507f1f77bcf86cd799439011", "verified": true})).unwrap();
        assert_eq!(oid, "507f1f77bcf86cd799439011");
        assert!(verified);

        assert_eq!(
            message(validate_verification(&json!({"oid": "507f1f77bcf86cd799439011", "verified": "yes"}))),
            "Invalid verified value"
        );
        assert!(matches!(
            validate_verification(&json!({"oid": 7, "verified": true})),
            Err(CoreError::InvalidId { .. })
        ));
    }
}
