//! Field shape checks shared by request validation and filter parsing

use once_cell::sync::OnceCell;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Sender addresses on transactions (stricter than registration emails).
///
/// Classes are spelled out in ASCII; `\w` and `\d` are Unicode-aware in `regex`.
pub fn is_sender_email(s: &str) -> bool {
    static SENDER: OnceCell<Regex> = OnceCell::new();
    SENDER
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_.-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,6}$").unwrap())
        .is_match(s)
}

/// Login identity emails
pub fn is_account_email(s: &str) -> bool {
    static EMAIL: OnceCell<Regex> = OnceCell::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
        .is_match(s)
}

/// SWIFT/BIC code: bank(4) country(2) location(2) optional branch(3)
pub fn is_bic(s: &str) -> bool {
    static BIC: OnceCell<Regex> = OnceCell::new();
    BIC.get_or_init(|| Regex::new(r"^[A-Z]{4}[A-Z]{2}[A-Z0-9]{2}([A-Z0-9]{3})?$").unwrap())
        .is_match(s)
}

pub fn is_iban_like(s: &str) -> bool {
    static IBAN: OnceCell<Regex> = OnceCell::new();
    IBAN.get_or_init(|| Regex::new(r"^[A-Z]{2}[0-9]{2}[A-Z0-9]{1,30}$").unwrap())
        .is_match(s)
}

/// Customer account numbers are either a BIC or IBAN-like
pub fn is_account_number(s: &str) -> bool {
    is_bic(s) || is_iban_like(s)
}

pub fn is_person_name(s: &str) -> bool {
    static NAME: OnceCell<Regex> = OnceCell::new();
    NAME.get_or_init(|| Regex::new(r"^[A-Za-z' ]+$").unwrap())
        .is_match(s)
}

/// 13-digit national id number
pub fn is_id_number(s: &str) -> bool {
    static ID_NUMBER: OnceCell<Regex> = OnceCell::new();
    ID_NUMBER
        .get_or_init(|| Regex::new(r"^[0-9]{13}$").unwrap())
        .is_match(s)
}

/// At least 8 characters with an uppercase letter, a lowercase letter and a digit.
///
/// The regex crate has no lookahead, so the classes are checked by hand.
pub fn is_strong_password(s: &str) -> bool {
    s.chars().count() >= 8
        && s.chars().any(|c| c.is_ascii_digit())
        && s.chars().any(|c| c.is_ascii_lowercase())
        && s.chars().any(|c| c.is_ascii_uppercase())
}

/// Read a monetary amount from a JSON number or a numeric string
pub fn parse_amount(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        serde_json::Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .ok()
        }
        _ => None,
    }
}
