//! Store-side transaction query built from a parsed filter

use paysec_parser::{FilterCriteria, TimestampFilter};

use crate::error::{CoreError, CoreResult};
use crate::models::Transaction;
use crate::types::VerificationStatus;

/// Conjunction of optional predicates. The default query matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    pub timestamp: Option<TimestampFilter>,
    pub sender: Option<String>,
    pub receiver: Option<String>,
    /// `true` selects verified; `false` selects pending and rejected
    pub verified: Option<bool>,
    pub status: Option<VerificationStatus>,
}

impl TransactionQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn from_criteria(criteria: FilterCriteria) -> CoreResult<Self> {
        let status = criteria
            .status
            .map(|s| {
                s.parse::<VerificationStatus>()
                    .map_err(|_| CoreError::validation("Invalid status filter"))
            })
            .transpose()?;

        Ok(Self {
            timestamp: criteria.timestamp,
            sender: criteria.sender,
            receiver: criteria.receiver,
            verified: criteria.verified,
            status,
        })
    }

    pub fn with_sender(mut self, sender: &str) -> Self {
        self.sender = Some(sender.to_string());
        self
    }

    pub fn with_status(mut self, status: VerificationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, t: &Transaction) -> bool {
        self.timestamp.map_or(true, |f| f.matches(&t.timestamp))
            && self.sender.as_ref().map_or(true, |s| *s == t.sender)
            && self.receiver.as_ref().map_or(true, |r| *r == t.receiver)
            && self.verified.map_or(true, |v| v == t.status.is_verified())
            && self.status.map_or(true, |s| s == t.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn txn(day: u32, sender: &str, status: VerificationStatus) -> Transaction {
        Transaction {
            id: format!("{:024x}", day),
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
            sender: sender.to_string(),
            receiver: "DEUTDEFF".to_string(),
            amount: Decimal::from(10),
            currency: "EUR".to_string(),
            provider: "SWIFT".to_string(),
            account_info: None,
            status,
        }
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(TransactionQuery::all().matches(&txn(1, "a@b.com", VerificationStatus::Rejected)));
    }

    #[test]
    fn test_verified_false_includes_pending_and_rejected() {
        let q = TransactionQuery {
            verified: Some(false),
            ..TransactionQuery::default()
        };
        assert!(q.matches(&txn(1, "a@b.com", VerificationStatus::Pending)));
        assert!(q.matches(&txn(1, "a@b.com", VerificationStatus::Rejected)));
        assert!(!q.matches(&txn(1, "a@b.com", VerificationStatus::Verified)));
    }

    #[test]
    fn test_conjunction() {
        let criteria = FilterCriteria::from_pairs([("sender", "a@b.com"), ("timestamp", ">2024-01-05"), ("status", "pending")]).unwrap();
        let q = TransactionQuery::from_criteria(criteria).unwrap();

        assert!(q.matches(&txn(6, "a@b.com", VerificationStatus::Pending)));
        assert!(!q.matches(&txn(4, "a@b.com", VerificationStatus::Pending)));
        assert!(!q.matches(&txn(6, "c@d.com", VerificationStatus::Pending)));
        assert!(!q.matches(&txn(6, "a@b.com", VerificationStatus::Rejected)));
    }

    #[test]
    fn test_unknown_status() {
        let criteria = FilterCriteria::from_pairs([("status", "archived")]).unwrap();
        let err = TransactionQuery::from_criteria(criteria).unwrap_err();
        assert_eq!(err.to_string(), "Invalid status filter");
    }
}
