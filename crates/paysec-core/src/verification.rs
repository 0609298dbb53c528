//! Review lifecycle of a transaction
//!
//! `Pending` is the only initial state. A review moves it to `Verified` or
//! `Rejected`; later reviews may flip between those two, but nothing returns
//! a transaction to `Pending`.

use crate::error::{CoreError, CoreResult};
use crate::models::Identity;
use crate::types::VerificationStatus;

/// Reviewer's decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Verify,
    Reject,
}

impl From<bool> for Decision {
    fn from(verified: bool) -> Self {
        if verified {
            Decision::Verify
        } else {
            Decision::Reject
        }
    }
}

impl Decision {
    pub fn target(self) -> VerificationStatus {
        match self {
            Decision::Verify => VerificationStatus::Verified,
            Decision::Reject => VerificationStatus::Rejected,
        }
    }
}

/// Next status after `decision`; last write wins
pub fn transition(_current: VerificationStatus, decision: Decision) -> VerificationStatus {
    decision.target()
}

/// Only employees may review
pub fn authorize_reviewer(identity: &Identity) -> CoreResult<()> {
    if identity.is_employee() {
        Ok(())
    } else {
        Err(CoreError::Forbidden {
            message: "only employees can verify transactions".to_string(),
        })
    }
}

/// Reject malformed ids before any lookup
pub fn check_object_id(id: &str) -> CoreResult<()> {
    if paysec_utils::is_object_id(id) {
        Ok(())
    } else {
        Err(CoreError::InvalidId { id: id.to_string() })
    }
}
