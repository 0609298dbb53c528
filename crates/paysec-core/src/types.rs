//! Basic types for the core banking module

use serde::{Deserialize, Serialize};

/// Account role. Customers submit transactions, employees review them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Employee,
}

impl Default for Role {
    fn default() -> Self {
        Role::Customer
    }
}

impl std::str::FromStr for Role {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "customer" | "customers" => Ok(Role::Customer),
            "employee" | "employees" => Ok(Role::Employee),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Employee => write!(f, "employee"),
        }
    }
}

/// Review state of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Submitted, not yet reviewed
    Pending,
    /// Approved by an employee
    Verified,
    /// Declined by an employee
    Rejected,
}

impl Default for VerificationStatus {
    fn default() -> Self {
        VerificationStatus::Pending
    }
}

impl VerificationStatus {
    pub fn is_verified(&self) -> bool {
        *self == VerificationStatus::Verified
    }

    pub fn is_reviewed(&self) -> bool {
        *self != VerificationStatus::Pending
    }
}

impl std::str::FromStr for VerificationStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(VerificationStatus::Pending),
            "verified" => Ok(VerificationStatus::Verified),
            "rejected" => Ok(VerificationStatus::Rejected),
            _ => Err(format!("Invalid verification status: {}", s)),
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationStatus::Pending => write!(f, "pending"),
            VerificationStatus::Verified => write!(f, "verified"),
            VerificationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str() {
        assert_eq!("Employee".parse::<Role>().unwrap(), Role::Employee);
        assert_eq!("customers".parse::<Role>().unwrap(), Role::Customer);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_status_names() {
        for status in [VerificationStatus::Pending, VerificationStatus::Verified, VerificationStatus::Rejected] {
            assert_eq!(status.to_string().parse::<VerificationStatus>().unwrap(), status);
        }
        assert_eq!(serde_json::to_value(VerificationStatus::Rejected).unwrap(), "rejected");
    }

    #[test]
    fn test_status_flags() {
        assert!(!VerificationStatus::Pending.is_reviewed());
        assert!(VerificationStatus::Rejected.is_reviewed());
        assert!(!VerificationStatus::Rejected.is_verified());
    }
}
