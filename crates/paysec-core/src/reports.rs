//! Report structures for API responses

use serde::{Deserialize, Serialize};

/// Counts shown on the employee dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_customers: usize,
    pub total_employees: usize,
    pub total_transactions: usize,
    pub pending_transactions: usize,
    pub verified_transactions: usize,
    pub rejected_transactions: usize,
}
