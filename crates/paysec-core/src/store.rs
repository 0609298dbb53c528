//! Document store abstractions and the in-memory implementation
//!
//! Each trait method is one atomic read or write. The in-memory stores hold a
//! `tokio::sync::RwLock` only for the duration of that operation.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::models::{Account, NewAccount, NewTransaction, Transaction};
use crate::query::TransactionQuery;
use crate::types::{Role, VerificationStatus};

/// Transaction collection
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Persist an admitted transaction and assign its id
    async fn insert(&self, transaction: NewTransaction) -> CoreResult<Transaction>;

    /// All transactions matching `query`, in insertion order
    async fn find(&self, query: &TransactionQuery) -> CoreResult<Vec<Transaction>>;

    async fn get(&self, id: &str) -> CoreResult<Option<Transaction>>;

    /// Overwrite the status of `id`, returning the previous status, or
    /// `None` when no such transaction exists
    async fn set_status(&self, id: &str, status: VerificationStatus) -> CoreResult<Option<VerificationStatus>>;

    async fn count(&self, query: &TransactionQuery) -> CoreResult<usize> {
        Ok(self.find(query).await?.len())
    }
}

/// Account collections, one per role
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create an account; fails with `DuplicateEntry` if the email is taken for that role
    async fn insert(&self, account: NewAccount) -> CoreResult<Account>;

    async fn find_by_email(&self, role: Role, email: &str) -> CoreResult<Option<Account>>;

    async fn count(&self, role: Role) -> CoreResult<usize>;
}

pub type TransactionStoreRef = Arc<dyn TransactionStore>;
pub type AccountStoreRef = Arc<dyn AccountStore>;

// ==================== In-memory ====================

#[derive(Default)]
struct TransactionTable {
    rows: Vec<Transaction>,
    /// id -> position in `rows`
    index: HashMap<String, usize>,
}

/// In-memory transaction collection
#[derive(Default)]
pub struct InMemoryTransactionStore {
    table: RwLock<TransactionTable>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn insert(&self, transaction: NewTransaction) -> CoreResult<Transaction> {
        let mut table = self.table.write().await;
        let mut id = paysec_utils::generate_object_id();
        while table.index.contains_key(&id) {
            id = paysec_utils::generate_object_id();
        }

        let stored = transaction.into_transaction(id.clone());
        let position = table.rows.len();
        table.rows.push(stored.clone());
        table.index.insert(id, position);
        Ok(stored)
    }

    async fn find(&self, query: &TransactionQuery) -> CoreResult<Vec<Transaction>> {
        let table = self.table.read().await;
        Ok(table.rows.iter().filter(|t| query.matches(t)).cloned().collect())
    }

    async fn get(&self, id: &str) -> CoreResult<Option<Transaction>> {
        let table = self.table.read().await;
        Ok(table.index.get(id).map(|&i| table.rows[i].clone()))
    }

    async fn set_status(&self, id: &str, status: VerificationStatus) -> CoreResult<Option<VerificationStatus>> {
        let mut table = self.table.write().await;
        let position = match table.index.get(id) {
            Some(&i) => i,
            None => return Ok(None),
        };
        let row = table
            .rows
            .get_mut(position)
            .ok_or_else(|| CoreError::StorageError {
                message: format!("index points past end of table for {}", id),
            })?;
        let previous = row.status;
        row.status = status;
        Ok(Some(previous))
    }

    async fn count(&self, query: &TransactionQuery) -> CoreResult<usize> {
        let table = self.table.read().await;
        Ok(table.rows.iter().filter(|t| query.matches(t)).count())
    }
}

/// In-memory account collections keyed by role and email
#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<(Role, String), Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn insert(&self, account: NewAccount) -> CoreResult<Account> {
        let mut accounts = self.accounts.write().await;
        let key = (account.role, account.email.clone());
        if accounts.contains_key(&key) {
            return Err(CoreError::DuplicateEntry {
                entry: "User".to_string(),
            });
        }

        let stored = Account {
            id: paysec_utils::generate_object_id(),
            email: account.email,
            name: account.name,
            password_hash: account.password_hash,
            role: account.role,
            created: Utc::now(),
            id_number: account.id_number,
            account_number: account.account_number,
        };
        accounts.insert(key, stored.clone());
        Ok(stored)
    }

    async fn find_by_email(&self, role: Role, email: &str) -> CoreResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&(role, email.to_string())).cloned())
    }

    async fn count(&self, role: Role) -> CoreResult<usize> {
        let accounts = self.accounts.read().await;
        Ok(accounts.keys().filter(|(r, _)| *r == role).count())
    }
}
