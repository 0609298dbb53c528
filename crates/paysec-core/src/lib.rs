//! Core banking logic: accounts, transaction admission, filtering and review

pub mod auth;
pub mod error;
pub mod models;
pub mod query;
pub mod reference;
pub mod reports;
pub mod store;
pub mod types;
pub mod validation;
pub mod verification;

use chrono::Utc;
use paysec_config::Config;
use paysec_parser::FilterCriteria;
use paysec_utils::mask_email;
use serde_json::Value;
use std::sync::Arc;

pub use auth::{Argon2Hasher, CredentialHasher, HasherRef, TokenService};
pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorCode, ErrorContext, ErrorLogger, ErrorSeverity};
pub use models::{Account, AuthToken, Identity, NewAccount, NewTransaction, Transaction, TransactionView, VerificationOutcome};
pub use query::TransactionQuery;
pub use reference::{ReferenceData, ReferenceLoader, ReferenceSource};
pub use reports::DashboardStats;
pub use store::{AccountStore, AccountStoreRef, InMemoryAccountStore, InMemoryTransactionStore, TransactionStore, TransactionStoreRef};
pub use types::{Role, VerificationStatus};

use validation::TransactionValidator;
use verification::Decision;

/// Banking service shared by all request handlers
pub struct Bank {
    accounts: AccountStoreRef,
    transactions: TransactionStoreRef,
    hasher: HasherRef,
    tokens: TokenService,
    reference: Arc<ReferenceData>,
}

impl Bank {
    /// Assemble a bank from explicit parts
    pub fn new(
        accounts: AccountStoreRef,
        transactions: TransactionStoreRef,
        hasher: HasherRef,
        tokens: TokenService,
        reference: ReferenceData,
    ) -> Self {
        Self {
            accounts,
            transactions,
            hasher,
            tokens,
            reference: Arc::new(reference),
        }
    }

    /// In-memory stores with hashing and tokens from configuration
    pub fn in_memory(config: &Config, reference: ReferenceData) -> CoreResult<Self> {
        let hasher = Argon2Hasher::from_config(&config.auth)?;
        Ok(Self::new(
            Arc::new(InMemoryAccountStore::new()),
            Arc::new(InMemoryTransactionStore::new()),
            Arc::new(hasher),
            TokenService::from_config(&config.auth),
            reference,
        ))
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    // ==================== Accounts ====================

    pub async fn register_customer(&self, body: &Value) -> CoreResult<AuthToken> {
        let reg = validation::validate_customer_registration(body)?;
        let account = NewAccount {
            email: reg.email,
            name: reg.name,
            password_hash: String::new(),
            role: Role::Customer,
            id_number: Some(reg.id_number),
            account_number: Some(reg.account_number),
        };
        self.register(account, reg.password).await
    }

    pub async fn register_employee(&self, body: &Value) -> CoreResult<AuthToken> {
        let reg = validation::validate_employee_registration(body)?;
        let account = NewAccount {
            email: reg.email,
            name: reg.name,
            password_hash: String::new(),
            role: Role::Employee,
            id_number: None,
            account_number: None,
        };
        self.register(account, reg.password).await
    }

    async fn register(&self, mut account: NewAccount, password: String) -> CoreResult<AuthToken> {
        // insert re-checks under the write lock
        if self.accounts.find_by_email(account.role, &account.email).await?.is_some() {
            return Err(CoreError::DuplicateEntry {
                entry: "User".to_string(),
            });
        }

        account.password_hash = auth::hash_blocking(self.hasher.clone(), password).await?;
        let stored = self.accounts.insert(account).await?;
        let token = self.tokens.issue(&stored.email, stored.role)?;

        log::info!("Registered {} {}", stored.role, mask_email(&stored.email));
        Ok(AuthToken {
            message: "Registration successful".to_string(),
            token,
        })
    }

    pub async fn login(&self, role: Role, body: &Value) -> CoreResult<AuthToken> {
        let req = validation::validate_login(body)?;
        let token = self.authenticate_credentials(role, &req.email, &req.password).await?;
        Ok(AuthToken {
            message: "Login successful".to_string(),
            token,
        })
    }

    /// Check an email/password pair for `role` and issue a token
    pub async fn authenticate_credentials(&self, role: Role, email: &str, password: &str) -> CoreResult<String> {
        let account = self
            .accounts
            .find_by_email(role, email)
            .await?
            .ok_or_else(|| CoreError::AccountNotFound {
                email: email.to_string(),
            })?;

        let matches = auth::verify_blocking(self.hasher.clone(), password.to_string(), account.password_hash).await?;
        if !matches {
            log::warn!("Failed {} login for {}", role, mask_email(email));
            return Err(CoreError::InvalidCredentials);
        }

        log::info!("{} {} logged in", role, mask_email(email));
        self.tokens.issue(email, role)
    }

    /// Decode the `Authorization` header into the caller's identity
    pub fn verify_token(&self, header: Option<&str>) -> CoreResult<Identity> {
        self.tokens.verify_header(header)
    }

    // ==================== Transactions ====================

    pub async fn submit_transaction(&self, identity: &Identity, body: &Value) -> CoreResult<Transaction> {
        let admitted = TransactionValidator::new(&self.reference).validate(body, Utc::now())?;
        let stored = self.transactions.insert(admitted).await?;
        log::info!(
            "Transaction {} submitted by {}: {} {} via {}",
            stored.id,
            mask_email(&identity.email),
            stored.amount,
            stored.currency,
            stored.provider
        );
        Ok(stored)
    }

    /// Employees see every transaction; customers only those they sent
    pub async fn list_transactions(&self, identity: &Identity, criteria: FilterCriteria) -> CoreResult<Vec<Transaction>> {
        let query = TransactionQuery::from_criteria(criteria)?;
        if identity.is_employee() {
            return self.transactions.find(&query).await;
        }

        if query.sender.as_deref().is_some_and(|s| s != identity.email) {
            return Ok(Vec::new());
        }
        self.transactions.find(&query.with_sender(&identity.email)).await
    }

    /// Record an employee's review of a transaction
    pub async fn set_verification(&self, identity: &Identity, oid: &str, verified: bool) -> CoreResult<VerificationOutcome> {
        verification::check_object_id(oid)?;
        verification::authorize_reviewer(identity)?;

        let current = self
            .transactions
            .get(oid)
            .await?
            .ok_or_else(|| CoreError::TransactionNotFound { id: oid.to_string() })?;
        let next = verification::transition(current.status, Decision::from(verified));

        let previous = self
            .transactions
            .set_status(oid, next)
            .await?
            .ok_or_else(|| CoreError::TransactionNotFound { id: oid.to_string() })?;

        if previous.is_reviewed() {
            log::warn!(
                "Transaction {} re-reviewed: {} -> {} by {}",
                oid,
                previous,
                next,
                mask_email(&identity.email)
            );
        } else {
            log::info!(
                "Transaction {} {} -> {} by {}",
                oid,
                previous,
                next,
                mask_email(&identity.email)
            );
        }
        Ok(VerificationOutcome {
            id: oid.to_string(),
            previous,
            current: next,
        })
    }

    // ==================== Reports ====================

    pub async fn stats(&self, identity: &Identity) -> CoreResult<DashboardStats> {
        if !identity.is_employee() {
            return Err(CoreError::Forbidden {
                message: "only employees can view statistics".to_string(),
            });
        }

        let by_status = |s| TransactionQuery::all().with_status(s);
        Ok(DashboardStats {
            total_customers: self.accounts.count(Role::Customer).await?,
            total_employees: self.accounts.count(Role::Employee).await?,
            total_transactions: self.transactions.count(&TransactionQuery::all()).await?,
            pending_transactions: self.transactions.count(&by_status(VerificationStatus::Pending)).await?,
            verified_transactions: self.transactions.count(&by_status(VerificationStatus::Verified)).await?,
            rejected_transactions: self.transactions.count(&by_status(VerificationStatus::Rejected)).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bank() -> Bank {
        Bank::new(
            Arc::new(InMemoryAccountStore::new()),
            Arc::new(InMemoryTransactionStore::new()),
            Arc::new(Argon2Hasher::with_params(8, 1).unwrap()),
            TokenService::new("unit-test-secret", 3600),
            ReferenceData::builtin(),
        )
    }

    fn employee() -> Identity {
        Identity {
            email: "sam@bank.com".to_string(),
            role: Role::Employee,
        }
    }

    fn customer() -> Identity {
        Identity {
            email: "amy@bank.com".to_string(),
            role: Role::Customer,
        }
    }

    fn transfer(amount: Value) -> Value {
        json!({
            "sender": "amy@bank.com",
            "receiver": "ABSAZAJJ",
            "amount": amount,
            "currency": "USD",
            "provider": "SWIFT"
        })
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let bank = bank();
        let body = json!({"name": "Sam Lee", "email": "sam@bank.com", "password": "Str0ngPass"});
        let registered = bank.register_employee(&body).await.unwrap();
        let identity = bank.verify_token(Some(registered.token.as_str())).unwrap();
        assert_eq!(identity, employee());

        let login = bank
            .login(Role::Employee, &json!({"email": "sam@bank.com", "password": "Str0ngPass"}))
            .await
            .unwrap();
        assert_eq!(login.message, "Login successful");

        let err = bank.register_employee(&body).await.unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_login_failures() {
        let bank = bank();
        bank.register_employee(&json!({"name": "Sam", "email": "sam@bank.com", "password": "Str0ngPass"}))
            .await
            .unwrap();

        let err = bank
            .login(Role::Employee, &json!({"email": "sam@bank.com", "password": "Wr0ngPass1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidCredentials));

        // roles have separate credential stores
        let err = bank
            .login(Role::Customer, &json!({"email": "sam@bank.com", "password": "Str0ngPass"}))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::AccountNotFound { .. }));
    }

    #[tokio::test]
    async fn test_weak_password_rejected() {
        let err = bank()
            .register_customer(&json!({
                "name": "Amy",
                "idNumber": "9001015800087",
                "accountNumber": "ABSAZAJJ",
                "email": "amy@bank.com",
                "password": "password"
            }))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), validation::PASSWORD_POLICY);
    }

    #[tokio::test]
    async fn test_submit_and_review() {
        let bank = bank();
        let t = bank.submit_transaction(&customer(), &transfer(json!(120))).await.unwrap();
        assert_eq!(t.status, VerificationStatus::Pending);

        let verified = FilterCriteria::from_pairs([("verified", "true")]).unwrap();
        assert!(bank.list_transactions(&employee(), verified.clone()).await.unwrap().is_empty());

        let outcome = bank.set_verification(&employee(), &t.id, true).await.unwrap();
        assert_eq!(outcome.previous, VerificationStatus::Pending);
        assert_eq!(outcome.current, VerificationStatus::Verified);

        let listed = bank.list_transactions(&employee(), verified).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, t.id);
    }

    #[tokio::test]
    async fn test_pending_listed_as_unverified() {
        let bank = bank();
        bank.submit_transaction(&customer(), &transfer(json!("10.00"))).await.unwrap();

        let unverified = FilterCriteria::from_pairs([("verified", "false")]).unwrap();
        assert_eq!(bank.list_transactions(&employee(), unverified).await.unwrap().len(), 1);

        let rejected = FilterCriteria::from_pairs([("status", "rejected")]).unwrap();
        assert!(bank.list_transactions(&employee(), rejected).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_customers_list_only_their_own() {
        let bank = bank();
        let mine = bank.submit_transaction(&customer(), &transfer(json!(10))).await.unwrap();
        let mut other = transfer(json!(20));
        other["sender"] = json!("bob@bank.com");
        bank.submit_transaction(&customer(), &other).await.unwrap();

        let listed = bank.list_transactions(&customer(), FilterCriteria::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, mine.id);

        let theirs = FilterCriteria::from_pairs([("sender", "bob@bank.com")]).unwrap();
        assert!(bank.list_transactions(&customer(), theirs.clone()).await.unwrap().is_empty());
        assert_eq!(bank.list_transactions(&employee(), theirs).await.unwrap().len(), 1);
        assert_eq!(bank.list_transactions(&employee(), FilterCriteria::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_last_review_wins() {
        let bank = bank();
        let t = bank.submit_transaction(&customer(), &transfer(json!(5))).await.unwrap();

        bank.set_verification(&employee(), &t.id, true).await.unwrap();
        let outcome = bank.set_verification(&employee(), &t.id, false).await.unwrap();
        assert!(outcome.previous.is_reviewed());
        assert_eq!(outcome.previous, VerificationStatus::Verified);
        assert_eq!(outcome.current, VerificationStatus::Rejected);
    }

    #[tokio::test]
    async fn test_review_errors() {
        let bank = bank();
        let t = bank.submit_transaction(&customer(), &transfer(json!(5))).await.unwrap();

        let err = bank.set_verification(&employee(), "not-an-id", true).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidId { .. }));

        let err = bank.set_verification(&customer(), &t.id, true).await.unwrap_err();
        assert!(matches!(err, CoreError::Forbidden { .. }));

        let err = bank
            .set_verification(&employee(), "aaaaaaaaaaaaaaaaaaaaaaaa", true)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::TransactionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_rejected_submission_not_stored() {
        let bank = bank();
        let err = bank.submit_transaction(&customer(), &transfer(json!(0))).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid amount");
        assert!(bank.list_transactions(&employee(), FilterCriteria::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stats() {
        let bank = bank();
        let a = bank.submit_transaction(&customer(), &transfer(json!(1))).await.unwrap();
        let b = bank.submit_transaction(&customer(), &transfer(json!(2))).await.unwrap();
        bank.submit_transaction(&customer(), &transfer(json!(3))).await.unwrap();
        bank.set_verification(&employee(), &a.id, true).await.unwrap();
        bank.set_verification(&employee(), &b.id, false).await.unwrap();

        let stats = bank.stats(&employee()).await.unwrap();
        assert_eq!(stats.total_transactions, 3);
        assert_eq!(stats.pending_transactions, 1);
        assert_eq!(stats.verified_transactions, 1);
        assert_eq!(stats.rejected_transactions, 1);

        assert!(matches!(bank.stats(&customer()).await, Err(CoreError::Forbidden { .. })));
    }
}
