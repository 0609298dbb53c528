//! Credential hashing and bearer tokens

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;

use paysec_config::AuthConfig;

use crate::error::{CoreError, CoreResult};
use crate::models::{Claims, Identity};
use crate::types::Role;

/// One-way password hashing
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> CoreResult<String>;

    /// `Ok(false)` on mismatch; `Err` only when `hash` is unreadable
    fn verify(&self, password: &str, hash: &str) -> CoreResult<bool>;
}

pub type HasherRef = Arc<dyn CredentialHasher>;

/// Argon2id with configurable cost
#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn with_params(memory_kib: u32, iterations: u32) -> CoreResult<Self> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| CoreError::internal(format!("argon2 parameters: {}", e)))?;
        Ok(Self { params })
    }

    pub fn from_config(config: &AuthConfig) -> CoreResult<Self> {
        Self::with_params(config.hash_memory_kib, config.hash_iterations)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> CoreResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| CoreError::internal(format!("password hashing failed: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> CoreResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| CoreError::internal(format!("stored hash unreadable: {}", e)))?;
        Ok(self.argon2().verify_password(password.as_bytes(), &parsed).is_ok())
    }
}

/// Hash on the blocking pool
pub async fn hash_blocking(hasher: HasherRef, password: String) -> CoreResult<String> {
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| CoreError::internal(format!("hashing task failed: {}", e)))?
}

pub async fn verify_blocking(hasher: HasherRef, password: String, hash: String) -> CoreResult<bool> {
    tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .map_err(|e| CoreError::internal(format!("verification task failed: {}", e)))?
}

/// Issues and verifies HS256 tokens
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl_secs)
    }

    pub fn issue(&self, email: &str, role: Role) -> CoreResult<String> {
        let now = Utc::now().timestamp();
        self.issue_at(email, role, now)
    }

    pub(crate) fn issue_at(&self, email: &str, role: Role, iat: i64) -> CoreResult<String> {
        let claims = Claims {
            sub: email.to_string(),
            role,
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| CoreError::internal(format!("token signing failed: {}", e)))
    }

    /// Verify an `Authorization` header value, `Bearer <t>` or a raw token
    pub fn verify_header(&self, header: Option<&str>) -> CoreResult<Identity> {
        let raw = header.map(str::trim).unwrap_or_default();
        let token = raw
            .strip_prefix("Bearer ")
            .or_else(|| raw.strip_prefix("bearer "))
            .unwrap_or(raw)
            .trim();
        if token.is_empty() || token.eq_ignore_ascii_case("bearer") {
            return Err(CoreError::MissingToken);
        }
        self.verify(token)
    }

    pub fn verify(&self, token: &str) -> CoreResult<Identity> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| Identity::from(data.claims))
            .map_err(|e| {
                log::debug!("token rejected: {}", e);
                CoreError::Unauthorized
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_hasher() -> Argon2Hasher {
        Argon2Hasher::with_params(8, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = cheap_hasher();
        let hash = hasher.hash("Secr3tPass").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("Secr3tPass", &hash).unwrap());
        assert!(!hasher.verify("wrong", &hash).unwrap());
    }

    #[test]
    fn test_unreadable_hash() {
        assert!(cheap_hasher().verify("x", "not-a-phc-string").is_err());
    }

    #[tokio::test]
    async fn test_blocking_helpers() {
        let hasher: HasherRef = Arc::new(cheap_hasher());
        let hash = hash_blocking(hasher.clone(), "Secr3tPass".to_string()).await.unwrap();
        assert!(verify_blocking(hasher, "Secr3tPass".to_string(), hash).await.unwrap());
    }

    #[test]
    fn test_token_round_trip() {
        let tokens = TokenService::new("test-secret", 3600);
        let token = tokens.issue("sam@bank.com", Role::Employee).unwrap();

        let identity = tokens.verify_header(Some(format!("Bearer {}", token).as_str())).unwrap();
        assert_eq!(identity.email, "sam@bank.com");
        assert_eq!(identity.role, Role::Employee);

        // raw token without scheme
        assert!(tokens.verify_header(Some(token.as_str())).is_ok());
    }

    #[test]
    fn test_missing_token() {
        let tokens = TokenService::new("test-secret", 3600);
        assert!(matches!(tokens.verify_header(None), Err(CoreError::MissingToken)));
        assert!(matches!(tokens.verify_header(Some("   ")), Err(CoreError::MissingToken)));
        assert!(matches!(tokens.verify_header(Some("Bearer ")), Err(CoreError::MissingToken)));
    }

    #[test]
    fn test_bad_tokens() {
        let tokens = TokenService::new("test-secret", 3600);
        let other = TokenService::new("other-secret", 3600);
        let forged = other.issue("sam@bank.com", Role::Employee).unwrap();

        assert!(matches!(tokens.verify(&forged), Err(CoreError::Unauthorized)));
        assert!(matches!(tokens.verify("abc.def.ghi"), Err(CoreError::Unauthorized)));
    }

    #[test]
    fn test_oversized_ttl_saturates() {
        let tokens = TokenService::new("test-secret", u64::MAX);
        let token = tokens.issue("sam@bank.com", Role::Employee).unwrap();
        assert!(tokens.verify(&token).is_ok());
    }

    #[test]
    fn test_expired_token() {
        let tokens = TokenService::new("test-secret", 60);
        let issued = Utc::now().timestamp() - 3600;
        let token = tokens.issue_at("sam@bank.com", Role::Customer, issued).unwrap();
        assert!(matches!(tokens.verify(&token), Err(CoreError::Unauthorized)));
    }
}
