//! Reference data: accepted currencies and payment providers
//!
//! Loaded once before the server starts and shared read-only afterwards.

use async_trait::async_trait;
use paysec_config::{LoadFailurePolicy, ReferenceConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{CoreError, CoreResult};

/// Currency code to display name, plus provider names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub currencies: BTreeMap<String, String>,
    pub providers: Vec<String>,
}

impl ReferenceData {
    pub fn new(currencies: BTreeMap<String, String>, providers: Vec<String>) -> Self {
        Self {
            currencies,
            providers,
        }
    }

    /// Compiled-in set used when no file is configured or the file is unusable
    pub fn builtin() -> Self {
        let currencies = [
            ("EUR", "Euro"),
            ("GBP", "British Pound"),
            ("JPY", "Japanese Yen"),
            ("USD", "US Dollar"),
            ("ZAR", "South African Rand"),
        ]
        .into_iter()
        .map(|(code, name)| (code.to_string(), name.to_string()))
        .collect();

        let providers = ["SWIFT", "PayPal", "Bank Transfer"]
            .into_iter()
            .map(String::from)
            .collect();

        Self::new(currencies, providers)
    }

    pub fn has_currency(&self, code: &str) -> bool {
        self.currencies.contains_key(code)
    }

    pub fn has_provider(&self, name: &str) -> bool {
        self.providers.iter().any(|p| p == name)
    }
}

/// Where reference data comes from
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    async fn load(&self) -> CoreResult<ReferenceData>;

    /// Short description for startup logs
    fn describe(&self) -> String;
}

/// Fixed in-memory data
#[derive(Debug, Clone)]
pub struct StaticReferenceSource {
    data: ReferenceData,
}

impl StaticReferenceSource {
    pub fn new(data: ReferenceData) -> Self {
        Self { data }
    }
}

#[async_trait]
impl ReferenceSource for StaticReferenceSource {
    async fn load(&self) -> CoreResult<ReferenceData> {
        Ok(self.data.clone())
    }

    fn describe(&self) -> String {
        "builtin".to_string()
    }
}

/// Currencies from a YAML map file, providers from configuration
#[derive(Debug, Clone)]
pub struct FileReferenceSource {
    currencies_file: PathBuf,
    providers: Vec<String>,
}

impl FileReferenceSource {
    pub fn new(currencies_file: PathBuf, providers: Vec<String>) -> Self {
        Self {
            currencies_file,
            providers,
        }
    }
}

#[async_trait]
impl ReferenceSource for FileReferenceSource {
    async fn load(&self) -> CoreResult<ReferenceData> {
        let content = tokio::fs::read_to_string(&self.currencies_file)
            .await
            .map_err(|e| CoreError::internal(format!(
                "cannot read {}: {}",
                self.currencies_file.display(),
                e
            )))?;

        let currencies: BTreeMap<String, String> = serde_yaml::from_str(&content)
            .map_err(|e| CoreError::internal(format!(
                "invalid currencies file {}: {}",
                self.currencies_file.display(),
                e
            )))?;

        if currencies.is_empty() {
            return Err(CoreError::internal(format!(
                "currencies file {} is empty",
                self.currencies_file.display()
            )));
        }

        Ok(ReferenceData::new(currencies, self.providers.clone()))
    }

    fn describe(&self) -> String {
        self.currencies_file.display().to_string()
    }
}

/// Loads reference data according to the configured failure policy
pub struct ReferenceLoader {
    source: Box<dyn ReferenceSource>,
    policy: LoadFailurePolicy,
    fallback: ReferenceData,
}

impl ReferenceLoader {
    pub fn new(source: Box<dyn ReferenceSource>, policy: LoadFailurePolicy) -> Self {
        Self {
            source,
            policy,
            fallback: ReferenceData::builtin(),
        }
    }

    /// Data served under `LoadFailurePolicy::Builtin` when the source fails
    pub fn with_fallback(mut self, fallback: ReferenceData) -> Self {
        self.fallback = fallback;
        self
    }

    /// Builtin currencies with the configured providers. A failed currencies
    /// file never widens the provider list.
    pub fn from_config(config: &ReferenceConfig) -> Self {
        let mut configured = ReferenceData::builtin();
        configured.providers = config.providers.clone();

        let source: Box<dyn ReferenceSource> = match &config.currencies_file {
            Some(path) => Box::new(FileReferenceSource::new(path.clone(), config.providers.clone())),
            None => Box::new(StaticReferenceSource::new(configured.clone())),
        };
        Self::new(source, config.on_load_failure).with_fallback(configured)
    }

    pub async fn load(&self) -> CoreResult<ReferenceData> {
        match self.source.load().await {
            Ok(data) => {
                log::info!(
                    "Loaded {} currencies and {} providers from {}",
                    data.currencies.len(),
                    data.providers.len(),
                    self.source.describe()
                );
                Ok(data)
            }
            Err(e) => match self.policy {
                LoadFailurePolicy::Fail => Err(e),
                LoadFailurePolicy::Builtin => {
                    log::warn!(
                        "Reference data unavailable ({}), using builtin currencies",
                        e.to_details()
                    );
                    Ok(self.fallback.clone())
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct BrokenSource;

    #[async_trait]
    impl ReferenceSource for BrokenSource {
        async fn load(&self) -> CoreResult<ReferenceData> {
            Err(CoreError::internal("unreachable"))
        }

        fn describe(&self) -> String {
            "broken".to_string()
        }
    }

    #[test]
    fn test_builtin_membership() {
        let data = ReferenceData::builtin();
        assert!(data.has_currency("ZAR"));
        assert!(!data.has_currency("zar"));
        assert!(!data.has_currency("BTC"));
        assert!(data.has_provider("Bank Transfer"));
        assert!(!data.has_provider("Western Union"));
    }

    #[tokio::test]
    async fn test_failure_policy_builtin() {
        let loader = ReferenceLoader::new(Box::new(BrokenSource), LoadFailurePolicy::Builtin);
        assert_eq!(loader.load().await.unwrap(), ReferenceData::builtin());
    }

    #[tokio::test]
    async fn test_failure_policy_fail() {
        let loader = ReferenceLoader::new(Box::new(BrokenSource), LoadFailurePolicy::Fail);
        assert!(loader.load().await.is_err());
    }

    #[tokio::test]
    async fn test_file_source() {
        let path = std::env::temp_dir().join(format!("paysec-currencies-{}.yaml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "CHF: Swiss Franc\nNZD: New Zealand Dollar").unwrap();

        let config = ReferenceConfig {
            currencies_file: Some(path.clone()),
            providers: vec!["SWIFT".to_string()],
            on_load_failure: LoadFailurePolicy::Fail,
        };
        let data = ReferenceLoader::from_config(&config).load().await.unwrap();
        std::fs::remove_file(&path).ok();

        assert!(data.has_currency("CHF"));
        assert!(!data.has_currency("USD"));
        assert_eq!(data.providers, vec!["SWIFT"]);
    }

    #[tokio::test]
    async fn test_unreadable_file_keeps_configured_providers() {
        let config = ReferenceConfig {
            currencies_file: Some(PathBuf::from("/nonexistent/paysec/currencies.yaml")),
            providers: vec!["PayPal".to_string()],
            on_load_failure: LoadFailurePolicy::Builtin,
        };
        let data = ReferenceLoader::from_config(&config).load().await.unwrap();

        assert!(data.has_currency("EUR"));
        assert_eq!(data.providers, vec!["PayPal"]);
        assert!(!data.has_provider("SWIFT"));
    }

    #[tokio::test]
    async fn test_configured_providers_without_file() {
        let config = ReferenceConfig {
            providers: vec!["PayPal".to_string()],
            ..ReferenceConfig::default()
        };
        let data = ReferenceLoader::from_config(&config).load().await.unwrap();
        assert!(data.has_currency("USD"));
        assert!(!data.has_provider("SWIFT"));
    }
}
