//! SnapTrade connection settings
//!
//! Credentials are only ever read from the environment (`SNAPTRADE_*`);
//! endpoint and timeout settings come from the `[brokerage]` config section.
//! `SNAPTRADE_ENV` and `SNAPTRADE_ACCOUNT_ID` override their file
//! counterparts.

use figment::Figment;
use figment::providers::Env;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use skybit_domain::brokerage::BrokerageEnvironment;
use std::time::Duration;
use thiserror::Error;

use crate::config::FileBrokerageConfig;

pub const SANDBOX_BASE_URL: &str = "https://api.sandbox.snaptrade.com/api/v1";
pub const PRODUCTION_BASE_URL: &str = "https://api.snaptrade.com/api/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Environment variable prefix for SnapTrade settings
pub const ENV_PREFIX: &str = "SNAPTRADE_";

#[derive(Error, Debug)]
pub enum SnapTradeConfigError {
    #[error("failed to read SnapTrade environment: {0}")]
    Env(#[from] Box<figment::Error>),

    #[error("{0}")]
    Environment(String),

    #[error("invalid SnapTrade base URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// `SNAPTRADE_*` environment variables
///
/// The `Env` provider parses values, so `SNAPTRADE_ACCOUNT_ID=12345` arrives
/// as a number; every field accepts any scalar and keeps its text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapTradeEnv {
    #[serde(deserialize_with = "scalar_as_string")]
    pub client_id: Option<String>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub client_secret: Option<String>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub env: Option<String>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub account_id: Option<String>,
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a scalar, found {}",
            other
        ))),
    }
}

impl SnapTradeEnv {
    /// Read from the process environment
    pub fn from_process_env() -> Result<Self, SnapTradeConfigError> {
        Self::extract(Figment::from(Env::prefixed(ENV_PREFIX)))
    }

    pub fn extract(figment: Figment) -> Result<Self, SnapTradeConfigError> {
        figment
            .extract()
            .map_err(|e| SnapTradeConfigError::Env(Box::new(e)))
    }

    fn non_empty(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Everything needed to open an authenticated SnapTrade client
#[derive(Debug, Clone, PartialEq)]
pub struct SnapTradeConfig {
    pub client_id: String,
    pub client_secret: String,
    pub environment: BrokerageEnvironment,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl SnapTradeConfig {
    /// Combine file settings with the environment.
    ///
    /// Returns `Ok(None)` when either credential is missing; an unknown
    /// environment name is an error.
    pub fn resolve(
        settings: &FileBrokerageConfig,
        env: &SnapTradeEnv,
    ) -> Result<Option<Self>, SnapTradeConfigError> {
        let environment_name =
            SnapTradeEnv::non_empty(&env.env).unwrap_or(settings.environment.as_str());
        let environment: BrokerageEnvironment = environment_name
            .parse()
            .map_err(SnapTradeConfigError::Environment)?;

        let (Some(client_id), Some(client_secret)) = (
            SnapTradeEnv::non_empty(&env.client_id),
            SnapTradeEnv::non_empty(&env.client_secret),
        ) else {
            return Ok(None);
        };

        let base_url = match environment {
            BrokerageEnvironment::Sandbox => settings.sandbox_url.clone(),
            BrokerageEnvironment::Production => settings.production_url.clone(),
        };

        Ok(Some(Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            environment,
            base_url,
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
        }))
    }
}

/// Account override: `SNAPTRADE_ACCOUNT_ID` wins over `brokerage.account_id`.
pub fn default_account_id(settings: &FileBrokerageConfig, env: &SnapTradeEnv) -> Option<String> {
    SnapTradeEnv::non_empty(&env.account_id)
        .or_else(|| settings.account_id.as_deref().filter(|s| !s.is_empty()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::Serialized;

    fn env(client_id: &str, client_secret: &str) -> SnapTradeEnv {
        SnapTradeEnv {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_credentials_resolve_to_none() {
        let settings = FileBrokerageConfig::default();
        assert!(SnapTradeConfig::resolve(&settings, &SnapTradeEnv::default()).unwrap().is_none());
        assert!(SnapTradeConfig::resolve(&settings, &env("id", " ")).unwrap().is_none());
    }

    #[test]
    fn test_sandbox_is_default() {
        let config = SnapTradeConfig::resolve(&FileBrokerageConfig::default(), &env("id", "secret"))
            .unwrap()
            .unwrap();
        assert_eq!(config.environment, BrokerageEnvironment::Sandbox);
        assert_eq!(config.base_url, SANDBOX_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_env_selects_production() {
        let mut snap = env("id", "secret");
        snap.env = Some("production".into());
        let config = SnapTradeConfig::resolve(&FileBrokerageConfig::default(), &snap)
            .unwrap()
            .unwrap();
        assert_eq!(config.base_url, PRODUCTION_BASE_URL);
    }

    #[test]
    fn test_unknown_environment_is_rejected() {
        let mut snap = env("id", "secret");
        snap.env = Some("staging".into());
        assert!(matches!(
            SnapTradeConfig::resolve(&FileBrokerageConfig::default(), &snap),
            Err(SnapTradeConfigError::Environment(_))
        ));
    }

    #[test]
    fn test_account_override_precedence() {
        let settings = FileBrokerageConfig {
            account_id: Some("from-file".into()),
            ..Default::default()
        };
        assert_eq!(
            default_account_id(&settings, &SnapTradeEnv::default()),
            Some("from-file".into())
        );

        let snap = SnapTradeEnv {
            account_id: Some("from-env".into()),
            ..Default::default()
        };
        assert_eq!(default_account_id(&settings, &snap), Some("from-env".into()));
        assert_eq!(
            default_account_id(&FileBrokerageConfig::default(), &SnapTradeEnv::default()),
            None
        );
    }

    #[test]
    fn test_extract_from_figment() {
        let snap =
            SnapTradeEnv::extract(Figment::from(Serialized::defaults(env("abc", "xyz")))).unwrap();
        assert_eq!(snap.client_id.as_deref(), Some("abc"));
        assert_eq!(snap.env, None);
    }

    #[test]
    fn test_numeric_env_values_are_kept_as_text() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SNAPTRADE_CLIENT_ID", "12345");
            jail.set_env("SNAPTRADE_CLIENT_SECRET", "s3cret");
            jail.set_env("SNAPTRADE_ACCOUNT_ID", "true");

            let snap = SnapTradeEnv::from_process_env().unwrap();
            assert_eq!(snap.client_id.as_deref(), Some("12345"));
            assert_eq!(snap.client_secret.as_deref(), Some("s3cret"));
            assert_eq!(snap.account_id.as_deref(), Some("true"));
            assert_eq!(snap.env, None);

            let config = SnapTradeConfig::resolve(&FileBrokerageConfig::default(), &snap)
                .unwrap()
                .unwrap();
            assert_eq!(config.client_id, "12345");
            Ok(())
        });
    }
}
