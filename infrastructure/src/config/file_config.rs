//! Raw TOML configuration data types
//!
//! These structs mirror the config file. Every section has defaults, so an
//! empty or missing file yields a working gateway.

use serde::{Deserialize, Serialize};
use skybit_application::config::DispatchParams;
use skybit_domain::brokerage::BrokerageEnvironment;
use skybit_domain::policy::PolicyRules;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::brokerage::config::{DEFAULT_REQUEST_TIMEOUT_SECS, PRODUCTION_BASE_URL, SANDBOX_BASE_URL};

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("server.bind '{0}' is not a socket address")]
    InvalidBind(String),

    #[error("server.call_timeout_secs cannot be 0")]
    ZeroCallTimeout,

    #[error("brokerage.request_timeout_secs cannot be 0")]
    ZeroRequestTimeout,

    #[error("brokerage.environment: {0}")]
    UnknownEnvironment(String),

    #[error("policy.{0} must be positive")]
    NonPositiveLimit(&'static str),
}

/// `[server]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// Listen address for `skybit serve`
    pub bind: String,
    /// Upper bound for a single tool call
    pub call_timeout_secs: u64,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:7878".to_string(),
            call_timeout_secs: 10,
        }
    }
}

impl FileServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        self.bind
            .parse()
            .map_err(|_| ConfigValidationError::InvalidBind(self.bind.clone()))
    }
}

/// `[brokerage]` section. Credentials never live here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBrokerageConfig {
    /// "sandbox" or "production" (`SNAPTRADE_ENV` overrides)
    pub environment: String,
    pub request_timeout_secs: u64,
    pub sandbox_url: String,
    pub production_url: String,
    /// Default account for broker tools (`SNAPTRADE_ACCOUNT_ID` overrides)
    pub account_id: Option<String>,
}

impl Default for FileBrokerageConfig {
    fn default() -> Self {
        Self {
            environment: BrokerageEnvironment::default().to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            sandbox_url: SANDBOX_BASE_URL.to_string(),
            production_url: PRODUCTION_BASE_URL.to_string(),
            account_id: None,
        }
    }
}

/// `[audit]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAuditConfig {
    /// JSONL file; `~/` is expanded. Defaults to `~/.skybit/audit.jsonl`.
    pub path: Option<String>,
}

impl FileAuditConfig {
    pub fn resolved_path(&self) -> Option<PathBuf> {
        match self.path.as_deref().filter(|p| !p.is_empty()) {
            Some(path) => Some(expand_home(path)),
            None => dirs::home_dir().map(|home| home.join(".skybit").join("audit.jsonl")),
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: FileServerConfig,
    pub brokerage: FileBrokerageConfig,
    pub audit: FileAuditConfig,
    /// Rules for `policy.check` and the high-risk call gate
    pub policy: PolicyRules,
}

impl FileConfig {
    /// Reject settings the gateway cannot run with.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.server.bind_addr()?;
        if self.server.call_timeout_secs == 0 {
            return Err(ConfigValidationError::ZeroCallTimeout);
        }
        if self.brokerage.request_timeout_secs == 0 {
            return Err(ConfigValidationError::ZeroRequestTimeout);
        }
        self.brokerage
            .environment
            .parse::<BrokerageEnvironment>()
            .map_err(ConfigValidationError::UnknownEnvironment)?;

        if self.policy.max_order_notional.is_some_and(|v| v <= 0.0) {
            return Err(ConfigValidationError::NonPositiveLimit("max_order_notional"));
        }
        if self.policy.max_order_quantity.is_some_and(|v| v <= 0.0) {
            return Err(ConfigValidationError::NonPositiveLimit("max_order_quantity"));
        }
        Ok(())
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.server.call_timeout_secs)
    }

    /// Runtime parameters for the dispatch use case
    pub fn dispatch_params(&self) -> DispatchParams {
        DispatchParams::default()
            .with_call_timeout(self.call_timeout())
            .with_policy(self.policy.clone())
    }
}
