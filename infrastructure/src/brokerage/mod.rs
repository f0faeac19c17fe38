//! Brokerage integrations
//!
//! [`connect_brokerage`] turns config plus environment into the
//! [`BrokeragePort`] the broker tools use. Missing credentials yield an
//! [`UnconfiguredBrokerage`] so the gateway still starts and the broker tools
//! report `UNAVAILABLE`.

pub mod client;
pub mod config;

pub use client::SnapTradeClient;
pub use config::{SnapTradeConfig, SnapTradeConfigError, SnapTradeEnv, default_account_id};

use skybit_application::ports::brokerage::{BrokeragePort, UnconfiguredBrokerage};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::FileBrokerageConfig;

pub fn connect_brokerage(
    settings: &FileBrokerageConfig,
    env: &SnapTradeEnv,
) -> Result<Arc<dyn BrokeragePort>, SnapTradeConfigError> {
    match SnapTradeConfig::resolve(settings, env)? {
        Some(config) => {
            let client = SnapTradeClient::new(&config)?;
            info!(
                environment = %config.environment,
                base_url = client.base_url(),
                "SnapTrade brokerage configured"
            );
            Ok(Arc::new(client))
        }
        None => {
            warn!("SNAPTRADE_CLIENT_ID/SNAPTRADE_CLIENT_SECRET not set; broker tools unavailable");
            Ok(Arc::new(UnconfiguredBrokerage::new(
                "missing SNAPTRADE_CLIENT_ID/SNAPTRADE_CLIENT_SECRET",
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skybit_application::ports::brokerage::BrokerageError;
    use skybit_application::ports::tool_handler::CallContext;

    #[tokio::test]
    async fn test_missing_credentials_yield_unconfigured_port() {
        let port =
            connect_brokerage(&FileBrokerageConfig::default(), &SnapTradeEnv::default()).unwrap();
        let err = port.list_accounts(&CallContext::background()).await.unwrap_err();
        assert!(matches!(err, BrokerageError::NotConfigured(_)));
    }

    #[test]
    fn test_credentials_yield_client() {
        let env = SnapTradeEnv {
            client_id: Some("id".into()),
            client_secret: Some("secret".into()),
            ..Default::default()
        };
        assert!(connect_brokerage(&FileBrokerageConfig::default(), &env).is_ok());
    }
}
