//! Tool handlers and the registry that dispatches to them
//!
//! Handlers are grouped by backend:
//! - `market`, `trade`: local stubs producing deterministic synthetic data
//! - `broker`: SnapTrade-backed account, position and order operations
//! - `policy`, `audit`: side-effect hooks with their own decision and
//!   persistence contracts
//!
//! [`default_registry`] is the single place where every handler is bound to
//! its name.

pub mod audit;
pub mod broker;
pub mod market;
pub mod policy;
pub mod trade;

mod registry;

pub use audit::AuditLogTool;
pub use broker::BrokerTools;
pub use market::DataSnapshotTool;
pub use policy::PolicyCheckTool;
pub use registry::{RegistryError, RegistryStats, ToolRegistry, ToolRegistryBuilder};
pub use trade::{StubCancelAllTool, StubCancelTool, StubPlaceOrderTool, TradePreviewTool};

use chrono::SecondsFormat;
use skybit_application::ports::audit_sink::AuditSink;
use skybit_application::ports::brokerage::BrokeragePort;
use skybit_domain::policy::PolicyRules;
use std::sync::Arc;

/// Current UTC time as RFC 3339 with a `Z` suffix
pub(crate) fn rfc3339_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Backends the handlers are wired to
pub struct GatewayDependencies {
    pub brokerage: Arc<dyn BrokeragePort>,
    /// Account used when a broker call names none
    pub default_account_id: Option<String>,
    pub audit: Arc<dyn AuditSink>,
    pub policy: PolicyRules,
}

/// Register every gateway tool.
pub fn default_registry(deps: GatewayDependencies) -> Result<ToolRegistry, RegistryError> {
    let broker =
        BrokerTools::new(deps.brokerage).with_default_account(deps.default_account_id);

    ToolRegistryBuilder::new()
        .register(DataSnapshotTool::new())
        .register(TradePreviewTool::new())
        .register(StubPlaceOrderTool)
        .register(StubCancelTool)
        .register(StubCancelAllTool)
        .register(PolicyCheckTool::new(deps.policy))
        .register(AuditLogTool::new(deps.audit))
        .register(broker.accounts())
        .register(broker.positions())
        .register(broker.place_order())
        .register(broker.cancel())
        .register(broker.cancel_all())
        .build()
}
