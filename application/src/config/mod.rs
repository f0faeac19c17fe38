//! Application-level configuration
//!
//! Runtime parameters the dispatch use case needs. Infrastructure maps the
//! file configuration onto these.

use skybit_domain::policy::PolicyRules;
use std::time::Duration;

/// Default upper bound for a single tool call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Parameters controlling how calls are dispatched
#[derive(Debug, Clone)]
pub struct DispatchParams {
    /// Upper bound for every call; callers can only shorten it
    pub call_timeout: Duration,
    /// Rules consulted before high-risk tools run
    pub policy: PolicyRules,
}

impl Default for DispatchParams {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
            policy: PolicyRules::allow_all(),
        }
    }
}

impl DispatchParams {
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_policy(mut self, policy: PolicyRules) -> Self {
        self.policy = policy;
        self
    }

    /// Effective timeout for a call, honoring a tighter caller bound.
    pub fn effective_timeout(&self, caller_timeout: Option<Duration>) -> Duration {
        match caller_timeout {
            Some(caller) => caller.min(self.call_timeout),
            None => self.call_timeout,
        }
    }
}
