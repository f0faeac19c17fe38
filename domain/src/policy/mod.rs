//! Policy gate for side-effecting tools.

pub mod rules;

pub use rules::{OrderIntent, PolicyDecision, PolicyRequest, PolicyRules};
