//! Synthetic market quotes

use serde::{Deserialize, Serialize};

/// Top-of-book quote for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub bid: f64,
    pub ask: f64,
    pub mid: f64,
    /// RFC 3339 UTC timestamp
    pub ts: String,
}

impl Quote {
    /// Fixed placeholder quote used until a market-data backend is wired in.
    pub fn stub(ts: impl Into<String>) -> Self {
        Self {
            bid: 225.05,
            ask: 225.15,
            mid: 225.10,
            ts: ts.into(),
        }
    }
}
