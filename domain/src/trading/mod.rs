//! Local trading logic: synthetic quotes and order previews.

pub mod preview;
pub mod quote;

pub use preview::{COMMISSION, FEE_SCHEDULE, Fee, PreviewImpact, TradePreview, preview_orders};
pub use quote::Quote;
