//! Brokerage domain: accounts, positions, and orders exchanged with an
//! external broker.

pub mod entities;

pub use entities::{Account, BrokerageEnvironment, OrderRequest, PlaceOrderResponse, Position};
