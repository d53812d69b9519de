//! Marketplace seller API integration: listing orders awaiting shipment.

mod client;
mod types;

pub use client::{HttpMarketplaceClient, MarketplaceClient, MarketplaceError};
pub use types::{OrderListing, OrderRow};
