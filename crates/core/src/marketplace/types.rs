//! Marketplace order listing types.

use serde::{Deserialize, Serialize};

/// One product line of an awaiting-shipment posting, flattened for display.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderRow {
    pub shop: String,
    /// Posting creation date, dd.mm.yyyy.
    pub order_date: String,
    pub posting_number: String,
    pub sku: String,
    pub product_name: String,
    pub quantity: u32,
    pub tracking_number: String,
    pub warehouse: String,
    /// Last four digits of the tracking number, the sort key pickers use.
    pub last_digits: String,
}

/// Result of listing a shop's awaiting-shipment orders.
///
/// A mid-pagination failure keeps the rows collected so far and reports the
/// error alongside them rather than discarding the partial listing.
#[derive(Debug, Serialize)]
pub struct OrderListing {
    pub shop: String,
    pub orders: Vec<OrderRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// Posting-list API response bodies.

#[derive(Debug, Deserialize)]
pub(crate) struct PostingListResponse {
    pub result: Option<PostingListResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostingListResult {
    #[serde(default)]
    pub postings: Vec<Posting>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Posting {
    pub posting_number: Option<String>,
    pub tracking_number: Option<String>,
    pub in_process_at: Option<String>,
    pub delivery_method: Option<DeliveryMethod>,
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeliveryMethod {
    pub warehouse: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Product {
    pub name: Option<String>,
    pub offer_id: Option<String>,
    #[serde(default)]
    pub quantity: u32,
}
