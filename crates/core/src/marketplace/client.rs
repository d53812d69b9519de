//! Marketplace seller API client (FBS posting list).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::account::ExternalAccount;
use crate::config::MarketplaceConfig;

use super::types::{Posting, PostingListResponse};
use super::{OrderListing, OrderRow};

/// Warehouse name used when neither the account nor the caller sets one.
const DEFAULT_WAREHOUSE: &str = "rFBS";

#[derive(Debug, Error)]
pub enum MarketplaceError {
    #[error("Posting list request failed: {0}")]
    Request(String),
    #[error("Posting list returned HTTP {status}: {snippet}")]
    Status { status: u16, snippet: String },
    #[error("Unparseable posting list response: {0}")]
    Parse(String),
}

/// Trait for marketplace backends; mocked in server tests.
#[async_trait]
pub trait MarketplaceClient: Send + Sync {
    /// List the shop's awaiting-shipment orders, one row per product line.
    async fn list_awaiting_orders(&self, account: &ExternalAccount) -> OrderListing;
}

/// Marketplace client speaking the seller posting-list HTTP API.
pub struct HttpMarketplaceClient {
    client: Client,
    config: MarketplaceConfig,
}

impl HttpMarketplaceClient {
    pub fn new(config: MarketplaceConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    async fn fetch_page(
        &self,
        account: &ExternalAccount,
        since: DateTime<Utc>,
        to: DateTime<Utc>,
        offset: u32,
    ) -> Result<Vec<Posting>, MarketplaceError> {
        let url = format!(
            "{}/v3/posting/fbs/list",
            self.config.base_url.trim_end_matches('/')
        );
        let payload = json!({
            "dir": "ASC",
            "filter": {
                "since": since.to_rfc3339(),
                "to": to.to_rfc3339(),
                "status": "awaiting_deliver",
            },
            "limit": self.config.page_size,
            "offset": offset,
        });

        let response = self
            .client
            .post(&url)
            .header("Client-Id", &account.client_id)
            .header("Api-Key", &account.client_secret)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MarketplaceError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketplaceError::Status {
                status: status.as_u16(),
                snippet: body.chars().take(200).collect(),
            });
        }

        let parsed: PostingListResponse = response
            .json()
            .await
            .map_err(|e| MarketplaceError::Parse(e.to_string()))?;

        Ok(parsed.result.map(|r| r.postings).unwrap_or_default())
    }
}

#[async_trait]
impl MarketplaceClient for HttpMarketplaceClient {
    async fn list_awaiting_orders(&self, account: &ExternalAccount) -> OrderListing {
        let to = Utc::now();
        let since = to - chrono::Duration::days(self.config.window_days as i64);
        let warehouse = account
            .warehouse
            .clone()
            .unwrap_or_else(|| DEFAULT_WAREHOUSE.to_string());

        let mut orders = Vec::new();
        let mut error = None;
        let mut offset = 0;

        loop {
            let postings = match self.fetch_page(account, since, to, offset).await {
                Ok(postings) => postings,
                Err(e) => {
                    warn!(shop = %account.name, offset, error = %e, "Order listing aborted");
                    error = Some(e.to_string());
                    break;
                }
            };
            let page_len = postings.len();

            for posting in postings {
                orders.extend(expand_posting(&account.name, &warehouse, posting));
            }

            // A short page means the listing is exhausted.
            if page_len < self.config.page_size as usize {
                break;
            }
            offset += self.config.page_size;
        }

        orders.sort_by(|a, b| a.last_digits.cmp(&b.last_digits));
        debug!(shop = %account.name, orders = orders.len(), "Order listing finished");

        OrderListing {
            shop: account.name.clone(),
            orders,
            error,
        }
    }
}

/// Flatten a posting into one row per product line, applying the warehouse
/// filter and skipping postings that have no tracking number yet.
fn expand_posting(shop: &str, warehouse: &str, posting: Posting) -> Vec<OrderRow> {
    let posting_warehouse = posting
        .delivery_method
        .as_ref()
        .and_then(|d| d.warehouse.clone())
        .unwrap_or_default();
    if posting_warehouse != warehouse {
        return Vec::new();
    }

    let Some(tracking_number) = posting
        .tracking_number
        .as_deref()
        .filter(|tn| !tn.trim().is_empty())
        .map(str::to_string)
    else {
        return Vec::new();
    };

    let order_date = posting
        .in_process_at
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.format("%d.%m.%Y").to_string())
        .unwrap_or_default();
    let posting_number = posting.posting_number.unwrap_or_default();
    let last_digits = last_digits(&tracking_number);

    posting
        .products
        .into_iter()
        .map(|product| OrderRow {
            shop: shop.to_string(),
            order_date: order_date.clone(),
            posting_number: posting_number.clone(),
            sku: product.offer_id.unwrap_or_default(),
            product_name: product.name.unwrap_or_default(),
            quantity: product.quantity,
            tracking_number: tracking_number.clone(),
            warehouse: posting_warehouse.clone(),
            last_digits: last_digits.clone(),
        })
        .collect()
}

fn last_digits(tracking_number: &str) -> String {
    let digits: Vec<char> = tracking_number.chars().filter(|c| c.is_ascii_digit()).collect();
    let start = digits.len().saturating_sub(4);
    digits[start..].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::types::{DeliveryMethod, Product};

    fn posting(tracking: Option<&str>, warehouse: &str, products: Vec<Product>) -> Posting {
        Posting {
            posting_number: Some("0001-1".to_string()),
            tracking_number: tracking.map(str::to_string),
            in_process_at: Some("2026-08-20T10:15:00Z".to_string()),
            delivery_method: Some(DeliveryMethod {
                warehouse: Some(warehouse.to_string()),
            }),
            products,
        }
    }

    fn product(name: &str, qty: u32) -> Product {
        Product {
            name: Some(name.to_string()),
            offer_id: Some("SKU-1".to_string()),
            quantity: qty,
        }
    }

    #[test]
    fn test_expand_posting_one_row_per_product() {
        let rows = expand_posting(
            "shop",
            "rFBS",
            posting(
                Some("10081234567890"),
                "rFBS",
                vec![product("Widget", 2), product("Gadget", 1)],
            ),
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].product_name, "Widget");
        assert_eq!(rows[0].quantity, 2);
        assert_eq!(rows[0].order_date, "20.08.2026");
        assert_eq!(rows[0].last_digits, "7890");
        assert_eq!(rows[1].product_name, "Gadget");
    }

    #[test]
    fn test_expand_posting_skips_other_warehouses() {
        let rows = expand_posting(
            "shop",
            "rFBS",
            posting(Some("123"), "FBO", vec![product("Widget", 1)]),
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn test_expand_posting_skips_missing_tracking_number() {
        let rows = expand_posting(
            "shop",
            "rFBS",
            posting(None, "rFBS", vec![product("Widget", 1)]),
        );
        assert!(rows.is_empty());

        let rows = expand_posting(
            "shop",
            "rFBS",
            posting(Some("  "), "rFBS", vec![product("Widget", 1)]),
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn test_last_digits() {
        assert_eq!(last_digits("10081234567890"), "7890");
        assert_eq!(last_digits("AB-12/34"), "1234");
        assert_eq!(last_digits("42"), "42");
        assert_eq!(last_digits("no-digits"), "");
    }
}
