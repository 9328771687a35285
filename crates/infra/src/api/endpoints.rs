//! Resource endpoints of the StoreDesk backend
//!
//! Payloads are passed through as JSON values; the backend owns the schemas.

use std::fmt::Display;
use std::sync::Arc;

use reqwest::header::{HeaderValue, ACCEPT};
use serde_json::Value;
use storedesk_domain::constants::{
    CATEGORIES_PATH, DASHBOARD_LOW_STOCK_PATH, DASHBOARD_STATS_PATH, PRODUCTS_PATH,
    PURCHASES_PATH, PURCHASE_HISTORY_PATH, SALES_EXPORT_PATH, SALES_HISTORY_PATH, SALES_PATH,
    SUPPLIERS_PATH,
};
use tracing::instrument;

use super::client::ApiClient;
use super::errors::ClientError;
use super::request::RequestOptions;

type ApiResult<T> = Result<T, ClientError>;

/// Typed access to inventory, purchasing and sales endpoints
#[derive(Debug, Clone)]
pub struct StoreApi {
    client: Arc<ApiClient>,
}

impl StoreApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    #[instrument(skip(self))]
    pub async fn fetch_products(&self) -> ApiResult<Value> {
        self.client.get(PRODUCTS_PATH).await
    }

    #[instrument(skip(self))]
    pub async fn fetch_categories(&self) -> ApiResult<Value> {
        self.client.get(CATEGORIES_PATH).await
    }

    #[instrument(skip(self))]
    pub async fn fetch_suppliers(&self) -> ApiResult<Value> {
        self.client.get(SUPPLIERS_PATH).await
    }

    #[instrument(skip(self))]
    pub async fn fetch_purchases(&self) -> ApiResult<Value> {
        self.client.get(PURCHASES_PATH).await
    }

    #[instrument(skip(self))]
    pub async fn fetch_dashboard_stats(&self) -> ApiResult<Value> {
        self.client.get(DASHBOARD_STATS_PATH).await
    }

    /// Products at or below their reorder level
    #[instrument(skip(self))]
    pub async fn fetch_low_stock(&self) -> ApiResult<Value> {
        self.client.get(DASHBOARD_LOW_STOCK_PATH).await
    }

    #[instrument(skip(self, product))]
    pub async fn create_product(&self, product: &Value) -> ApiResult<Value> {
        self.client.post(PRODUCTS_PATH, product).await
    }

    #[instrument(skip(self, product), fields(id = %id))]
    pub async fn update_product(&self, id: impl Display, product: &Value) -> ApiResult<Value> {
        self.client.put(&detail_path(PRODUCTS_PATH, &id), product).await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_product(&self, id: impl Display) -> ApiResult<()> {
        self.client.delete(&detail_path(PRODUCTS_PATH, &id)).await
    }

    #[instrument(skip(self, supplier))]
    pub async fn create_supplier(&self, supplier: &Value) -> ApiResult<Value> {
        self.client.post(SUPPLIERS_PATH, supplier).await
    }

    #[instrument(skip(self, supplier), fields(id = %id))]
    pub async fn update_supplier(&self, id: impl Display, supplier: &Value) -> ApiResult<Value> {
        self.client.put(&detail_path(SUPPLIERS_PATH, &id), supplier).await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_supplier(&self, id: impl Display) -> ApiResult<()> {
        self.client.delete(&detail_path(SUPPLIERS_PATH, &id)).await
    }

    /// Record a purchase; the backend adds the received stock
    #[instrument(skip(self, purchase))]
    pub async fn create_purchase(&self, purchase: &Value) -> ApiResult<Value> {
        self.client.post(PURCHASES_PATH, purchase).await
    }

    #[instrument(skip(self, invoice))]
    pub async fn create_sale_invoice(&self, invoice: &Value) -> ApiResult<Value> {
        self.client.post(SALES_PATH, invoice).await
    }

    #[instrument(skip(self, invoice), fields(id = %id))]
    pub async fn update_sale_invoice(&self, id: impl Display, invoice: &Value) -> ApiResult<Value> {
        self.client.put(&detail_path(SALES_PATH, &id), invoice).await
    }

    #[instrument(skip(self))]
    pub async fn fetch_sales_history(&self) -> ApiResult<Value> {
        self.client.get(SALES_HISTORY_PATH).await
    }

    #[instrument(skip(self))]
    pub async fn fetch_purchase_history(&self) -> ApiResult<Value> {
        self.client.get(PURCHASE_HISTORY_PATH).await
    }

    /// Sales export as raw CSV bytes
    #[instrument(skip(self))]
    pub async fn export_sales_csv(&self) -> ApiResult<Vec<u8>> {
        let options = RequestOptions::new().header(ACCEPT, HeaderValue::from_static("text/csv"));
        self.client.get_bytes(SALES_EXPORT_PATH, &options).await
    }
}

fn detail_path(collection: &str, id: &impl Display) -> String {
    format!("{collection}{}/", urlencoding::encode(&id.to_string()))
}
