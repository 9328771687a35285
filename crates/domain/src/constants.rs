//! Application constants
//!
//! Backend endpoint paths and client defaults shared across the client
//! crates.

// Auth endpoints (sent without the bearer interceptor)
pub const TOKEN_PATH: &str = "/token/";
pub const TOKEN_REFRESH_PATH: &str = "/token/refresh/";
pub const REGISTER_PATH: &str = "/auth/register/";

// Resource endpoints
pub const PRODUCTS_PATH: &str = "/products/";
pub const CATEGORIES_PATH: &str = "/categories/";
pub const SUPPLIERS_PATH: &str = "/suppliers/";
pub const PURCHASES_PATH: &str = "/purchases/";
pub const SALES_PATH: &str = "/sales/";
pub const DASHBOARD_STATS_PATH: &str = "/dashboard/stats/";
pub const DASHBOARD_LOW_STOCK_PATH: &str = "/dashboard/low-stock/";
pub const SALES_HISTORY_PATH: &str = "/history/sales/";
pub const PURCHASE_HISTORY_PATH: &str = "/history/purchases/";
pub const SALES_EXPORT_PATH: &str = "/export/sales/";

// Client defaults
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_KEYCHAIN_SERVICE: &str = "StoreDesk.api";
pub const DEFAULT_CREDENTIAL_FILE: &str = ".storedesk/credentials.json";
