/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/6/25
******************************************************************************/

pub const DEFAULT_API_BASE_URL: &str = "https://api.mercadolibre.com";
pub const DEFAULT_SELLER_ID: &str = "381183837";
pub const DEFAULT_ARCHIVE_TABLE: &str = "raw_orders";

pub(crate) const TOKEN_PATH: &str = "/oauth/token";
pub(crate) const ORDERS_SEARCH_PATH: &str = "/orders/search";
pub(crate) const REST_PATH: &str = "/rest/v1";

/// Orders requested per search page.
pub const PAGE_SIZE: u32 = 50;
/// Pause between two consecutive search pages.
pub const PAGE_DELAY_MS: u64 = 200;

pub const RETRY_MAX_ATTEMPTS: u32 = 3;
pub const RETRY_BASE_DELAY_MS: u64 = 500;
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

pub(crate) const AUTH_TIMEOUT_SECS: u64 = 60;
pub(crate) const STORAGE_TIMEOUT_SECS: u64 = 60;
pub const SEARCH_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;
pub const DEFAULT_LOOKBACK_MONTHS: u32 = 3;
/// Upper bounds accepted for the lookback settings.
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;
pub const MAX_LOOKBACK_MONTHS: u32 = 1_200;
