use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::application::models::order_page::OrderPage;
use crate::application::models::window::TimeWindow;
use crate::config::Config;
use crate::constants::{ORDERS_SEARCH_PATH, PAGE_SIZE};
use crate::error::AppError;
use crate::session::interface::MeliSession;
use crate::transport::http_client::HttpClient;
use crate::transport::retry::{retry_with_backoff, RetryPolicy, Sleeper};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderFetcher: Send + Sync {
    /// Fetches the page of orders created inside `window` starting at `offset`.
    async fn fetch_page(
        &self,
        session: &MeliSession,
        window: &TimeWindow,
        offset: u32,
    ) -> Result<OrderPage, AppError>;
}

pub struct MeliOrderClient<'a> {
    cfg: &'a Config,
    http: HttpClient,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl<'a> MeliOrderClient<'a> {
    pub fn new(cfg: &'a Config, sleeper: Arc<dyn Sleeper>) -> Result<Self, AppError> {
        let http = HttpClient::new(
            &cfg.rest_api.base_url,
            Duration::from_secs(cfg.rest_api.timeout),
        )?;
        Ok(Self {
            cfg,
            http,
            policy: RetryPolicy::default(),
            sleeper,
        })
    }

    fn search_query(&self, window: &TimeWindow, offset: u32) -> Vec<(&'static str, String)> {
        vec![
            ("seller", self.cfg.seller_id.clone()),
            ("order.date_created.from", window.from_param()),
            ("order.date_created.to", window.to_param()),
            ("limit", PAGE_SIZE.to_string()),
            ("offset", offset.to_string()),
        ]
    }
}

#[async_trait]
impl OrderFetcher for MeliOrderClient<'_> {
    async fn fetch_page(
        &self,
        session: &MeliSession,
        window: &TimeWindow,
        offset: u32,
    ) -> Result<OrderPage, AppError> {
        let query = self.search_query(window, offset);
        debug!("🔗 Fetching orders page {} offset {}", window, offset);

        let raw: Value = retry_with_backoff(&self.policy, self.sleeper.as_ref(), |_| {
            self.http
                .get_json::<Value>(ORDERS_SEARCH_PATH, &query, session.bearer())
        })
        .await?;

        let page = OrderPage::new(raw);
        if !page.has_results_field() {
            warn!(
                "Orders page at offset {} has no results array; treating it as the end of {}",
                offset, window
            );
        }
        Ok(page)
    }
}
