// src/utils/orders.rs
//
// Order archiving pipeline: authenticate, walk the windows, persist every page

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::{
    application::models::window::TimeWindow,
    application::services::order_client::{MeliOrderClient, OrderFetcher},
    application::services::windowing::WindowStrategy,
    config::Config,
    constants::{PAGE_DELAY_MS, PAGE_SIZE},
    error::AppError,
    session::auth::MeliAuth,
    session::interface::{Authenticator, MeliSession},
    storage::sink::{RawSink, RestSink},
    transport::retry::{Sleeper, TokioSleeper},
};

/// Pages archived for one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowReport {
    pub window: TimeWindow,
    pub pages: usize,
}

impl WindowReport {
    pub fn progress_line(&self) -> Value {
        json!({
            "window_from": self.window.from_param(),
            "window_to": self.window.to_param(),
            "pages": self.pages,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub strategy: &'static str,
    pub windows: Vec<WindowReport>,
    pub pages_inserted: usize,
}

impl RunSummary {
    pub fn summary_line(&self) -> Value {
        json!({ "orders_pages_inserted": self.pages_inserted })
    }
}

/// Pages through a single window until the API returns an empty page
///
/// Every non-empty page is inserted before the offset advances, so a failure
/// part-way leaves the already archived pages in place.
///
/// # Arguments
///
/// * `fetcher` - Source of order pages
/// * `sink` - Destination of the raw pages
/// * `sleeper` - Used for the pause between pages
/// * `session` - Bearer session for the orders API
/// * `window` - Date range to page through
///
/// # Returns
///
/// * `Result<usize, AppError>` - Number of pages inserted, or the first error
#[instrument(skip(fetcher, sink, sleeper, session))]
pub async fn pull_window(
    fetcher: &dyn OrderFetcher,
    sink: &dyn RawSink,
    sleeper: &dyn Sleeper,
    session: &MeliSession,
    window: &TimeWindow,
) -> Result<usize, AppError> {
    let mut pages = 0;
    let mut offset: u32 = 0;

    loop {
        let page = fetcher.fetch_page(session, window, offset).await?;
        if page.is_empty() {
            debug!("Empty page at offset {}, window exhausted", offset);
            break;
        }

        sink.insert_page(&page).await?;
        pages += 1;
        offset += PAGE_SIZE;
        sleeper.sleep(Duration::from_millis(PAGE_DELAY_MS)).await;
    }

    Ok(pages)
}

/// Runs [`pull_window`] over each window in order, reporting after each one
///
/// # Arguments
///
/// * `windows` - Windows to process, strictly in the given order
/// * `on_window` - Called with the report of every completed window
///
/// # Returns
///
/// * `Result<Vec<WindowReport>, AppError>` - One report per window; the first
///   failing window aborts the remaining ones
pub async fn pull_windows<F>(
    fetcher: &dyn OrderFetcher,
    sink: &dyn RawSink,
    sleeper: &dyn Sleeper,
    session: &MeliSession,
    windows: &[TimeWindow],
    mut on_window: F,
) -> Result<Vec<WindowReport>, AppError>
where
    F: FnMut(&WindowReport),
{
    let mut reports = Vec::with_capacity(windows.len());
    for window in windows {
        let pages = pull_window(fetcher, sink, sleeper, session, window).await?;
        info!("Window {} archived {} pages", window, pages);
        let report = WindowReport {
            window: *window,
            pages,
        };
        on_window(&report);
        reports.push(report);
    }
    Ok(reports)
}

/// Full run with every collaborator injected
///
/// `on_window` only fires for strategies that report progress.
pub async fn run_with<F>(
    auth: &dyn Authenticator,
    fetcher: &dyn OrderFetcher,
    sink: &dyn RawSink,
    sleeper: &dyn Sleeper,
    strategy: &dyn WindowStrategy,
    now: DateTime<Utc>,
    mut on_window: F,
) -> Result<RunSummary, AppError>
where
    F: FnMut(&WindowReport),
{
    let session = auth.login().await?;
    info!("Successfully authenticated with the orders API");

    let windows = strategy.windows(now)?;
    info!(
        "Archiving {} {} window(s) ending at {}",
        windows.len(),
        strategy.name(),
        now
    );

    let reports = pull_windows(fetcher, sink, sleeper, &session, &windows, |report| {
        if strategy.reports_progress() {
            on_window(report);
        }
    })
    .await?;

    let pages_inserted = reports.iter().map(|r| r.pages).sum();
    info!("Inserted {} pages", pages_inserted);

    Ok(RunSummary {
        strategy: strategy.name(),
        windows: reports,
        pages_inserted,
    })
}

/// Fetch orders from the API and archive every raw page
///
/// This function handles the entire process of:
/// 1. Refreshing the access token
/// 2. Computing the windows for the configured strategy from the current time
/// 3. Paging through each window and inserting every page
///
/// # Arguments
///
/// * `cfg` - The configuration object
/// * `on_window` - Progress callback, see [`run_with`]
///
/// # Returns
///
/// * `Result<RunSummary, AppError>` - Per-window counts and the total, or an error
///
/// # Example
///
/// ```no_run
/// use meli_orders_archiver::config::Config;
/// use meli_orders_archiver::utils::orders::run;
///
/// async fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let cfg = Config::from_env()?;
///     let summary = run(&cfg, |report| println!("{}", report.progress_line())).await?;
///     println!("{}", summary.summary_line());
///     Ok(())
/// }
/// ```
pub async fn run<F>(cfg: &Config, on_window: F) -> Result<RunSummary, AppError>
where
    F: FnMut(&WindowReport),
{
    debug!("Loaded config: {}", cfg);

    let sleeper: Arc<dyn Sleeper> = Arc::new(TokioSleeper);
    let auth = MeliAuth::new(cfg)?;
    let fetcher = MeliOrderClient::new(cfg, Arc::clone(&sleeper))?;
    let sink = RestSink::new(&cfg.storage)?;
    let strategy = cfg.window.strategy();

    run_with(
        &auth,
        &fetcher,
        &sink,
        sleeper.as_ref(),
        strategy.as_ref(),
        Utc::now(),
        on_window,
    )
    .await
}
