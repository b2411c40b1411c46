/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/6/25
******************************************************************************/
use anyhow::{Context, Result};
use meli_orders_archiver::config::Config;
use meli_orders_archiver::utils::logger::setup_logger;
use meli_orders_archiver::utils::orders::run;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    setup_logger();

    let cfg = Config::from_env().context("Failed to load configuration")?;
    info!("Starting order archive run ({})", cfg.window);

    let summary = match run(&cfg, |report| println!("{}", report.progress_line())).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Archive run failed: {}", e);
            return Err(e).context("Archive run aborted");
        }
    };

    println!("{}", summary.summary_line());
    Ok(())
}
