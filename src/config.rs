use crate::application::services::windowing::{MonthlyWindows, RollingWindow, WindowStrategy};
use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_ARCHIVE_TABLE, DEFAULT_LOOKBACK_DAYS, DEFAULT_LOOKBACK_MONTHS,
    DEFAULT_SELLER_ID, MAX_LOOKBACK_DAYS, MAX_LOOKBACK_MONTHS, SEARCH_TIMEOUT_SECS,
};
use crate::error::AppError;
use crate::storage::config::StorageConfig;
use std::env;
use std::fmt;
use std::fmt::Debug;
use std::str::FromStr;
use tracing::error;

#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub rest_api: RestApiConfig,
    pub storage: StorageConfig,
    pub seller_id: String,
    pub window: WindowMode,
}

#[derive(Debug, Clone)]
pub struct RestApiConfig {
    pub base_url: String,
    pub timeout: u64,
}

/// How the run splits its lookback period into windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    Rolling { days: i64 },
    Monthly { months_back: u32 },
}

impl WindowMode {
    pub fn strategy(&self) -> Box<dyn WindowStrategy> {
        match *self {
            WindowMode::Rolling { days } => Box::new(RollingWindow::new(days)),
            WindowMode::Monthly { months_back } => Box::new(MonthlyWindows::new(months_back)),
        }
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"client_id\":\"{}\",\"client_secret\":\"[REDACTED]\",\"refresh_token\":\"[REDACTED]\"}}",
            self.client_id
        )
    }
}

impl fmt::Display for RestApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"base_url\":\"{}\",\"timeout\":{}}}",
            self.base_url, self.timeout
        )
    }
}

impl fmt::Display for WindowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowMode::Rolling { days } => write!(f, "{{\"mode\":\"rolling\",\"days\":{}}}", days),
            WindowMode::Monthly { months_back } => {
                write!(f, "{{\"mode\":\"monthly\",\"months_back\":{}}}", months_back)
            }
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"credentials\":{},\"rest_api\":{},\"storage\":{},\"seller_id\":\"{}\",\"window\":{}}}",
            self.credentials, self.rest_api, self.storage, self.seller_id, self.window
        )
    }
}

pub fn get_env_or_default<T: FromStr>(env_var: &str, default: T) -> T
where
    <T as FromStr>::Err: Debug,
{
    match env::var(env_var) {
        Ok(val) => val.parse::<T>().unwrap_or_else(|_| {
            error!("Failed to parse {}: {}, using default", env_var, val);
            default
        }),
        Err(_) => default,
    }
}

pub fn get_env_required(env_var: &str) -> Result<String, AppError> {
    match env::var(env_var) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(AppError::Config(format!("missing required environment variable {env_var}"))),
    }
}

fn window_mode_from_env() -> Result<WindowMode, AppError> {
    let mode = get_env_or_default("ARCHIVE_WINDOW_MODE", String::from("rolling"));
    match mode.trim().to_ascii_lowercase().as_str() {
        "rolling" => {
            let days = get_env_or_default("ARCHIVE_LOOKBACK_DAYS", DEFAULT_LOOKBACK_DAYS);
            if !(1..=MAX_LOOKBACK_DAYS).contains(&days) {
                return Err(AppError::Config(format!(
                    "ARCHIVE_LOOKBACK_DAYS must be between 1 and {MAX_LOOKBACK_DAYS}, got {days}"
                )));
            }
            Ok(WindowMode::Rolling { days })
        }
        "monthly" => {
            let months_back =
                get_env_or_default("ARCHIVE_LOOKBACK_MONTHS", DEFAULT_LOOKBACK_MONTHS);
            if months_back > MAX_LOOKBACK_MONTHS {
                return Err(AppError::Config(format!(
                    "ARCHIVE_LOOKBACK_MONTHS must be at most {MAX_LOOKBACK_MONTHS}, got {months_back}"
                )));
            }
            Ok(WindowMode::Monthly { months_back })
        }
        other => Err(AppError::Config(format!(
            "unknown ARCHIVE_WINDOW_MODE '{other}', expected 'rolling' or 'monthly'"
        ))),
    }
}

impl Config {
    /// Builds the configuration from the process environment.
    ///
    /// Storage and OAuth secrets are mandatory; everything else has a default.
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Config {
            credentials: Credentials {
                client_id: get_env_required("MELI_CLIENT_ID")?,
                client_secret: get_env_required("MELI_CLIENT_SECRET")?,
                refresh_token: get_env_required("MELI_REFRESH_TOKEN")?,
            },
            rest_api: RestApiConfig {
                base_url: get_env_or_default(
                    "MELI_API_BASE_URL",
                    String::from(DEFAULT_API_BASE_URL),
                )
                .trim_end_matches('/')
                .to_string(),
                timeout: SEARCH_TIMEOUT_SECS,
            },
            storage: StorageConfig {
                url: get_env_required("SUPABASE_URL")?
                    .trim_end_matches('/')
                    .to_string(),
                service_key: get_env_required("SUPABASE_SERVICE_KEY")?,
                table: get_env_or_default("ARCHIVE_TABLE", String::from(DEFAULT_ARCHIVE_TABLE)),
            },
            seller_id: get_env_or_default("SELLER_ID", String::from(DEFAULT_SELLER_ID)),
            window: window_mode_from_env()?,
        })
    }
}
