/******************************************************************************
    Author: Joaquín Béjar García
    Email: jb@taunais.com
    Date: 14/6/25
 ******************************************************************************/
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;

/// Half-open `[from, to)` range of order creation dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Lower bound as sent in `order.date_created.from`.
    pub fn from_param(&self) -> String {
        self.from.to_rfc3339_opts(SecondsFormat::Millis, false)
    }

    /// Upper bound as sent in `order.date_created.to`.
    pub fn to_param(&self) -> String {
        self.to.to_rfc3339_opts(SecondsFormat::Millis, false)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from_param(), self.to_param())
    }
}
