use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::application::models::window::TimeWindow;
use crate::constants::MAX_LOOKBACK_MONTHS;
use crate::error::AppError;

/// Splits a run's lookback period into the windows that get paged through.
pub trait WindowStrategy: Send + Sync {
    fn windows(&self, now: DateTime<Utc>) -> Result<Vec<TimeWindow>, AppError>;

    fn name(&self) -> &'static str;

    /// Whether a progress line is printed after each window.
    fn reports_progress(&self) -> bool {
        false
    }
}

/// Single window of `days` ending at "now".
#[derive(Debug, Clone, Copy)]
pub struct RollingWindow {
    days: i64,
}

impl RollingWindow {
    pub fn new(days: i64) -> Self {
        Self { days }
    }
}

impl WindowStrategy for RollingWindow {
    fn windows(&self, now: DateTime<Utc>) -> Result<Vec<TimeWindow>, AppError> {
        if self.days <= 0 {
            return Err(AppError::InvalidWindow(format!(
                "rolling lookback must be positive, got {} days",
                self.days
            )));
        }
        let from = Duration::try_days(self.days)
            .and_then(|lookback| now.checked_sub_signed(lookback))
            .ok_or_else(|| AppError::InvalidWindow(format!("{} days before {now} overflows", self.days)))?;
        Ok(vec![TimeWindow::new(from, now)])
    }

    fn name(&self) -> &'static str {
        "rolling"
    }
}

/// Calendar months, current month first.
#[derive(Debug, Clone, Copy)]
pub struct MonthlyWindows {
    months_back: u32,
}

impl MonthlyWindows {
    pub fn new(months_back: u32) -> Self {
        Self { months_back }
    }
}

impl WindowStrategy for MonthlyWindows {
    fn windows(&self, now: DateTime<Utc>) -> Result<Vec<TimeWindow>, AppError> {
        month_windows(now, self.months_back)
    }

    fn name(&self) -> &'static str {
        "monthly"
    }

    fn reports_progress(&self) -> bool {
        true
    }
}

/// Month preceding `(year, month)`, rolling January back into December.
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn month_start(year: i32, month: u32) -> Result<DateTime<Utc>, AppError> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::InvalidWindow(format!("no first day for {year}-{month:02}")))
}

/// Builds `months_back` calendar-month windows ending at `now`.
///
/// Index 0 is the current month truncated at `now`; every following entry is
/// the full month before the previous one, ending at that month's start.
/// More than [`MAX_LOOKBACK_MONTHS`] is rejected before anything is built.
pub fn month_windows(now: DateTime<Utc>, months_back: u32) -> Result<Vec<TimeWindow>, AppError> {
    if months_back > MAX_LOOKBACK_MONTHS {
        return Err(AppError::InvalidWindow(format!(
            "{months_back} months exceeds the maximum lookback of {MAX_LOOKBACK_MONTHS}"
        )));
    }
    let mut windows = Vec::new();
    if months_back == 0 {
        return Ok(windows);
    }

    let (mut year, mut month) = (now.year(), now.month());
    let mut end = month_start(year, month)?;
    windows.push(TimeWindow::new(end, now));

    for _ in 1..months_back {
        (year, month) = previous_month(year, month);
        let start = month_start(year, month)?;
        windows.push(TimeWindow::new(start, end));
        end = start;
    }

    Ok(windows)
}
