/******************************************************************************
    Author: Joaquín Béjar García
    Email: jb@taunais.com
    Date: 14/6/25
 ******************************************************************************/
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Raw JSON coming from the orders search endpoint.
///
/// The body is archived untouched; only the length of `results` is ever
/// inspected to decide whether the window is exhausted.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPage {
    raw: Value,
}

impl OrderPage {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Whether the body carries a `results` array at all.
    pub fn has_results_field(&self) -> bool {
        self.raw.get("results").is_some_and(Value::is_array)
    }

    /// Number of orders in the page; a missing or non-array `results` counts as zero.
    pub fn result_count(&self) -> usize {
        self.raw
            .get("results")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.result_count() == 0
    }
}

impl fmt::Display for OrderPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Row appended to the raw archive table.
#[derive(Debug, Serialize)]
pub struct ArchivedRecord<'a> {
    pub payload: &'a Value,
}

impl<'a> From<&'a OrderPage> for ArchivedRecord<'a> {
    fn from(page: &'a OrderPage) -> Self {
        Self { payload: page.raw() }
    }
}
