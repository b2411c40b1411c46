use crate::constants::REST_PATH;
use std::fmt;

/// Where archived pages are appended.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub url: String,
    pub service_key: String,
    pub table: String,
}

impl StorageConfig {
    /// Path of the table endpoint, relative to `url`.
    pub fn insert_path(&self) -> String {
        format!("{}/{}", REST_PATH, self.table)
    }
}

impl fmt::Display for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"url\":\"{}\",\"service_key\":\"[REDACTED]\",\"table\":\"{}\"}}",
            self.url, self.table
        )
    }
}
