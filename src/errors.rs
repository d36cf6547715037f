use thiserror::Error;
use std::time::Duration;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Navigation to {url} timed out after {timeout:?}")]
    NavigationTimeout { url: String, timeout: Duration },

    #[error("Marker element `{selector}` did not appear on {url} within {timeout:?}")]
    PageLoadTimeout {
        url: String,
        selector: String,
        timeout: Duration,
    },

    #[error("Malformed directory page: {0}")]
    MalformedDirectoryPage(String),

    #[error("Malformed trading page: {0}")]
    MalformedTradingPage(String),

    #[error("Failed to write {path}: {reason}")]
    WriteError { path: String, reason: String },

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("Browser error: {0}")]
    BrowserError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, ScraperError>;

impl From<chromiumoxide::error::CdpError> for ScraperError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        ScraperError::BrowserError(e.to_string())
    }
}

// 用于从字符串创建错误
impl From<String> for ScraperError {
    fn from(s: String) -> Self {
        ScraperError::Unknown(s)
    }
}

// 用于从&str创建错误
impl From<&str> for ScraperError {
    fn from(s: &str) -> Self {
        ScraperError::Unknown(s.to_string())
    }
}
