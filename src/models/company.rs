use crate::errors::{Result, ScraperError};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// 上市公司，来自目录页的 `stock-symbol` 下拉框
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Company {
    pub symbol: String,
    /// 站点内部编号，查询页的 `stock-symbol` 参数
    pub value: String,
}

impl Company {
    pub fn new(symbol: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            value: value.into(),
        }
    }

    /// 将 `/` 替换为 `-`，用作文件名
    pub fn file_stem(&self) -> String {
        self.symbol.replace('/', "-")
    }
}

/// 表格中的一行，字段未做类型校验
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradingRecord {
    pub fields: Vec<String>,
}

impl TradingRecord {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }
}

impl From<Vec<&str>> for TradingRecord {
    fn from(fields: Vec<&str>) -> Self {
        Self::new(fields.into_iter().map(str::to_string).collect())
    }
}

/// 查询页的结果：要么是表格行，要么是 "No Data Available!"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradingData {
    Records(Vec<TradingRecord>),
    NoData,
}

/// 闭区间日期范围，整个任务的所有查询共用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ScraperError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// 解析两个 `YYYY-MM-DD` 字符串
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")?;
        let end = NaiveDate::parse_from_str(end, "%Y-%m-%d")?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2021, 12, 31).unwrap_or_default(),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start_str(), self.end_str())
    }
}
