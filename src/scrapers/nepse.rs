use crate::config::Config;
use crate::errors::{Result, ScraperError};
use crate::models::company::{Company, DateRange, TradingData, TradingRecord};
use crate::scrapers::base::PageFetcher;
use crate::util::{html_utils, strip_line_breaks};
use log::{debug, info};
use reqwest::Url;
use scraper::Html;

/// 无数据时站点显示的文本
pub const NO_DATA_TEXT: &str = "No Data Available!";

const COMPANY_SELECT: &str = "select#stock-symbol";
const COMPANY_OPTION: &str = "option";
const TRADING_TABLE: &str = "table.table.table-condensed.table-hover";
// 站点无数据时提示所在的固定单元格
const NO_DATA_CELL: &str = "body > div:nth-of-type(5) > table > tbody > tr:nth-of-type(3) > td";

/// 尼泊尔证券交易所个股历史行情抓取器
pub struct NepseScraper {
    fetcher: Box<dyn PageFetcher + Send + Sync>,
    directory_url: String,
    query_url: String,
}

impl NepseScraper {
    pub fn new(fetcher: Box<dyn PageFetcher + Send + Sync>, config: &Config) -> Self {
        Self {
            fetcher,
            directory_url: config.directory_url.clone(),
            query_url: config.query_url.clone(),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.fetcher.backend_name()
    }

    /// 获取目录页上的全部公司
    pub async fn fetch_company_list(&self) -> Result<Vec<Company>> {
        info!("Fetching company list from {}", self.directory_url);
        let html = self.fetcher.fetch(&self.directory_url).await?;
        let companies = parse_company_list(&html)?;
        info!("Found {} companies", companies.len());
        Ok(companies)
    }

    /// 查询单个公司在日期区间内的交易记录
    pub async fn fetch_trading_data(
        &self,
        company: &Company,
        date_range: &DateRange,
        limit: usize,
    ) -> Result<TradingData> {
        let url = self.query_url(company, date_range, limit)?;
        debug!("Fetching trading data for {} from {}", company.symbol, url);

        let html = self.fetcher.fetch(url.as_str()).await?;
        parse_trading_page(&html)
    }

    pub fn query_url(&self, company: &Company, date_range: &DateRange, limit: usize) -> Result<Url> {
        let start = date_range.start_str();
        let end = date_range.end_str();
        let limit = limit.to_string();

        Url::parse_with_params(
            &self.query_url,
            &[
                ("startDate", start.as_str()),
                ("endDate", end.as_str()),
                ("stock-symbol", company.value.as_str()),
                ("_limit", limit.as_str()),
            ],
        )
        .map_err(|e| ScraperError::ConfigError(format!("Invalid query url {}: {}", self.query_url, e)))
    }

    pub async fn close(&mut self) -> Result<()> {
        self.fetcher.close().await
    }
}

/// 解析目录页下拉框，跳过第一个占位选项
pub fn parse_company_list(html: &str) -> Result<Vec<Company>> {
    let document = Html::parse_document(html);
    let select_selector = html_utils::parse_selector(COMPANY_SELECT)?;
    let option_selector = html_utils::parse_selector(COMPANY_OPTION)?;

    let select = document
        .select(&select_selector)
        .next()
        .ok_or_else(|| ScraperError::MalformedDirectoryPage(format!("`{}` not found", COMPANY_SELECT)))?;

    let companies = select
        .select(&option_selector)
        .skip(1)
        .map(|option| {
            let symbol = html_utils::element_text(&option).trim().to_string();
            let value = option.value().attr("value").unwrap_or_default().to_string();
            Company { symbol, value }
        })
        .collect();

    Ok(companies)
}

/// 解析查询页：先检查无数据提示，再提取交易表格
pub fn parse_trading_page(html: &str) -> Result<TradingData> {
    let document = Html::parse_document(html);

    if is_no_data(&document)? {
        return Ok(TradingData::NoData);
    }

    let records = extract_trading_table(&document)?;
    Ok(TradingData::Records(records))
}

fn is_no_data(document: &Html) -> Result<bool> {
    let cell_selector = html_utils::parse_selector(NO_DATA_CELL)?;
    let no_data = document
        .select(&cell_selector)
        .next()
        .map(|cell| html_utils::element_text(&cell).trim() == NO_DATA_TEXT)
        .unwrap_or(false);
    Ok(no_data)
}

// 去掉第一行（标题）和最后一行（汇总），只取 td 单元格
fn extract_trading_table(document: &Html) -> Result<Vec<TradingRecord>> {
    let table_selector = html_utils::parse_selector(TRADING_TABLE)?;
    let row_selector = html_utils::parse_selector("tr")?;
    let cell_selector = html_utils::parse_selector("td")?;

    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| ScraperError::MalformedTradingPage(format!("`{}` not found", TRADING_TABLE)))?;

    let rows: Vec<_> = table.select(&row_selector).collect();
    if rows.len() < 2 {
        return Ok(Vec::new());
    }

    let records = rows[1..rows.len() - 1]
        .iter()
        .map(|row| {
            let fields = row
                .select(&cell_selector)
                .map(|cell| strip_line_breaks(&html_utils::element_text(&cell)))
                .collect();
            TradingRecord::new(fields)
        })
        .collect();

    Ok(records)
}
