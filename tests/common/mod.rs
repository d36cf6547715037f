#![allow(dead_code)]

use async_trait::async_trait;
use nepse_datahub::config::{Config, DIRECTORY_URL};
use nepse_datahub::errors::{Result, ScraperError};
use nepse_datahub::scrapers::base::PageFetcher;
use reqwest::Url;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub enum Canned {
    Page(String),
    Timeout,
}

/// 按 `stock-symbol` 参数返回预置页面
#[derive(Default)]
pub struct FakeFetcher {
    directory: Option<String>,
    pages: HashMap<String, Canned>,
    requests: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl FakeFetcher {
    pub fn new(directory: String) -> Self {
        Self {
            directory: Some(directory),
            ..Default::default()
        }
    }

    pub fn without_directory() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, value: &str, html: String) -> Self {
        self.pages.insert(value.to_string(), Canned::Page(html));
        self
    }

    pub fn with_timeout(mut self, value: &str) -> Self {
        self.pages.insert(value.to_string(), Canned::Timeout);
        self
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.requests)
    }

    pub fn closed(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }
}

fn timeout(url: &str) -> ScraperError {
    ScraperError::PageLoadTimeout {
        url: url.to_string(),
        selector: "#stockwiseprice".to_string(),
        timeout: Duration::from_secs(20),
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    fn backend_name(&self) -> &'static str {
        "fake"
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());

        if url == DIRECTORY_URL {
            return self.directory.clone().ok_or_else(|| {
                ScraperError::MalformedDirectoryPage("no stock-symbol select".to_string())
            });
        }

        let parsed = Url::parse(url).map_err(|e| ScraperError::Unknown(e.to_string()))?;
        let value = parsed
            .query_pairs()
            .find(|(k, _)| k == "stock-symbol")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();

        match self.pages.get(&value) {
            Some(Canned::Page(html)) => Ok(html.clone()),
            Some(Canned::Timeout) | None => Err(timeout(url)),
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub fn test_config(data_dir: &std::path::Path) -> Config {
    Config::new()
        .with_data_dir(data_dir.to_str().unwrap())
        .with_inter_request_delay(Duration::from_secs(15))
}

pub fn directory_html(companies: &[(&str, &str)]) -> String {
    let options: String = companies
        .iter()
        .map(|(symbol, value)| format!("<option value=\"{}\">{}</option>\n", value, symbol))
        .collect();
    format!(
        r#"<html><body><div id="stockwiseprice">
        <select id="stock-symbol"><option value="">Choose Symbol</option>
        {}</select></div></body></html>"#,
        options
    )
}

/// 与行情页结构一致：标题行、列名行、数据行、合计行
pub fn trading_html(labels: &[&str], rows: &[Vec<&str>]) -> String {
    let to_row = |cells: &[&str]| -> String {
        let cells: String = cells.iter().map(|c| format!("<td>{}</td>", c)).collect();
        format!("<tr>{}</tr>", cells)
    };
    let mut body = String::from("<tr><td colspan=\"9\">Stock Wise Prices</td></tr>");
    body.push_str(&to_row(labels));
    for row in rows {
        body.push_str(&to_row(row));
    }
    body.push_str("<tr><td>Total</td><td>\r\n</td></tr>");

    format!(
        r#"<html><body><div></div><div></div><div></div><div id="stockwiseprice"></div>
        <div><table class="table table-condensed table-hover">{}</table></div></body></html>"#,
        body
    )
}

pub fn no_data_html() -> String {
    r#"<html><body><div></div><div></div><div></div><div id="stockwiseprice"></div>
    <div><table class="table my-table">
        <tr><td>Stock Wise Prices</td></tr>
        <tr><td>S.N.</td><td>Traded Date</td></tr>
        <tr><td colspan="9">No Data Available!</td></tr>
    </table></div></body></html>"#
        .to_string()
}
