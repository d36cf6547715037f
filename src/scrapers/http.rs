use crate::config::Config;
use crate::errors::{Result, ScraperError};
use crate::scrapers::base::PageFetcher;
use crate::util::html_utils;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::time::{Duration, Instant};

/// 不经过浏览器、直接用 HTTP 获取服务端渲染页面的抓取器
pub struct HttpFetcher {
    client: Client,
    page_load_timeout: Duration,
    element_wait_timeout: Duration,
    marker_selector: String,
    poll_interval: Duration,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        // 提前校验选择器，避免每次请求都失败
        html_utils::parse_selector(&config.marker_selector)?;

        let client = Client::builder()
            .timeout(config.page_load_timeout)
            .user_agent(concat!("nepse_datahub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ScraperError::RequestError)?;

        Ok(Self {
            client,
            page_load_timeout: config.page_load_timeout,
            element_wait_timeout: config.element_wait_timeout,
            marker_selector: config.marker_selector.clone(),
            poll_interval: Duration::from_secs(1),
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    async fn get(&self, url: &str) -> Result<String> {
        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                ScraperError::NavigationTimeout {
                    url: url.to_string(),
                    timeout: self.page_load_timeout,
                }
            } else {
                ScraperError::RequestError(e)
            }
        };

        let response = self.client.get(url).send().await.map_err(map_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::BrowserError(format!("HTTP {} for {}", status, url)));
        }
        response.text().await.map_err(map_err)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn backend_name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let start = Instant::now();
        loop {
            debug!("GET {}", url);
            let html = self.get(url).await?;
            if html_utils::contains_selector(&html, &self.marker_selector)? {
                return Ok(html);
            }
            if start.elapsed() >= self.element_wait_timeout {
                return Err(ScraperError::PageLoadTimeout {
                    url: url.to_string(),
                    selector: self.marker_selector.clone(),
                    timeout: self.element_wait_timeout,
                });
            }
            debug!("Marker {} missing, retrying in {:?}", self.marker_selector, self.poll_interval);
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
