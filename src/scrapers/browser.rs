use crate::config::Config;
use crate::errors::{Result, ScraperError};
use crate::scrapers::base::PageFetcher;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use log::{debug, info, warn};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

const MARKER_POLL_INTERVAL: Duration = Duration::from_millis(250);
const HANDLER_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// 基于无头 Chrome 的页面抓取器，整个任务复用同一个标签页
pub struct ChromiumFetcher {
    browser: Browser,
    page: Page,
    handler: Option<JoinHandle<()>>,
    page_load_timeout: Duration,
    element_wait_timeout: Duration,
    marker_selector: String,
    closed: bool,
}

impl ChromiumFetcher {
    /// 启动浏览器并打开一个空白页
    pub async fn launch(config: &Config) -> Result<Self> {
        info!("Launching browser (headless={})", config.headless);

        // request_timeout 默认 30 秒，会截断较长的页面加载
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-extensions")
            .request_timeout(config.page_load_timeout);

        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        let browser_config = builder.build().map_err(ScraperError::BrowserError)?;
        let (browser, mut handler) = Browser::launch(browser_config).await?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler event error: {}", e);
                }
            }
            debug!("Browser handler finished");
        });

        let page = browser.new_page("about:blank").await?;
        info!("Browser ready");

        Ok(Self {
            browser,
            page,
            handler: Some(handler),
            page_load_timeout: config.page_load_timeout,
            element_wait_timeout: config.element_wait_timeout,
            marker_selector: config.marker_selector.clone(),
            closed: false,
        })
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        let timeout_err = || ScraperError::NavigationTimeout {
            url: url.to_string(),
            timeout: self.page_load_timeout,
        };

        match tokio::time::timeout(self.page_load_timeout, self.page.goto(url)).await {
            Err(_) => Err(timeout_err()),
            Ok(Err(CdpError::Timeout)) => Err(timeout_err()),
            Ok(Err(e)) => Err(e.into()),
            Ok(Ok(_)) => Ok(()),
        }
    }

    async fn wait_for_marker(&self, url: &str) -> Result<()> {
        let start = Instant::now();
        loop {
            let found = self.page.find_elements(self.marker_selector.as_str()).await;
            if marker_present(found)? {
                debug!("Marker {} present after {:?}", self.marker_selector, start.elapsed());
                return Ok(());
            }
            if start.elapsed() >= self.element_wait_timeout {
                return Err(ScraperError::PageLoadTimeout {
                    url: url.to_string(),
                    selector: self.marker_selector.clone(),
                    timeout: self.element_wait_timeout,
                });
            }
            tokio::time::sleep(MARKER_POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl PageFetcher for ChromiumFetcher {
    fn backend_name(&self) -> &'static str {
        "chrome"
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        debug!("Navigating to {}", url);
        self.navigate(url).await?;
        self.wait_for_marker(url).await?;
        let html = self.page.content().await?;
        Ok(html)
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        info!("Closing browser");

        let browser = &mut self.browser;
        let close = async move {
            browser.close().await?;
            if let Err(e) = browser.wait().await {
                warn!("Browser process did not exit cleanly: {}", e);
            }
            Ok::<(), ScraperError>(())
        };
        shutdown_session(close, self.handler.take()).await
    }
}

// 查询为空表示尚未渲染；NotFound 多见于导航中节点失效，同样视为未出现
fn marker_present<T>(found: std::result::Result<Vec<T>, CdpError>) -> Result<bool> {
    match found {
        Ok(elements) => Ok(!elements.is_empty()),
        Err(CdpError::NotFound) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

// 无论关闭是否成功都要等待 CDP 事件任务结束
async fn shutdown_session<F>(close: F, handler: Option<JoinHandle<()>>) -> Result<()>
where
    F: std::future::Future<Output = Result<()>>,
{
    let result = close.await;
    if let Err(e) = &result {
        warn!("Failed to close browser: {}", e);
    }
    if let Some(handler) = handler {
        let _ = tokio::time::timeout(HANDLER_JOIN_TIMEOUT, handler).await;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn marker_absent_until_query_matches() {
        assert!(!marker_present::<()>(Ok(Vec::new())).unwrap());
        assert!(marker_present(Ok(vec![()])).unwrap());
        assert!(!marker_present::<()>(Err(CdpError::NotFound)).unwrap());
    }

    #[test]
    fn cdp_failure_while_waiting_is_reported() {
        let err = marker_present::<()>(Err(CdpError::Timeout)).unwrap_err();
        assert!(matches!(err, ScraperError::BrowserError(_)));
    }

    #[tokio::test]
    async fn handler_is_joined_when_close_fails() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let handler = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            flag.store(true, Ordering::SeqCst);
        });

        let close = async { Err::<(), _>(ScraperError::BrowserError("connection lost".to_string())) };
        let err = shutdown_session(close, Some(handler)).await.unwrap_err();

        assert!(matches!(err, ScraperError::BrowserError(_)));
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn shutdown_without_handler_returns_close_result() {
        assert!(shutdown_session(async { Ok::<(), ScraperError>(()) }, None).await.is_ok());
    }
}
