use nepse_datahub::config::Config;
use nepse_datahub::errors::ScraperError;
use nepse_datahub::scrapers::base::PageFetcher;
use nepse_datahub::scrapers::http::HttpFetcher;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// 对每个连接返回 `status` 和 `body`，返回页面地址
async fn serve(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{}/stockWisePrices", addr)
}

/// 接受连接但从不响应
async fn serve_silently() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{}/stockWisePrices", addr)
}

fn config() -> Config {
    Config::new()
        .with_page_load_timeout(Duration::from_secs(5))
        .with_element_wait_timeout(Duration::ZERO)
}

#[tokio::test]
async fn returns_page_when_marker_present() {
    let body = r#"<html><body><div id="stockwiseprice"><select id="stock-symbol"></select></div></body></html>"#;
    let url = serve("200 OK", body).await;
    let fetcher = HttpFetcher::new(&config()).unwrap();

    let html = fetcher.fetch(&url).await.unwrap();
    assert_eq!(html, body);
    assert_eq!(fetcher.backend_name(), "http");
}

#[tokio::test]
async fn missing_marker_times_out() {
    let url = serve("200 OK", "<html><body><p>Service Unavailable</p></body></html>").await;
    let fetcher = HttpFetcher::new(&config().with_element_wait_timeout(Duration::from_millis(50)))
        .unwrap()
        .with_poll_interval(Duration::from_millis(10));

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert!(matches!(err, ScraperError::PageLoadTimeout { .. }));
}

#[tokio::test]
async fn unanswered_request_is_navigation_timeout() {
    let url = serve_silently().await;
    let fetcher =
        HttpFetcher::new(&config().with_page_load_timeout(Duration::from_millis(200))).unwrap();

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert!(matches!(err, ScraperError::NavigationTimeout { .. }));
}

#[tokio::test]
async fn error_status_is_reported() {
    let url = serve("503 Service Unavailable", "busy").await;
    let fetcher = HttpFetcher::new(&config()).unwrap();

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert!(err.to_string().contains("503"));
}

#[test]
fn invalid_marker_selector_is_rejected() {
    let result = HttpFetcher::new(&Config::new().with_marker_selector("div[["));
    assert!(matches!(result, Err(ScraperError::ConfigError(_))));
}
