use crate::models::company::DateRange;
use std::time::Duration;

pub const DIRECTORY_URL: &str = "http://www.nepalstock.com/stockWisePrices";
pub const QUERY_URL: &str = "http://www.nepalstock.com/main/stockwiseprices/index/1/";
pub const MARKER_SELECTOR: &str = "#stockwiseprice";
pub const DEFAULT_ROW_LIMIT: usize = 100_000;

pub struct Config {
    pub debug_mode: bool,
    pub debug_company_limit: usize,
    pub data_dir: String,
    pub date_range: DateRange,
    pub row_limit: usize,
    /// 每次成功保存后的等待时间，避免被站点封禁
    pub inter_request_delay: Duration,
    pub page_load_timeout: Duration,
    pub element_wait_timeout: Duration,
    pub directory_url: String,
    pub query_url: String,
    pub marker_selector: String,
    pub headless: bool,
    pub chrome_path: Option<String>,
    /// 单个公司失败时是否中止整个任务
    pub fail_fast: bool,
    /// 只处理这些代码；为空表示全部
    pub symbols: Vec<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            debug_mode: false,
            debug_company_limit: 10,
            data_dir: "data".to_string(),
            date_range: DateRange::default(),
            row_limit: DEFAULT_ROW_LIMIT,
            inter_request_delay: Duration::from_secs(15),
            page_load_timeout: Duration::from_secs(300),
            element_wait_timeout: Duration::from_secs(20),
            directory_url: DIRECTORY_URL.to_string(),
            query_url: QUERY_URL.to_string(),
            marker_selector: MARKER_SELECTOR.to_string(),
            headless: true,
            chrome_path: None,
            fail_fast: false,
            symbols: Vec::new(),
        }
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    pub fn with_debug_company_limit(mut self, limit: usize) -> Self {
        self.debug_company_limit = limit;
        self
    }

    pub fn with_data_dir(mut self, dir: &str) -> Self {
        self.data_dir = dir.to_string();
        self
    }

    pub fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    pub fn with_row_limit(mut self, limit: usize) -> Self {
        self.row_limit = limit;
        self
    }

    pub fn with_inter_request_delay(mut self, delay: Duration) -> Self {
        self.inter_request_delay = delay;
        self
    }

    pub fn with_page_load_timeout(mut self, timeout: Duration) -> Self {
        self.page_load_timeout = timeout;
        self
    }

    pub fn with_element_wait_timeout(mut self, timeout: Duration) -> Self {
        self.element_wait_timeout = timeout;
        self
    }

    pub fn with_directory_url(mut self, url: &str) -> Self {
        self.directory_url = url.to_string();
        self
    }

    pub fn with_query_url(mut self, url: &str) -> Self {
        self.query_url = url.to_string();
        self
    }

    pub fn with_marker_selector(mut self, selector: &str) -> Self {
        self.marker_selector = selector.to_string();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_chrome_path(mut self, path: Option<String>) -> Self {
        self.chrome_path = path;
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_symbols(mut self, symbols: Vec<String>) -> Self {
        self.symbols = symbols;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
