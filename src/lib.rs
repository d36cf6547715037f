// 公开导出的模块，供外部使用
pub mod models;
pub mod errors;
pub mod config;
pub mod scrapers;
pub mod services;
pub mod util;

// 重新导出常用类型，方便使用
pub use models::company::{Company, DateRange, TradingData, TradingRecord};
pub use errors::{Result, ScraperError};
pub use config::Config;
pub use scrapers::base::PageFetcher;
pub use scrapers::nepse::NepseScraper;
pub use services::data_service::{CompanyOutcome, DataService, RunSummary};
