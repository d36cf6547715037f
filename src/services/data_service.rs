use crate::config::Config;
use crate::errors::Result;
use crate::models::company::{Company, TradingData};
use crate::scrapers::nepse::NepseScraper;
use crate::util::{self, csv_utils};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

/// 单个公司的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyOutcome {
    Saved { path: PathBuf, rows: usize },
    Skipped,
}

/// 整个任务的统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub saved: usize,
    pub skipped: usize,
    /// (代码, 错误信息)
    pub failed: Vec<(String, String)>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// 数据服务：遍历公司列表，逐个抓取、保存并限速
pub struct DataService {
    config: Config,
    scraper: NepseScraper,
    data_path: PathBuf,
}

impl DataService {
    /// 创建新的数据服务实例
    pub fn new(config: Config, scraper: NepseScraper) -> Self {
        let data_path = PathBuf::from(&config.data_dir);
        Self {
            config,
            scraper,
            data_path,
        }
    }

    /// 获取输出目录
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// 加载公司目录；失败时整个任务无法继续
    pub async fn load_companies(&self) -> Result<Vec<Company>> {
        let mut companies = self.scraper.fetch_company_list().await?;

        if !self.config.symbols.is_empty() {
            companies.retain(|c| self.config.symbols.iter().any(|s| s == &c.symbol));
            info!("Filtered to {} companies by symbol", companies.len());
        }

        // 调试模式：只处理前N个公司
        if self.config.debug_mode {
            util::limit_companies(&mut companies, self.config.debug_company_limit);
        }

        Ok(companies)
    }

    /// 处理全部公司
    pub async fn run(&self) -> Result<RunSummary> {
        let date_range = self.config.date_range;
        info!(
            "Starting NEPSE export for {} via {} backend",
            date_range,
            self.scraper.backend_name()
        );

        let companies = self.load_companies().await?;
        if companies.is_empty() {
            warn!("No companies found in directory");
        }

        let mut summary = RunSummary {
            total: companies.len(),
            ..Default::default()
        };

        for (i, company) in companies.iter().enumerate() {
            info!("[{}/{}] {}", i + 1, companies.len(), company.symbol);

            match self.process_company(company).await {
                Ok(CompanyOutcome::Saved { .. }) => {
                    summary.saved += 1;
                    let is_last = i + 1 == companies.len();
                    if !is_last && !self.config.inter_request_delay.is_zero() {
                        info!(
                            "Sleeping for {:?} to avoid being blocked by NEPSE",
                            self.config.inter_request_delay
                        );
                        tokio::time::sleep(self.config.inter_request_delay).await;
                    }
                }
                Ok(CompanyOutcome::Skipped) => {
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!(
                        "Failed to process {} for {}: {}",
                        company.symbol, date_range, e
                    );
                    if self.config.fail_fast {
                        return Err(e);
                    }
                    summary.failed.push((company.symbol.clone(), e.to_string()));
                }
            }
        }

        info!(
            "NEPSE export completed: {} saved, {} skipped, {} failed out of {}",
            summary.saved,
            summary.skipped,
            summary.failed.len(),
            summary.total
        );
        Ok(summary)
    }

    /// 抓取并保存单个公司
    pub async fn process_company(&self, company: &Company) -> Result<CompanyOutcome> {
        let date_range = self.config.date_range;
        let data = self
            .scraper
            .fetch_trading_data(company, &date_range, self.config.row_limit)
            .await?;

        let records = match data {
            TradingData::NoData => {
                info!(
                    "Data not found for {} in {}, skipping",
                    company.symbol, date_range
                );
                return Ok(CompanyOutcome::Skipped);
            }
            TradingData::Records(records) if records.is_empty() => {
                warn!("Trading table for {} has no rows, skipping", company.symbol);
                return Ok(CompanyOutcome::Skipped);
            }
            TradingData::Records(records) => records,
        };

        let path = csv_utils::save_company_records(&records, company, &date_range, &self.data_path)?;

        let rows = records.len() - 1;
        info!("Saved {} rows for {} to {}", rows, company.symbol, path.display());
        Ok(CompanyOutcome::Saved { path, rows })
    }

    /// 关闭浏览器会话
    pub async fn shutdown(&mut self) -> Result<()> {
        self.scraper.close().await
    }
}
