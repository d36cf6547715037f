use log::info;
use crate::models::company::{Company, DateRange};

// 输出文件名: <symbol>_<start>_<end>.csv
pub fn output_file_name(company: &Company, date_range: &DateRange) -> String {
    format!(
        "{}_{}_{}.csv",
        company.file_stem(),
        date_range.start_str(),
        date_range.end_str()
    )
}

// 调试模式下限制公司数量
pub fn limit_companies(companies: &mut Vec<Company>, max_companies: usize) {
    if companies.len() > max_companies {
        info!("DEBUG MODE: Processing only {} out of {} companies",
              max_companies, companies.len());
        companies.truncate(max_companies);
    }
}

/// 删除回车和换行，其余字符保持不变
pub fn strip_line_breaks(text: &str) -> String {
    text.chars().filter(|c| *c != '\r' && *c != '\n').collect()
}

// HTML 解析工具
pub mod html_utils {
    use crate::errors::{Result, ScraperError};
    use scraper::{ElementRef, Html, Selector};

    pub fn parse_selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector)
            .map_err(|e| ScraperError::ConfigError(format!("Invalid selector `{}`: {:?}", selector, e)))
    }

    pub fn contains_selector(html: &str, selector: &str) -> Result<bool> {
        let selector = parse_selector(selector)?;
        let document = Html::parse_document(html);
        let found = document.select(&selector).next().is_some();
        Ok(found)
    }

    /// 元素内所有文本节点拼接
    pub fn element_text(element: &ElementRef) -> String {
        element.text().collect()
    }
}

// CSV 读写工具
pub mod csv_utils {
    use crate::errors::{Result, ScraperError};
    use crate::models::company::{Company, DateRange, TradingRecord};
    use csv::{ReaderBuilder, WriterBuilder};
    use log::debug;
    use std::fs;
    use std::path::{Path, PathBuf};

    /// 保存到 `<data_dir>/<symbol>_<start>_<end>.csv`，返回文件路径
    pub fn save_company_records(
        records: &[TradingRecord],
        company: &Company,
        date_range: &DateRange,
        data_dir: &Path,
    ) -> Result<PathBuf> {
        let path = data_dir.join(super::output_file_name(company, date_range));
        save_records_to_csv(records, &path)?;
        Ok(path)
    }

    /// 第一行作为表头写入，其余为数据行，不带行号列。
    /// 没有字段的记录写成 `""`，读回时是一个空字段
    pub fn save_records_to_csv(records: &[TradingRecord], path: &Path) -> Result<()> {
        let write_err = |reason: String| ScraperError::WriteError {
            path: path.display().to_string(),
            reason,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
            }
        }

        debug!("Writing {} rows to {}", records.len().saturating_sub(1), path.display());

        let mut writer = WriterBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| write_err(e.to_string()))?;

        for record in records {
            writer
                .write_record(&record.fields)
                .map_err(|e| write_err(e.to_string()))?;
        }
        writer.flush().map_err(|e| write_err(e.to_string()))?;

        Ok(())
    }

    /// 读回保存的文件，返回 (表头, 数据行)
    pub fn read_records_from_csv(path: &Path) -> Result<(TradingRecord, Vec<TradingRecord>)> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let header = TradingRecord::new(reader.headers()?.iter().map(str::to_string).collect());

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(TradingRecord::new(record.iter().map(str::to_string).collect()));
        }

        Ok((header, rows))
    }
}
