use nepse_datahub::config::Config;
use nepse_datahub::models::company::{Company, DateRange};
use nepse_datahub::scrapers::base::PageFetcher;
use nepse_datahub::scrapers::browser::ChromiumFetcher;
use nepse_datahub::scrapers::http::HttpFetcher;
use nepse_datahub::scrapers::nepse::NepseScraper;
use nepse_datahub::services::data_service::DataService;
use nepse_datahub::util::{self, csv_utils};

use clap::{App, Arg, ArgMatches, SubCommand};
use log::{info, warn, error};
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // 默认输出 info 级别日志，可用 RUST_LOG 覆盖
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let today = chrono::Local::now().format("%Y-%m-%d").to_string();

    // 创建基本的命令行应用
    let app = App::new("NEPSE DataHub")
        .version(env!("CARGO_PKG_VERSION"))
        .author("DataHub Team")
        .about("Export NEPSE stock-wise price history to CSV files");

    // 在开发模式下添加调试参数
    #[cfg(debug_assertions)]
    let app = app.arg(
        Arg::with_name("debug")
            .long("debug")
            .help("Enable debug mode")
            .takes_value(false),
    )
    .arg(
        Arg::with_name("debug-limit")
            .long("debug-limit")
            .help("Limit the number of companies to process in debug mode")
            .takes_value(true)
            .default_value("2"),
    );

    let app = app.subcommand(
        SubCommand::with_name("scrape")
            .about("Export trading history of every listed company")
            .args(session_args())
            .args(date_args(&today))
            .arg(
                Arg::with_name("limit")
                    .short('l')
                    .long("limit")
                    .value_name("ROWS")
                    .help("Maximum number of rows requested per company")
                    .takes_value(true)
                    .default_value("100000"),
            )
            .arg(output_arg())
            .arg(
                Arg::with_name("delay")
                    .long("delay")
                    .value_name("SECONDS")
                    .help("Pause after each saved company")
                    .takes_value(true)
                    .default_value("15"),
            )
            .arg(
                Arg::with_name("symbol")
                    .short('s')
                    .long("symbol")
                    .value_name("SYMBOL")
                    .help("Only export this symbol (repeatable)")
                    .takes_value(true)
                    .multiple_occurrences(true),
            )
            .arg(
                Arg::with_name("fail-fast")
                    .long("fail-fast")
                    .help("Abort the whole run on the first company that fails")
                    .takes_value(false),
            ),
    ).subcommand(
        SubCommand::with_name("list")
            .about("List companies from the NEPSE directory page")
            .args(session_args())
            .arg(
                Arg::with_name("json")
                    .long("json")
                    .help("Print the list as JSON")
                    .takes_value(false),
            ),
    ).subcommand(
        SubCommand::with_name("explore")
            .about("Show rows of an exported CSV file")
            .arg(
                Arg::with_name("symbol")
                    .short('s')
                    .long("symbol")
                    .value_name("SYMBOL")
                    .help("Symbol of the exported company")
                    .required(true)
                    .takes_value(true),
            )
            .args(date_args(&today))
            .arg(output_arg())
            .arg(
                Arg::with_name("rows")
                    .short('n')
                    .long("rows")
                    .value_name("ROWS")
                    .help("Number of rows to display")
                    .takes_value(true)
                    .default_value("10"),
            ),
    );

    let matches = app.get_matches();

    // 获取调试模式设置
    #[cfg(debug_assertions)]
    let debug_mode = matches.is_present("debug");
    #[cfg(not(debug_assertions))]
    let debug_mode = false;

    #[cfg(debug_assertions)]
    let debug_company_limit = matches.value_of("debug-limit")
        .unwrap_or("2")
        .parse::<usize>()
        .unwrap_or(2);
    #[cfg(not(debug_assertions))]
    let debug_company_limit = usize::MAX;

    if let Some(matches) = matches.subcommand_matches("scrape") {
        let date_range = parse_date_range(matches)?;
        let symbols: Vec<String> = matches.values_of("symbol")
            .map(|values| values.map(str::to_string).collect())
            .unwrap_or_default();

        let config = session_config(matches)?
            .with_debug_mode(debug_mode)
            .with_debug_company_limit(debug_company_limit)
            .with_date_range(date_range)
            .with_row_limit(parse_number(matches, "limit")?)
            .with_data_dir(matches.value_of("output").unwrap_or("data"))
            .with_inter_request_delay(Duration::from_secs(parse_number(matches, "delay")?))
            .with_symbols(symbols)
            .with_fail_fast(matches.is_present("fail-fast"));

        // 启动失败直接退出
        let fetcher = launch_fetcher(matches, &config).await?;
        let scraper = NepseScraper::new(fetcher, &config);
        let mut data_service = DataService::new(config, scraper);

        let result = data_service.run().await;
        if let Err(e) = data_service.shutdown().await {
            warn!("Failed to close session: {}", e);
        }

        let summary = result?;
        if summary.has_failures() {
            for (symbol, reason) in &summary.failed {
                error!("  - {}: {}", symbol, reason);
            }
            std::process::exit(2);
        }
    } else if let Some(matches) = matches.subcommand_matches("list") {
        let config = session_config(matches)?;
        let fetcher = launch_fetcher(matches, &config).await?;
        let mut scraper = NepseScraper::new(fetcher, &config);

        let result = scraper.fetch_company_list().await;
        if let Err(e) = scraper.close().await {
            warn!("Failed to close session: {}", e);
        }
        let companies = result?;

        if matches.is_present("json") {
            println!("{}", serde_json::to_string_pretty(&companies)?);
        } else {
            for company in &companies {
                println!("{:<12} {}", company.symbol, company.value);
            }
        }
    } else if let Some(matches) = matches.subcommand_matches("explore") {
        let symbol = matches.value_of("symbol").unwrap_or_default();
        let date_range = parse_date_range(matches)?;
        let rows_to_show = parse_number::<usize>(matches, "rows")?;

        // 公司编号不参与文件名
        let company = Company::new(symbol, "");
        let path = PathBuf::from(matches.value_of("output").unwrap_or("data"))
            .join(util::output_file_name(&company, &date_range));

        let (header, rows) = csv_utils::read_records_from_csv(&path)?;
        info!("{} ({}) - {} rows", symbol, date_range, rows.len());
        info!("{}", header.fields.join(" | "));
        info!("{:-<60}", "");
        for row in rows.iter().take(rows_to_show) {
            info!("{}", row.fields.join(" | "));
        }
        if rows.len() > rows_to_show {
            info!("... and {} more rows", rows.len() - rows_to_show);
        }
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(())
}

// 浏览器会话相关参数，scrape 与 list 共用
fn session_args<'a>() -> Vec<Arg<'a>> {
    vec![
        Arg::with_name("backend")
            .short('b')
            .long("backend")
            .value_name("BACKEND")
            .help("Page fetcher to use (chrome, http)")
            .takes_value(true)
            .possible_values(["chrome", "http"])
            .default_value("chrome"),
        Arg::with_name("chrome-path")
            .long("chrome-path")
            .value_name("PATH")
            .help("Path to the Chrome/Chromium executable")
            .takes_value(true),
        Arg::with_name("headful")
            .long("headful")
            .help("Show the browser window")
            .takes_value(false),
        Arg::with_name("page-load-timeout")
            .long("page-load-timeout")
            .value_name("SECONDS")
            .help("Maximum time for a page navigation")
            .takes_value(true)
            .default_value("300"),
        Arg::with_name("wait-timeout")
            .long("wait-timeout")
            .value_name("SECONDS")
            .help("Maximum time to wait for the price page marker element")
            .takes_value(true)
            .default_value("20"),
    ]
}

fn date_args(today: &str) -> Vec<Arg<'_>> {
    vec![
        Arg::with_name("start-date")
            .long("start-date")
            .value_name("DATE")
            .help("First trading date (YYYY-MM-DD)")
            .takes_value(true)
            .default_value("2000-01-01"),
        Arg::with_name("end-date")
            .long("end-date")
            .value_name("DATE")
            .help("Last trading date (YYYY-MM-DD)")
            .takes_value(true)
            .default_value(today),
    ]
}

fn output_arg<'a>() -> Arg<'a> {
    Arg::with_name("output")
        .short('o')
        .long("output")
        .value_name("DIR")
        .help("Directory for the CSV files")
        .takes_value(true)
        .default_value("data")
}

fn session_config(matches: &ArgMatches) -> Result<Config, Box<dyn Error>> {
    Ok(Config::new()
        .with_headless(!matches.is_present("headful"))
        .with_chrome_path(matches.value_of("chrome-path").map(str::to_string))
        .with_page_load_timeout(Duration::from_secs(parse_number(matches, "page-load-timeout")?))
        .with_element_wait_timeout(Duration::from_secs(parse_number(matches, "wait-timeout")?)))
}

async fn launch_fetcher(
    matches: &ArgMatches,
    config: &Config,
) -> Result<Box<dyn PageFetcher + Send + Sync>, Box<dyn Error>> {
    let fetcher: Box<dyn PageFetcher + Send + Sync> = match matches.value_of("backend").unwrap_or("chrome") {
        "http" => Box::new(HttpFetcher::new(config)?),
        _ => Box::new(ChromiumFetcher::launch(config).await?),
    };
    info!("Using {} backend", fetcher.backend_name());
    Ok(fetcher)
}

fn parse_date_range(matches: &ArgMatches) -> Result<DateRange, Box<dyn Error>> {
    let start = matches.value_of("start-date").unwrap_or("2000-01-01");
    let end = matches.value_of("end-date").unwrap_or_default();
    Ok(DateRange::parse(start, end)?)
}

fn parse_number<T>(matches: &ArgMatches, name: &str) -> Result<T, Box<dyn Error>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = matches.value_of(name).unwrap_or_default();
    raw.parse::<T>()
        .map_err(|e| format!("Invalid value for --{}: {} ({})", name, raw, e).into())
}
