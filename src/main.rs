// listscrape: scrape paginated search-result listings into a CSV or JSON table.
//
// Without --url the built-in vet directory run is used; without --column its
// column schema is used.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use listscrape::page_extractor::ColumnDef;
use listscrape::presets;
use listscrape::{
    ChromiumDriver, ColumnSpec, ConsentPolicy, ExportFormat, ListingScraper, ScrapeConfig,
    ScrapeReport, ScrapeResult,
};

#[derive(Debug, Parser)]
#[command(
    name = "listscrape",
    version,
    about = "Scrape paginated search-result listings into a table"
)]
struct Cli {
    /// JSON run description; replaces every run flag below except --output
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Search-results URL without query string
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Query parameter, in emission order (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_pair)]
    params: Vec<(String, String)>,

    /// Query parameter that carries the page number
    #[arg(long, value_name = "KEY")]
    page_key: Option<String>,

    /// Number of result pages to scrape
    #[arg(long, value_name = "N")]
    pages: Option<u32>,

    /// Output column as name=class or name=css:SELECTOR (repeatable)
    #[arg(long = "column", value_name = "NAME=SELECTOR", value_parser = parse_column)]
    columns: Vec<ColumnDef>,

    /// Keep sponsored entries
    #[arg(long, default_value_t = false)]
    no_ad_filter: bool,

    /// Class marking sponsored entries
    #[arg(long, value_name = "CLASS")]
    ad_class: Option<String>,

    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    #[arg(long, value_name = "CHAR")]
    delimiter: Option<char>,

    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Show the browser window
    #[arg(long, default_value_t = false)]
    headed: bool,

    /// Element lookup wait in seconds
    #[arg(long, value_name = "SECS")]
    wait_secs: Option<u64>,

    #[arg(long, value_enum)]
    consent: Option<ConsentArg>,

    /// Chrome/Chromium binary to use instead of discovery
    #[arg(long, value_name = "PATH")]
    chrome: Option<PathBuf>,

    /// Print the run report as JSON on stdout
    #[arg(long, default_value_t = false, action = ArgAction::SetTrue)]
    report: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum, PartialEq, Eq)]
enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => Self::Csv,
            FormatArg::Json => Self::Json,
        }
    }
}

#[derive(Debug, Copy, Clone, ValueEnum, PartialEq, Eq)]
enum ConsentArg {
    Required,
    BestEffort,
}

impl From<ConsentArg> for ConsentPolicy {
    fn from(arg: ConsentArg) -> Self {
        match arg {
            ConsentArg::Required => Self::Required,
            ConsentArg::BestEffort => Self::BestEffort,
        }
    }
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

fn parse_column(raw: &str) -> Result<ColumnDef, String> {
    let (name, selector) = parse_pair(raw)?;
    Ok(match selector.strip_prefix("css:") {
        Some(css) => ColumnDef::css(name, css),
        None => ColumnDef::class(name, selector),
    })
}

fn build_config(cli: &Cli) -> Result<ScrapeConfig> {
    if let Some(path) = &cli.config {
        let mut config = ScrapeConfig::from_json_file(path)?;
        if let Some(output) = &cli.output {
            config = config.with_output_path(output);
        }
        return Ok(config);
    }

    let columns = if cli.columns.is_empty() {
        presets::vet_directory_columns()?
    } else {
        ColumnSpec::new(cli.columns.clone())?
    };

    let mut builder = match &cli.url {
        Some(url) => ScrapeConfig::builder().base_url(url).columns(columns),
        None => presets::vet_directory_builder().columns(columns),
    };

    if !cli.params.is_empty() {
        builder = builder.query_params(cli.params.clone());
    }
    if let Some(key) = &cli.page_key {
        builder = builder.pagination_key(Some(key.clone()));
    }
    if let Some(pages) = cli.pages {
        builder = builder.page_end(pages);
    }
    if let Some(class) = &cli.ad_class {
        builder = builder.ad_class(class);
    }
    if let Some(output) = &cli.output {
        builder = builder.output_path(output);
    }
    if let Some(delimiter) = cli.delimiter {
        builder = builder.delimiter(delimiter);
    }
    if let Some(format) = cli.format {
        builder = builder.export_format(format.into());
    }
    if let Some(secs) = cli.wait_secs {
        builder = builder.implicit_wait_secs(secs);
    }
    if let Some(consent) = cli.consent {
        builder = builder.consent_policy(consent.into());
    }
    if let Some(chrome) = &cli.chrome {
        builder = builder.chrome_executable(chrome);
    }

    Ok(builder
        .filter_ads(!cli.no_ad_filter)
        .headless(!cli.headed)
        .build()?)
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = build_config(&cli)?;
    info!(
        "Scraping {} page(s) from {} into {}",
        config.page_end(),
        config.base_url(),
        config.output_path().display()
    );

    let driver = ChromiumDriver::launch(&config.launch_options())
        .await
        .context("Failed to start browser session")?;
    let mut scraper = ListingScraper::new(driver, config)?;

    let outcome = scraper.run().await;
    let has_rows = !scraper.table().is_empty();
    let report = settle_run(outcome, has_rows, || scraper.export())?;

    for failure in &report.failures {
        warn!("Page failed: {}", failure);
    }

    if cli.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    info!(
        "{} rows written ({} ads skipped, {} blank cells)",
        report.rows_collected(),
        report.ads_skipped(),
        report.blank_cells()
    );

    Ok(if report.is_complete() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

/// Export after a run and pick the error to surface.
///
/// A completed run is always exported. An aborted run is exported only when it
/// collected rows, and its own error wins over a failed partial export.
fn settle_run(
    outcome: ScrapeResult<ScrapeReport>,
    has_rows: bool,
    export: impl FnOnce() -> ScrapeResult<()>,
) -> Result<ScrapeReport> {
    match outcome {
        Ok(report) => {
            export()?;
            Ok(report)
        }
        Err(e) => {
            if has_rows {
                match export() {
                    Ok(()) => warn!("Wrote the rows collected before the run aborted"),
                    Err(export_err) => error!("Partial export failed: {export_err}"),
                }
            }
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
