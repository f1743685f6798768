use anyhow::Result;
use gapcex_rust_core::{ScanOptions, SourceTable, SpreadScanner};
use log::info;
use spread_scanner_rust::presentation::{banner, render_json, render_table};
use spread_scanner_rust::{OutputFormat, ProgressReporter, ScannerConfig};
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    info!("Starting gapcex...");

    let config = ScannerConfig::from_env()?;
    let mut table = SourceTable::builtin();
    if let Some(allow) = &config.sources {
        table.retain_only(allow);
    }

    info!(
        "Scanning {} assets quoted in {} against {} sources (timeout {}ms, rate limit {})",
        config.basket.len(),
        config.quote,
        table.len(),
        config.timeout_ms,
        config.rate_limit_enabled
    );

    if config.output == OutputFormat::Table {
        println!("{}", banner(config.basket.len(), table.len()));
    }

    let started = Instant::now();
    // Allow-list already applied to the table above
    let options = ScanOptions {
        sources: None,
        ..config.scan_options()
    };
    let scanner = SpreadScanner::new(options, table);

    let reporter = match config.output {
        OutputFormat::Table => Some(ProgressReporter::spawn(
            scanner.progress(),
            config.progress_interval(),
            started,
        )),
        OutputFormat::Json => None,
    };

    let result = scanner.run().await;
    if let Some(reporter) = reporter {
        reporter.finish().await;
    }
    let report = result?;

    match config.output {
        OutputFormat::Table => println!("{}", render_table(&report, config.top_n)),
        OutputFormat::Json => println!("{}", render_json(&report)?),
    }

    Ok(())
}
