use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use daily_price_etl::cli::{Cli, logging::init_tracing};
use daily_price_etl::config::EtlConfig;
use daily_price_etl::errors::Error;
use daily_price_etl::io::TableWriter;
use daily_price_etl::io::bigquery::{BigQueryWriter, TokenProvider};
use daily_price_etl::io::dry_run::LogOnlyWriter;
use daily_price_etl::pipeline::{Orchestrator, RunSummary};
use daily_price_etl::providers::alpha_vantage::AlphaVantageProvider;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let env_loaded = cli.load_env();
    init_tracing(cli.log_format);

    let result = match env_loaded {
        Ok(()) => run(&cli).await,
        Err(e) => Err(anyhow::Error::new(e).context(match &cli.env_file {
            Some(path) => format!("failed to load env file {}", path.display()),
            None => "failed to load .env".to_string(),
        })),
    };

    match result {
        Ok(summary) => {
            for outcome in &summary.outcomes {
                info!(
                    symbol = %outcome.symbol,
                    rows = outcome.rows_loaded,
                    attempts = outcome.attempts,
                    "symbol loaded"
                );
            }
            info!(
                symbols = summary.symbols_loaded(),
                rows = summary.total_rows(),
                retries = summary.total_retries(),
                "run complete"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            match err.downcast_ref::<Error>() {
                Some(etl) => error!(
                    kind = etl.kind(),
                    signal = etl.signal_kind().map(|k| k.as_str()),
                    error = %err,
                    "run failed"
                ),
                None => error!(kind = "internal", error = %format!("{err:#}"), "run failed"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<RunSummary> {
    let config = EtlConfig::from_env().map_err(Error::from)?;
    info!(
        symbols = config.symbols.len(),
        table = %config.store.table,
        output_size = %config.api.output_size,
        credentials = config.store.credentials.describe(),
        dry_run = cli.dry_run,
        "configuration loaded"
    );

    let writer: Box<dyn TableWriter> = if cli.dry_run {
        Box::new(LogOnlyWriter)
    } else {
        let tokens = TokenProvider::from_source(&config.store.credentials).map_err(Error::from)?;
        Box::new(
            BigQueryWriter::new(&config.store.api_url, tokens)
                .context("failed to build BigQuery client")?,
        )
    };

    let provider = AlphaVantageProvider::new(
        &config.api.base_url,
        config.api.api_key,
        config.api.output_size,
    )
    .context("failed to build Alpha Vantage client")?;

    let orchestrator =
        Orchestrator::new(&provider, writer.as_ref(), &config.store.table, config.policy);
    Ok(orchestrator.run(&config.symbols).await?)
}
