use std::io::Write;

use clap::Parser;
use daily_price_etl::cli::Cli;
use serial_test::serial;
use tempfile::NamedTempFile;

fn remove(name: &str) {
    // SAFETY: every test in this file is serialized.
    unsafe { std::env::remove_var(name) };
}

#[test]
#[serial]
fn env_file_is_loaded_including_the_log_filter() {
    remove("RUST_LOG");
    remove("DAILY_PRICE_ETL_ENV_FILE_MARKER");
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "RUST_LOG=daily_price_etl=debug").unwrap();
    writeln!(file, "DAILY_PRICE_ETL_ENV_FILE_MARKER=loaded").unwrap();

    let path = file.path().to_str().unwrap();
    let cli = Cli::try_parse_from(["daily-price-etl", "--env-file", path]).unwrap();
    cli.load_env().unwrap();

    assert_eq!(std::env::var("RUST_LOG").unwrap(), "daily_price_etl=debug");
    assert_eq!(
        std::env::var("DAILY_PRICE_ETL_ENV_FILE_MARKER").unwrap(),
        "loaded"
    );
    remove("RUST_LOG");
    remove("DAILY_PRICE_ETL_ENV_FILE_MARKER");
}

#[test]
#[serial]
fn missing_env_file_is_an_error() {
    let cli =
        Cli::try_parse_from(["daily-price-etl", "--env-file", "/nonexistent/etl.env"]).unwrap();
    assert!(cli.load_env().is_err());
}
