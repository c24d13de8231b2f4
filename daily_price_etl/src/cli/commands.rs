use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Fetch daily equity prices and append them to BigQuery"
)]
pub struct Cli {
    /// Load environment variables from this dotenv file before reading configuration
    #[arg(long, value_name = "FILE")]
    pub env_file: Option<PathBuf>,

    /// Fetch and transform, but log the rows instead of inserting them
    #[arg(long)]
    pub dry_run: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Loads `--env-file` into the process environment, or a `.env` in the
    /// working directory when it exists. Variables already set win.
    ///
    /// Must run before logging is installed so `RUST_LOG` from the file applies.
    pub fn load_env(&self) -> Result<(), dotenvy::Error> {
        match &self.env_file {
            Some(path) => dotenvy::from_path(path),
            None => {
                dotenvy::dotenv().ok();
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["daily-price-etl"]).unwrap();
        assert_eq!(cli.env_file, None);
        assert!(!cli.dry_run);
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn all_flags() {
        let cli = Cli::try_parse_from([
            "daily-price-etl",
            "--env-file",
            "/etc/etl.env",
            "--dry-run",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.env_file, Some(PathBuf::from("/etc/etl.env")));
        assert!(cli.dry_run);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn rejects_unknown_log_format() {
        assert!(Cli::try_parse_from(["daily-price-etl", "--log-format", "xml"]).is_err());
    }
}
