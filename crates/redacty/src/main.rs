//! redacty command-line interface

use anyhow::Result;
use clap::Parser;
use redacty_core::{
    open_database, AnonymizeConfig, Anonymizer, Config, PromptConfirmer, RunSummary, TableTarget,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Anonymize email addresses in a SQLite database.",
    long_about = None
)]
pub struct Args {
    #[arg(
        value_name = "DATABASE_URL",
        help = "SQLite database path (optionally prefixed with sqlite:)"
    )]
    pub url: String,

    #[arg(value_name = "TABLE", help = "Table holding the column to redact")]
    pub table: String,

    #[arg(value_name = "COLUMN", help = "Column holding the text to redact")]
    pub column: String,

    #[arg(
        short = 'a',
        long,
        value_name = "DAYS",
        allow_negative_numbers = true,
        help = "Minimum age of records to be anonymized in days [default: 0]"
    )]
    pub age: Option<i64>,

    #[arg(
        short = 'x',
        long,
        value_name = "DOMAIN",
        help = "Email domain to exclude from anonymization"
    )]
    pub exclude: Option<String>,

    #[arg(long, help = "Skip confirmation and proceed with the operation")]
    pub skip_confirm: bool,

    #[arg(long, default_value = "info", help = "Log level (error, warn, info, debug, trace)")]
    pub log_level: String,

    #[arg(long, help = "Path to configuration file")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Command-line values win over the configuration file.
    pub fn anonymize_config(&self, base: AnonymizeConfig) -> AnonymizeConfig {
        AnonymizeConfig {
            age_days: self.age.unwrap_or(base.age_days),
            exclude: self.exclude.clone().unwrap_or(base.exclude),
            skip_confirm: self.skip_confirm || base.skip_confirm,
        }
    }

    pub fn target(&self) -> TableTarget {
        TableTarget::new(self.table.clone(), self.column.clone())
    }
}

fn run(args: &Args) -> Result<RunSummary> {
    let config = Config::load(args.config.as_deref())?;
    let settings = args.anonymize_config(config.anonymize);
    let anonymizer = Anonymizer::new(args.target(), settings)?;

    let mut conn = open_database(&args.url)?;
    let outcome = anonymizer.run(&mut conn, &mut PromptConfirmer::stdin());

    if let Err((_, e)) = conn.close() {
        warn!("Failed to close database connection: {}", e);
    }

    Ok(outcome?)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = args.log_level.parse::<tracing::Level>()
        .unwrap_or_else(|_| {
            eprintln!("Invalid log level '{}', defaulting to 'info'", args.log_level);
            tracing::Level::INFO
        });

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting redacty");
    info!("Target: {}.{}", args.table, args.column);

    match run(&args) {
        Ok(summary) => {
            println!("{}", summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
