//! `schemacheck` - check a Postgres table's columns against a reference schema.

mod config;
mod error;
mod output;
mod plan;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::{Config, ConfigError};
use error::CliError;
use owo_colors::OwoColorize;
use plan::{CheckArgs, TargetArgs};
use schemacheck::{
    BlobStore, CatalogInspector, CompareOptions, Inspector, S3BlobStore, TracingDiagnostics,
    compare, parse_expected_schema, run_check,
};
use std::process::ExitCode;
use tokio_postgres::NoTls;

/// Exit code for a check that ran and found drift.
const EXIT_DRIFT: u8 = 2;

/// Detect column schema drift in Postgres tables.
#[derive(Parser, Debug)]
#[command(name = "schemacheck", version, about)]
struct Cli {
    /// Configuration file (default: .config/schemacheck.toml in this or any parent directory)
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare the live table against its expected schema
    Check(CheckArgs),

    /// Compare two schema documents offline and print the report
    Compare {
        /// Expected schema document
        expected: Utf8PathBuf,

        /// Actual schema document
        actual: Utf8PathBuf,

        /// Table name recorded in the report
        #[arg(long, default_value = "TABLE")]
        table: String,

        /// Also report columns that are not in the expected schema
        #[arg(long)]
        extra_columns: bool,
    },

    /// Print the live table's columns as an expected-schema document
    Snapshot {
        #[command(flatten)]
        target: TargetArgs,

        /// Write the document to this file instead of stdout
        #[arg(long)]
        output: Option<Utf8PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Check(args) => check(&args, &config).await,
        Commands::Compare {
            expected,
            actual,
            table,
            extra_columns,
        } => compare_files(&expected, &actual, &table, extra_columns, &config).await,
        Commands::Snapshot { target, output } => snapshot(&target, output, &config).await,
    }
}

/// An explicit `--config` must exist. A discovered one is optional.
fn load_config(path: Option<&Utf8Path>) -> Result<Config, CliError> {
    if let Some(path) = path {
        return Ok(config::load_file(path)?);
    }
    match config::load() {
        Ok((config, path)) => {
            tracing::debug!(path = %path, "loaded config");
            Ok(config)
        }
        Err(ConfigError::NotFound) => Ok(Config::default()),
        Err(e) => Err(e.into()),
    }
}

async fn connect(url: &str) -> Result<tokio_postgres::Client, CliError> {
    let (client, connection) = tokio_postgres::connect(url, NoTls)
        .await
        .map_err(schemacheck::Error::from)?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("database connection error: {}", e);
        }
    });

    Ok(client)
}

async fn check(args: &CheckArgs, config: &Config) -> Result<ExitCode, CliError> {
    let plan = plan::check_plan(args, config)?;
    let url = plan::database_url(
        args.target.database_url.as_deref(),
        config,
        std::env::var("DATABASE_URL").ok(),
    )?;

    let blobs = if plan.needs_blob_store() {
        Some(S3BlobStore::new(&plan::s3_settings(&config.blob_store))?)
    } else {
        None
    };

    let client = connect(&url).await?;
    let inspector = CatalogInspector::new(&client);

    let outcome = run_check(
        &plan,
        &inspector,
        blobs.as_ref().map(|b| b as &dyn BlobStore),
        &TracingDiagnostics,
    )
    .await?;

    output::print_report(&outcome.report);
    if let Some(stored) = &outcome.stored {
        output::print_stored(stored);
    }

    Ok(exit_code(outcome.report.is_pass()))
}

async fn compare_files(
    expected: &Utf8Path,
    actual: &Utf8Path,
    table: &str,
    extra_columns: bool,
    config: &Config,
) -> Result<ExitCode, CliError> {
    let expected = parse_expected_schema(&read(expected).await?)?;
    let actual = parse_expected_schema(&read(actual).await?)?;
    let options =
        CompareOptions::default().with_extra_columns(extra_columns || config.detect_extra_columns);

    let report = compare(table, &expected, &actual, &options, &TracingDiagnostics)?;
    println!("{}", report.to_json()?);

    Ok(exit_code(report.is_pass()))
}

async fn snapshot(
    args: &TargetArgs,
    output: Option<Utf8PathBuf>,
    config: &Config,
) -> Result<ExitCode, CliError> {
    let target = plan::target(args, config)?;
    let url = plan::database_url(
        args.database_url.as_deref(),
        config,
        std::env::var("DATABASE_URL").ok(),
    )?;

    let client = connect(&url).await?;
    let schema = CatalogInspector::new(&client)
        .inspect(&target, &TracingDiagnostics)
        .await?;
    let document = schema.to_json()?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, document)
                .await
                .map_err(|source| schemacheck::Error::Io {
                    path: path.clone(),
                    source,
                })?;
            println!("{} {} ({} columns)", "Wrote".green(), path, schema.len());
        }
        None => println!("{}", document),
    }

    Ok(ExitCode::SUCCESS)
}

async fn read(path: &Utf8Path) -> Result<Vec<u8>, CliError> {
    tokio::fs::read(path).await.map_err(|source| {
        schemacheck::Error::Io {
            path: path.to_owned(),
            source,
        }
        .into()
    })
}

fn exit_code(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_DRIFT)
    }
}
