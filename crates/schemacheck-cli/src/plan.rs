//! Turn configuration plus command-line flags into a [`CheckPlan`].
//!
//! Flags take precedence over the config file. The database URL additionally
//! falls back to `DATABASE_URL`.

use crate::config::Config;
use crate::error::CliError;
use clap::Args;
use schemacheck::{
    BlobLocation, CheckPlan, CompareOptions, ResultDestination, S3Settings, SchemaSource,
    TableRef,
};
use schemacheck_config::{BlobStoreConfig, DestinationConfig, SourceConfig};

/// Flags identifying the live table.
#[derive(Args, Debug, Default, Clone)]
pub struct TargetArgs {
    /// Database (catalog) name
    #[arg(long)]
    pub database: Option<String>,

    /// Schema name
    #[arg(long)]
    pub schema: Option<String>,

    /// Table name
    #[arg(long)]
    pub table: Option<String>,

    /// Database connection URL
    #[arg(long)]
    pub database_url: Option<String>,
}

/// Flags for `schemacheck check`.
#[derive(Args, Debug, Default, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Expected schema document: a file path or s3://bucket/key
    #[arg(long)]
    pub expected: Option<String>,

    /// Where to store the report: a directory or s3://bucket/prefix
    #[arg(long)]
    pub output: Option<String>,

    /// Also report columns that are not in the expected schema
    #[arg(long)]
    pub extra_columns: bool,
}

pub fn check_plan(args: &CheckArgs, config: &Config) -> Result<CheckPlan, CliError> {
    Ok(CheckPlan {
        target: target(&args.target, config)?,
        source: source(args.expected.as_deref(), config)?,
        destination: destination(args.output.as_deref(), config)?,
        options: CompareOptions::default()
            .with_extra_columns(args.extra_columns || config.detect_extra_columns),
    })
}

pub fn target(args: &TargetArgs, config: &Config) -> Result<TableRef, CliError> {
    let pick = |flag: &Option<String>, configured: &Option<String>, name: &'static str| {
        flag.clone()
            .or_else(|| configured.clone())
            .ok_or(CliError::MissingSetting(name))
    };

    Ok(TableRef::new(
        pick(&args.database, &config.target.database, "database")?,
        pick(&args.schema, &config.target.schema, "schema")?,
        pick(&args.table, &config.target.table, "table")?,
    ))
}

fn source(flag: Option<&str>, config: &Config) -> Result<SchemaSource, CliError> {
    if let Some(flag) = flag {
        return Ok(flag.parse()?);
    }
    match &config.source {
        Some(SourceConfig::File { path }) => Ok(SchemaSource::File(path.clone())),
        Some(SourceConfig::BlobStore { bucket, key }) => Ok(SchemaSource::BlobStore(
            BlobLocation::new(bucket.as_str(), key.as_str()),
        )),
        None => Err(CliError::MissingSetting("expected")),
    }
}

fn destination(flag: Option<&str>, config: &Config) -> Result<Option<ResultDestination>, CliError> {
    if let Some(flag) = flag {
        return Ok(Some(flag.parse()?));
    }
    Ok(config.destination.as_ref().map(|d| match d {
        DestinationConfig::File { dir } => ResultDestination::Directory(dir.clone()),
        DestinationConfig::BlobStore { bucket, prefix } => ResultDestination::BlobStore {
            bucket: bucket.clone(),
            prefix: prefix.clone(),
        },
    }))
}

/// Flag, then config, then `env` (the value of `DATABASE_URL`).
pub fn database_url(
    flag: Option<&str>,
    config: &Config,
    env: Option<String>,
) -> Result<String, CliError> {
    flag.map(str::to_owned)
        .or_else(|| config.database_connection.url.clone())
        .or(env)
        .filter(|url| !url.is_empty())
        .ok_or(CliError::MissingDatabaseUrl)
}

pub fn s3_settings(config: &BlobStoreConfig) -> S3Settings {
    S3Settings {
        region: config.region.clone(),
        endpoint: config.endpoint.clone(),
        access_key: config.access_key.clone(),
        secret_key: config.secret_key.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        toml::from_str(
            r#"
            [target]
            database = "ANALYTICS"
            schema = "LANDING"
            table = "CT_COUNTRY"

            [source]
            kind = "blob-store"
            bucket = "athena-dwh-queries"
            key = "schemas/CT_COUNTRY.json"

            [destination]
            kind = "file"
            dir = "results"

            [database_connection]
            url = "postgres://from-config/analytics"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_plan_from_config() {
        let plan = check_plan(&CheckArgs::default(), &config()).unwrap();

        assert_eq!(plan.target, TableRef::new("ANALYTICS", "LANDING", "CT_COUNTRY"));
        assert_eq!(
            plan.source,
            SchemaSource::BlobStore(BlobLocation::new(
                "athena-dwh-queries",
                "schemas/CT_COUNTRY.json"
            ))
        );
        assert_eq!(
            plan.destination,
            Some(ResultDestination::Directory("results".into()))
        );
        assert!(!plan.options.detect_extra_columns);
    }

    #[test]
    fn test_flags_override_config() {
        let args = CheckArgs {
            target: TargetArgs {
                table: Some("CT_REGION".into()),
                ..Default::default()
            },
            expected: Some("local/CT_REGION.json".into()),
            output: Some("s3://checks/daily".into()),
            extra_columns: true,
        };
        let plan = check_plan(&args, &config()).unwrap();

        assert_eq!(plan.target.table, "CT_REGION");
        assert_eq!(plan.target.schema, "LANDING");
        assert_eq!(plan.source, SchemaSource::File("local/CT_REGION.json".into()));
        assert_eq!(
            plan.destination,
            Some(ResultDestination::BlobStore {
                bucket: "checks".into(),
                prefix: "daily".into()
            })
        );
        assert!(plan.options.detect_extra_columns);
    }

    #[test]
    fn test_missing_settings() {
        let err = check_plan(&CheckArgs::default(), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::MissingSetting("database")));

        let args = CheckArgs {
            target: TargetArgs {
                database: Some("A".into()),
                schema: Some("B".into()),
                table: Some("C".into()),
                database_url: None,
            },
            ..Default::default()
        };
        let err = check_plan(&args, &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::MissingSetting("expected")));

        let plan = check_plan(
            &CheckArgs {
                expected: Some("a.json".into()),
                ..args
            },
            &Config::default(),
        )
        .unwrap();
        assert_eq!(plan.destination, None);
    }

    #[test]
    fn test_database_url_precedence() {
        let env = || Some("postgres://from-env/db".to_string());

        assert_eq!(
            database_url(Some("postgres://flag/db"), &config(), env()).unwrap(),
            "postgres://flag/db"
        );
        assert_eq!(
            database_url(None, &config(), env()).unwrap(),
            "postgres://from-config/analytics"
        );
        assert_eq!(
            database_url(None, &Config::default(), env()).unwrap(),
            "postgres://from-env/db"
        );
        assert!(matches!(
            database_url(None, &Config::default(), None),
            Err(CliError::MissingDatabaseUrl)
        ));
    }

    #[test]
    fn test_invalid_blob_flag() {
        let args = CheckArgs {
            expected: Some("s3://bucket-only".into()),
            ..Default::default()
        };
        let err = source(args.expected.as_deref(), &config()).unwrap_err();
        assert!(matches!(
            err,
            CliError::Check(schemacheck::Error::InvalidBlobLocation(_))
        ));
    }
}
