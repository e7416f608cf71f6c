use crate::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Check(#[from] schemacheck::Error),

    #[error("no {0} configured (set it in {file} or pass --{0})", file = crate::config::CONFIG_FILE)]
    MissingSetting(&'static str),

    #[error("no database URL configured (pass --database-url, set database_connection.url, or export DATABASE_URL)")]
    MissingDatabaseUrl,
}
