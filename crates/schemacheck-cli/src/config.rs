//! Configuration file handling for schemacheck.
//!
//! Looks for `.config/schemacheck.toml` in the current directory or any parent directory.

pub use schemacheck_config::Config;

use camino::{Utf8Path, Utf8PathBuf};

/// Location of the config file relative to a project directory.
pub const CONFIG_FILE: &str = ".config/schemacheck.toml";

/// Load configuration from `.config/schemacheck.toml`, searching up the directory tree.
pub fn load() -> Result<(Config, Utf8PathBuf), ConfigError> {
    let cwd = std::env::current_dir().map_err(|e| ConfigError::Io(CONFIG_FILE.into(), e.to_string()))?;
    let cwd = Utf8PathBuf::try_from(cwd)
        .map_err(|e| ConfigError::Io(CONFIG_FILE.into(), e.to_string()))?;
    load_from(&cwd)
}

/// Load configuration starting from a specific directory.
pub fn load_from(start: &Utf8Path) -> Result<(Config, Utf8PathBuf), ConfigError> {
    let config_path = find_config_file(start)?;
    let config = load_file(&config_path)?;
    Ok((config, config_path))
}

/// Load a specific configuration file.
pub fn load_file(path: &Utf8Path) -> Result<Config, ConfigError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_owned(), e.to_string()))?;

    toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_owned(), e.to_string()))
}

/// Find `.config/schemacheck.toml` by searching up the directory tree.
fn find_config_file(start: &Utf8Path) -> Result<Utf8PathBuf, ConfigError> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(ConfigError::NotFound);
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// No `.config/schemacheck.toml` found in any parent directory
    NotFound,
    /// I/O error reading the file
    Io(Utf8PathBuf, String),
    /// Parse error in the TOML file
    Parse(Utf8PathBuf, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound => {
                write!(
                    f,
                    "No {} found in current directory or any parent",
                    CONFIG_FILE
                )
            }
            ConfigError::Io(path, e) => write!(f, "Failed to read {}: {}", path, e),
            ConfigError::Parse(path, e) => write!(f, "Failed to parse {}: {}", path, e),
        }
    }
}

impl std::error::Error for ConfigError {}
