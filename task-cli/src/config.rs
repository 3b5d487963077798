use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::Level;

pub const CONFIG_FILE: &str = "task-cli.toml";
pub const DEFAULT_TASK_FILE: &str = "tasks.json";
pub const ENV_PREFIX: &str = "TASK_CLI";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Settings {
    /// Where the task collection is kept.
    pub file: PathBuf,
    pub log_level: String,
}

impl Settings {
    /// Defaults, then `task-cli.toml` in the working directory if present,
    /// then `TASK_CLI_*` environment variables.
    pub fn new() -> Result<Self> {
        Self::build(Path::new(CONFIG_FILE), config::Environment::with_prefix(ENV_PREFIX))
    }

    fn build(config_file: &Path, environment: config::Environment) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("file", DEFAULT_TASK_FILE)?
            .set_default("log_level", "warn")?
            .add_source(config::File::from(config_file).required(false))
            .add_source(environment)
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn level(&self) -> Result<Level> {
        self.log_level
            .parse()
            .map_err(|_| Error::Validation(format!("invalid log level '{}'", self.log_level)))
    }

    /// The configured level raised one step per `-v`, stopping at trace.
    pub fn effective_level(&self, verbose: u8) -> Result<Level> {
        let mut level = self.level()?;
        for _ in 0..verbose {
            level = match level {
                Level::ERROR => Level::WARN,
                Level::WARN => Level::INFO,
                Level::INFO => Level::DEBUG,
                _ => Level::TRACE,
            };
        }
        Ok(level)
    }
}
