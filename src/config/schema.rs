use serde::Deserialize;
use std::path::PathBuf;

/// The TOML file structure for taskbridge.toml.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub exchange: Option<ExchangeConfig>,
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ExchangeConfig {
    pub prompt_dir: Option<String>,
    /// Append a correlation id to response file names.
    pub unique_response_names: Option<bool>,
    pub strict_validation: Option<bool>,
    pub journal: Option<bool>,
    pub spinner: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DefaultsConfig {
    pub num_tasks: Option<u32>,
    pub num_subtasks: Option<u32>,
}

impl ConfigFile {
    pub fn to_partial(self) -> PartialConfig {
        let exchange = self.exchange;
        let defaults = self.defaults;
        PartialConfig {
            prompt_dir: exchange
                .as_ref()
                .and_then(|e| e.prompt_dir.as_ref())
                .map(PathBuf::from),
            unique_response_names: exchange.as_ref().and_then(|e| e.unique_response_names),
            strict_validation: exchange.as_ref().and_then(|e| e.strict_validation),
            journal: exchange.as_ref().and_then(|e| e.journal),
            spinner: exchange.as_ref().and_then(|e| e.spinner),
            num_tasks: defaults.as_ref().and_then(|d| d.num_tasks),
            num_subtasks: defaults.as_ref().and_then(|d| d.num_subtasks),
        }
    }
}

/// Fully-resolved runtime configuration. All fields have values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Relative paths are resolved against the working directory.
    pub prompt_dir: PathBuf,
    pub unique_response_names: bool,
    pub strict_validation: bool,
    pub journal: bool,
    pub spinner: bool,
    pub num_tasks: u32,
    pub num_subtasks: u32,
}

/// Partial config used during merge. All fields are Option so that
/// missing fields don't override lower-priority values.
#[derive(Debug, Clone, Default)]
pub struct PartialConfig {
    pub prompt_dir: Option<PathBuf>,
    pub unique_response_names: Option<bool>,
    pub strict_validation: Option<bool>,
    pub journal: Option<bool>,
    pub spinner: Option<bool>,
    pub num_tasks: Option<u32>,
    pub num_subtasks: Option<u32>,
}
