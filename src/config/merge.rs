use super::schema::{AppConfig, PartialConfig};
use crate::error::ConfigError;
use crate::exchange::DEFAULT_PROMPT_DIR;
use std::path::PathBuf;

pub const DEFAULT_NUM_TASKS: u32 = 10;
pub const DEFAULT_NUM_SUBTASKS: u32 = 3;

impl PartialConfig {
    /// Merge self with a lower-priority fallback.
    /// Self's non-None values take precedence.
    pub fn with_fallback(self, fallback: PartialConfig) -> PartialConfig {
        PartialConfig {
            prompt_dir: self.prompt_dir.or(fallback.prompt_dir),
            unique_response_names: self
                .unique_response_names
                .or(fallback.unique_response_names),
            strict_validation: self.strict_validation.or(fallback.strict_validation),
            journal: self.journal.or(fallback.journal),
            spinner: self.spinner.or(fallback.spinner),
            num_tasks: self.num_tasks.or(fallback.num_tasks),
            num_subtasks: self.num_subtasks.or(fallback.num_subtasks),
        }
    }

    /// Convert to AppConfig, filling any remaining gaps with defaults.
    pub fn finalize(self) -> AppConfig {
        AppConfig {
            prompt_dir: self
                .prompt_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROMPT_DIR)),
            unique_response_names: self.unique_response_names.unwrap_or(false),
            strict_validation: self.strict_validation.unwrap_or(true),
            journal: self.journal.unwrap_or(true),
            spinner: self.spinner.unwrap_or(true),
            num_tasks: self.num_tasks.unwrap_or(DEFAULT_NUM_TASKS),
            num_subtasks: self.num_subtasks.unwrap_or(DEFAULT_NUM_SUBTASKS),
        }
    }
}

impl AppConfig {
    /// Reject values that pass TOML parsing but no exchange can use.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.num_tasks == 0 {
            return Err(ConfigError::InvalidValue {
                key: "defaults.num_tasks",
                message: "must be at least 1".to_string(),
            });
        }
        if self.num_subtasks == 0 {
            return Err(ConfigError::InvalidValue {
                key: "defaults.num_subtasks",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(self)
    }
}
