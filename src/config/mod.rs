pub mod merge;
pub mod schema;

pub use schema::*;

use crate::cli::Cli;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Project-level config file, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "taskbridge.toml";

/// Load configuration by merging global, project, and CLI sources.
/// Precedence: CLI > project config > global config > defaults.
///
/// Missing config files are handled gracefully (defaults apply), except for a
/// file named explicitly with `--config`, which must exist and parse.
pub fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    // Layer 1: Global config (~/.config/taskbridge/taskbridge.toml or platform equivalent)
    let global = load_global_config();

    // Layer 2: Project config (--config path, or ./taskbridge.toml)
    let project = match &cli.config {
        Some(path) => load_toml_file(path)?
            .ok_or_else(|| anyhow::anyhow!("Config file not found: {}", path.display()))?,
        None => load_optional(Path::new(PROJECT_CONFIG_FILE)),
    };

    // Layer 3: CLI args
    let config = cli_to_partial(cli)
        .with_fallback(project)
        .with_fallback(global)
        .finalize()
        .validate()?;

    Ok(config)
}

/// Load global config from the platform-specific config directory.
/// Returns empty PartialConfig if file not found.
fn load_global_config() -> PartialConfig {
    match global_config_path() {
        Some(p) => load_optional(&p),
        None => {
            tracing::debug!("Could not determine global config directory");
            PartialConfig::default()
        }
    }
}

/// Like [`load_toml_file`], but unreadable or invalid files only log a warning.
fn load_optional(path: &Path) -> PartialConfig {
    match load_toml_file(path) {
        Ok(partial) => partial.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Config error, skipping {}: {e}", path.display());
            PartialConfig::default()
        }
    }
}

/// Load and parse a TOML config file into a PartialConfig.
/// Returns `Ok(None)` if the file does not exist.
pub fn load_toml_file(path: &Path) -> Result<Option<PartialConfig>, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let config_file =
        toml::from_str::<ConfigFile>(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    tracing::info!("Loaded config from {}", path.display());
    Ok(Some(config_file.to_partial()))
}

/// Resolve the platform-specific global config path.
/// Linux: ~/.config/taskbridge/taskbridge.toml
/// macOS: ~/Library/Application Support/taskbridge/taskbridge.toml
fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "taskbridge")
        .map(|dirs| dirs.config_dir().join(PROJECT_CONFIG_FILE))
}

/// Convert global CLI flags to a PartialConfig for merging.
fn cli_to_partial(cli: &Cli) -> PartialConfig {
    PartialConfig {
        prompt_dir: cli.prompt_dir.clone(),
        unique_response_names: cli.unique_names.then_some(true),
        num_tasks: cli.num_tasks_override(),
        num_subtasks: cli.num_subtasks_override(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let result = load_toml_file(&tmp.path().join("nope.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn parses_both_sections() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(PROJECT_CONFIG_FILE);
        std::fs::write(
            &path,
            r#"
[exchange]
prompt_dir = "handoff"
unique_response_names = true
strict_validation = false

[defaults]
num_tasks = 12
"#,
        )
        .unwrap();

        let partial = load_toml_file(&path).unwrap().unwrap();
        assert_eq!(partial.prompt_dir, Some(PathBuf::from("handoff")));
        assert_eq!(partial.unique_response_names, Some(true));
        assert_eq!(partial.strict_validation, Some(false));
        assert_eq!(partial.num_tasks, Some(12));
        assert_eq!(partial.num_subtasks, None);
        assert_eq!(partial.journal, None);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "[exchange\nprompt_dir = ").unwrap();

        match load_toml_file(&path) {
            Err(ConfigError::ParseError { path: p, .. }) => assert_eq!(p, path),
            other => panic!("Expected ParseError, got: {other:?}"),
        }
    }

    #[test]
    fn explicit_config_overrides_defaults_and_cli_wins() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        std::fs::write(
            &path,
            "[exchange]\nprompt_dir = \"from-file\"\njournal = false\n",
        )
        .unwrap();

        let cli = Cli::parse_from([
            "taskbridge",
            "--config",
            path.to_str().unwrap(),
            "--prompt-dir",
            "from-cli",
            "research",
            "Q",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.prompt_dir, PathBuf::from("from-cli"));
        assert!(!config.journal);
    }

    #[test]
    fn zero_count_in_config_file_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("zero.toml");
        std::fs::write(&path, "[defaults]\nnum_subtasks = 0\n").unwrap();

        let cli = Cli::parse_from([
            "taskbridge",
            "--config",
            path.to_str().unwrap(),
            "expand",
            "--tasks",
            "tasks.json",
            "--id",
            "1",
        ]);
        let err = load_config(&cli).unwrap_err();
        assert!(err.to_string().contains("defaults.num_subtasks"), "{err}");
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("absent.toml");
        let cli = Cli::parse_from([
            "taskbridge",
            "--config",
            missing.to_str().unwrap(),
            "research",
            "Q",
        ]);
        assert!(load_config(&cli).is_err());
    }
}
