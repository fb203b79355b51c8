use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "taskbridge",
    version,
    about = "Turn a PRD into dependency-ordered tasks through a file-based assistant handoff"
)]
pub struct Cli {
    /// Path to config file (overrides ./taskbridge.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory prompts and responses are exchanged through
    #[arg(long, global = true)]
    pub prompt_dir: Option<PathBuf>,

    /// Suffix response file names with a per-exchange id
    #[arg(long, global = true)]
    pub unique_names: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Break a PRD into a dependency-ordered task list
    ParsePrd {
        /// PRD file to read
        prd: PathBuf,

        /// Number of tasks to generate
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        num_tasks: Option<u32>,

        /// Write the task list here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Expand a task into subtasks
    Expand {
        /// Task list produced by parse-prd
        #[arg(short, long)]
        tasks: PathBuf,

        /// ID of the task to expand
        #[arg(long)]
        id: u32,

        /// Number of subtasks to generate
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        num: Option<u32>,

        /// ID of the first generated subtask
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        next_id: u32,

        /// Extra context for the assistant
        #[arg(long, default_value = "")]
        context: String,

        /// Run a research exchange first and use its findings
        #[arg(long)]
        research: bool,
    },
    /// Estimate the complexity of a task
    Analyze {
        /// Task list produced by parse-prd
        #[arg(short, long)]
        tasks: PathBuf,

        /// ID of the task to analyze
        #[arg(long)]
        id: u32,

        /// Run a research exchange first and use its findings
        #[arg(long)]
        research: bool,
    },
    /// Ask a research question
    Research {
        query: String,

        /// Extra context for the assistant
        #[arg(long, default_value = "")]
        context: String,
    },
}

impl Cli {
    pub fn num_tasks_override(&self) -> Option<u32> {
        match &self.command {
            Commands::ParsePrd { num_tasks, .. } => *num_tasks,
            _ => None,
        }
    }

    pub fn num_subtasks_override(&self) -> Option<u32> {
        match &self.command {
            Commands::Expand { num, .. } => *num,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_defaults() {
        let cli = Cli::parse_from(["taskbridge", "expand", "--tasks", "tasks.json", "--id", "3"]);
        match cli.command {
            Commands::Expand {
                id,
                num,
                next_id,
                context,
                research,
                ..
            } => {
                assert_eq!(id, 3);
                assert_eq!(num, None);
                assert_eq!(next_id, 1);
                assert!(context.is_empty());
                assert!(!research);
            }
            other => panic!("Expected Expand, got: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["taskbridge", "parse-prd", "prd.txt", "-n", "8", "--unique-names"]);
        assert!(cli.unique_names);
        assert_eq!(cli.num_tasks_override(), Some(8));
        assert_eq!(cli.num_subtasks_override(), None);
    }

    #[test]
    fn next_id_must_be_positive() {
        let parse = |next_id: &str| {
            Cli::try_parse_from([
                "taskbridge", "expand", "--tasks", "t.json", "--id", "1", "--next-id", next_id,
            ])
        };
        assert!(parse("0").is_err());
        assert!(parse("4294967295").is_ok());
    }

    #[test]
    fn positive_count_is_required_to_parse() {
        assert!(Cli::try_parse_from(["taskbridge", "parse-prd", "prd.txt", "-n", "0"]).is_err());
    }
}
