//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{config_cmd, product, task, tui};
use crate::api::ApiClient;
use crate::config::{Config, API_URL_ENV};

#[derive(Parser)]
#[command(name = "td")]
#[command(author, version, about = "A terminal dashboard for a remote task service")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Base URL of the task service (overrides config file)
    #[arg(long, global = true, env = API_URL_ENV, value_name = "URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage tasks on the remote service
    #[command(subcommand)]
    Task(task::TaskCommands),

    /// Browse the product catalog
    #[command(subcommand)]
    Product(product::ProductCommands),

    /// Inspect or change the configuration
    #[command(subcommand)]
    Config(config_cmd::ConfigCommands),

    /// Open the interactive board
    Board {
        /// Initial view (tasks, products)
        #[arg(long, default_value = "tasks")]
        view: String,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("taskdeck CLI starting");

    let config = Config::load()?;
    let base_url = config.api_url_with_override(cli.api_url.as_deref());
    output.verbose_ctx("config", &format!("Using task service at: {}", base_url));

    match cli.command {
        Commands::Task(cmd) => {
            let client = ApiClient::new(base_url);
            task::run(cmd, &client, &output)?
        }

        Commands::Product(cmd) => product::run(cmd, &output)?,

        Commands::Config(cmd) => config_cmd::run(cmd, &config, &base_url, &output)?,

        Commands::Board { view } => {
            let client = ApiClient::new(base_url);
            tui::run(client, &output, &view)?
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskState;
    use clap::CommandFactory;

    #[test]
    fn cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_task_list_with_filters() {
        let cli = Cli::try_parse_from([
            "td",
            "task",
            "list",
            "--state",
            "in_progress",
            "--overdue",
        ])
        .unwrap();
        match cli.command {
            Commands::Task(task::TaskCommands::List {
                state,
                search,
                overdue,
            }) => {
                assert_eq!(state, Some(TaskState::InProgress));
                assert!(search.is_none());
                assert!(overdue);
            }
            _ => panic!("expected task list"),
        }
    }

    #[test]
    fn parses_block_with_two_ids() {
        let cli = Cli::try_parse_from(["td", "task", "block", "5", "9"]).unwrap();
        match cli.command {
            Commands::Task(task::TaskCommands::Block { task, blocker }) => {
                assert_eq!(task, 5);
                assert_eq!(blocker, 9);
            }
            _ => panic!("expected task block"),
        }
    }

    #[test]
    fn rejects_unknown_state_value() {
        let result = Cli::try_parse_from(["td", "task", "list", "--state", "later"]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_apply_after_subcommands() {
        let cli = Cli::try_parse_from(["td", "task", "list", "--format", "json", "-v"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
    }

    #[test]
    fn api_url_flag_is_global() {
        let cli = Cli::try_parse_from([
            "td",
            "task",
            "list",
            "--api-url",
            "http://localhost:9999",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:9999"));
    }

    #[test]
    fn board_defaults_to_tasks_view() {
        let cli = Cli::try_parse_from(["td", "board"]).unwrap();
        match cli.command {
            Commands::Board { view } => assert_eq!(view, "tasks"),
            _ => panic!("expected board"),
        }
    }
}
