//! CLI parser and dispatch.

mod check;
mod config_cmd;
mod extract_cmd;
mod state;
mod watch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "reportwatch")]
#[command(about = "Watch a scam-report listing and alert on fresh reports")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the listing until interrupted, alerting on fresh reports
    Watch {
        /// Expose the HTTP control surface
        #[arg(long)]
        serve: bool,
        /// Control surface address (port, host, or host:port)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Fetch and extract once without alerting or touching saved state
    Check,

    /// Extract items from a saved page
    Extract {
        /// HTML or text file to read
        file: PathBuf,
        /// Print items as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect or reset the dedup store
    State {
        #[command(subcommand)]
        command: StateCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum StateCommands {
    /// Show stored fingerprint count and last save time
    Show,
    /// Remove every stored fingerprint
    Clear {
        /// Confirm the reset
        #[arg(long)]
        confirm: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective settings with secrets masked
    Show,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let (settings, config) = load_settings_with_options(options).await?;

    match cli.command {
        Commands::Watch { serve, bind } => watch::cmd_watch(&settings, serve, bind.as_deref()).await,
        Commands::Check => check::cmd_check(&settings).await,
        Commands::Extract { file, json } => extract_cmd::cmd_extract(&settings, &file, json).await,
        Commands::State { command } => match command {
            StateCommands::Show => state::cmd_state_show(&settings).await,
            StateCommands::Clear { confirm } => state::cmd_state_clear(&settings, confirm).await,
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show => config_cmd::cmd_config_show(&settings, &config).await,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_watch_flags() {
        let cli = Cli::try_parse_from(["reportwatch", "-v", "watch", "--serve", "--bind", "9000"])
            .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Watch { serve, bind } => {
                assert!(serve);
                assert_eq!(bind.as_deref(), Some("9000"));
            }
            _ => panic!("expected watch"),
        }
    }

    #[test]
    fn test_state_clear_requires_flag_to_confirm() {
        let cli = Cli::try_parse_from(["reportwatch", "state", "clear"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::State {
                command: StateCommands::Clear { confirm: false }
            }
        ));
    }
}
