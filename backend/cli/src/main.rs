mod config_cmd;
mod run_cmd;
mod terminal_output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "snaptext")]
#[command(about = "SnapText: a Telegram bot that reads the text in your photos")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot and long-poll Telegram until interrupted
    Run {
        /// Config file (default: $SNAPTEXT_CONFIG_DIR/config.yaml or ~/.snaptext/config.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate the config and print every problem found
    CheckConfig {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the effective config with secrets masked
    Config {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

fn config_path(flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| snaptext_config::config_file_path(&snaptext_config::config_dir()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => run_cmd::run(&config_path(config)).await,
        Commands::CheckConfig { config } => config_cmd::check(&config_path(config)).await,
        Commands::Config { config, format } => {
            config_cmd::show(&config_path(config), format).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["snaptext", "run", "--config", "/tmp/c.yaml"]).unwrap();
        assert!(matches!(cli.command, Commands::Run { config: Some(p) } if p == PathBuf::from("/tmp/c.yaml")));

        let cli = Cli::try_parse_from(["snaptext", "check-config"]).unwrap();
        assert!(matches!(cli.command, Commands::CheckConfig { config: None }));

        let cli = Cli::try_parse_from(["snaptext", "config", "--format", "json"]).unwrap();
        assert!(matches!(cli.command, Commands::Config { format: OutputFormat::Json, .. }));
    }

    #[test]
    fn explicit_config_path_wins() {
        let path = PathBuf::from("custom.yaml");
        assert_eq!(config_path(Some(path.clone())), path);
        assert!(config_path(None).ends_with("config.yaml"));
    }
}
