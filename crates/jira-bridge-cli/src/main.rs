//! jira-bridge CLI - runs the Jira MCP server.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use jira_bridge_core::Config;
use jira_bridge_jira::JiraClient;
use jira_bridge_mcp::{protocol::ToolsListResult, tools, McpServer};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jira-bridge")]
#[command(author, version, about = "MCP server for Jira Cloud", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: <config dir>/jira-bridge/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server on stdin/stdout (default)
    Serve,

    /// Print the tool definitions as JSON
    Tools,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration (token redacted)
    Show,

    /// Print the default config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the protocol, so logs go to stderr
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = load_config(cli.config.as_deref())?;
            let client = JiraClient::new(&config).context("Failed to create Jira client")?;
            tracing::info!(base_url = client.base_url(), "Jira client ready");

            let mut server = McpServer::new(Arc::new(client));
            server.run().await.context("MCP server failed")?;
        }
        Commands::Tools => {
            let list = ToolsListResult {
                tools: tools::definitions(),
            };
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let config = load_config(cli.config.as_deref())?;
                println!("{:#?}", config);
            }
            ConfigCommands::Path => {
                let path = Config::config_path().context("No config directory on this platform")?;
                println!("{}", path.display());
            }
        },
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Config::load().context("Failed to load configuration"),
    }
}
