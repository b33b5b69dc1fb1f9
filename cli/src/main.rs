//! # Catalink Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Catalink is a client for the item catalog service focused on one question:
//! which address should the HTTP layer talk to? This file handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Loading configuration and routing to the command handlers
//!
//! ## Architecture
//!
//! - `core`: configuration and error types
//! - `endpoint`: the endpoint model, environment classifier, override store and
//!   resolver
//! - `discovery`: the UDP broadcast probe and responder
//! - `http`: the factory publishing the active HTTP client
//! - `session`: startup wiring (resolve now, discover in the background)
//! - `commands`: one module per command
//!
//! ## Examples
//!
//! ```bash
//! # Print the endpoint the client would use right now
//! catalink show
//!
//! # Resolve and let background discovery finish, with debug logs
//! catalink -vv resolve --wait
//! ```
//!
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod core;
mod discovery;
mod endpoint;
mod http;
mod session;

/// Defines the top-level command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "catalink",
    about = "Catalink: endpoint discovery and resolution for the item catalog client",
    long_about = "Resolves the catalog service address from the environment, a persisted\n\
                  override and the compiled default, and discovers newer addresses over\n\
                  UDP broadcast on the local network.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Configuration file to use instead of the user config.toml.
    #[arg(long, global = true, env = "CATALINK_CONFIG")]
    config: Option<PathBuf>,
    /// Keep endpoint overrides in memory for this run only.
    #[arg(long, global = true)]
    ephemeral: bool,
}

/// Enum defining all available top-level commands.
#[derive(Parser, Debug)]
enum Commands {
    Resolve(commands::endpoint::ResolveArgs),
    Discover(commands::endpoint::DiscoverArgs),
    SetEndpoint(commands::endpoint::SetEndpointArgs),
    Show(commands::endpoint::ShowArgs),
    Ping(commands::ping::PingArgs),
    Respond(commands::respond::RespondArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = run(cli).await;

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> crate::core::error::Result<()> {
    let ctx = commands::CommandContext {
        config: crate::core::config::load_config(cli.config.as_deref())?,
        ephemeral: cli.ephemeral,
    };

    match cli.command {
        Commands::Resolve(args) => commands::endpoint::handle_resolve(args, &ctx).await,
        Commands::Discover(args) => commands::endpoint::handle_discover(args, &ctx).await,
        Commands::SetEndpoint(args) => commands::endpoint::handle_set_endpoint(args, &ctx).await,
        Commands::Show(args) => commands::endpoint::handle_show(args, &ctx).await,
        Commands::Ping(args) => commands::ping::handle_ping(args, &ctx).await,
        Commands::Respond(args) => commands::respond::handle_respond(args, &ctx).await,
    }
}
