//! # Catalink Ping Handler
//!
//! File: cli/src/commands/ping.rs
//!
//! ## Overview
//!
//! Implements `catalink ping`, a minimal consumer of the active client: it starts
//! the endpoint subsystem the way the app does (background discovery included),
//! fetches the client published at call time and issues `GET /` against it. The
//! catalog service answers with a small JSON index document, which is printed.
//!
use crate::commands::CommandContext;
use crate::core::error::Result;
use crate::session::DiscoveryMode;
use anyhow::Context;
use clap::Parser;
use tracing::info;

/// # Ping Arguments (`PingArgs`)
#[derive(Parser, Debug)]
#[command(about = "Request the service index through the active client")]
pub struct PingArgs {
    /// Path to request, relative to the endpoint.
    #[arg(default_value = "")]
    path: String,

    /// Do not launch the background discovery probe.
    #[arg(long)]
    no_discover: bool,
}

/// # Handle Ping Command (`handle_ping`)
///
/// Starts a session (with background discovery unless `--no-discover`), issues
/// `GET <endpoint>/<path>` through `factory().current()` and pretty-prints the
/// JSON body to stdout.
///
/// ## Arguments
///
/// * `args`: The request path and the `--no-discover` flag.
/// * `ctx`: Loaded configuration and store selection.
///
/// ## Returns
///
/// * `Result<()>`: `Ok(())` once the body has been printed.
///
/// ## Errors
///
/// Unlike discovery, HTTP failures are returned to the caller:
/// - The request cannot be sent or times out (`CatalinkError::Http`).
/// - The service answers with a non-success status.
/// - The body is not JSON.
pub async fn handle_ping(args: PingArgs, ctx: &CommandContext) -> Result<()> {
    let mode = if args.no_discover {
        DiscoveryMode::Off
    } else {
        DiscoveryMode::Background
    };
    let session = ctx.start_session(mode)?;

    let client = session.factory().current();
    info!("Requesting '{}' from {}", args.path, client.endpoint());
    let body = client.get_json(&args.path).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&body).context("Failed to format response body")?
    );
    Ok(())
}
