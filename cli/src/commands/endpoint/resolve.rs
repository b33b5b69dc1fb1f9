//! # Catalink Resolve Handler
//!
//! File: cli/src/commands/endpoint/resolve.rs
//!
//! ## Overview
//!
//! Implements `catalink resolve`, the normal startup path: resolve synchronously,
//! publish the client, launch discovery in the background and print the endpoint
//! right away.
//!
//! Without `--wait` the process exits as soon as the endpoint and the probe's
//! status at that moment are printed, which abandons a probe that is still
//! waiting. With `--wait` the probe's outcome and
//! the endpoint in effect afterwards are printed as well.
//!
use crate::commands::CommandContext;
use crate::core::error::Result;
use crate::session::DiscoveryMode;
use clap::Parser;
use tracing::info;

/// # Resolve Arguments (`ResolveArgs`)
#[derive(Parser, Debug)]
#[command(about = "Resolve the active endpoint, discovering a newer one in the background")]
pub struct ResolveArgs {
    /// Do not launch the background discovery probe.
    #[arg(long)]
    no_discover: bool,

    /// Wait for the background probe to finish and report its outcome.
    #[arg(long, conflicts_with = "no_discover")]
    wait: bool,
}

/// # Handle Resolve Command (`handle_resolve`)
///
/// Prints the synchronously resolved endpoint and the probe's current status.
/// With `--wait`, waits for the probe instead and prints its final status and
/// the endpoint the factory holds afterwards.
///
/// ## Errors
///
/// Only session startup can fail; discovery outcomes are never errors.
pub async fn handle_resolve(args: ResolveArgs, ctx: &CommandContext) -> Result<()> {
    let mode = if args.no_discover {
        DiscoveryMode::Off
    } else {
        DiscoveryMode::Background
    };
    let session = ctx.start_session(mode)?;

    let client = session.factory().current();
    println!("endpoint:  {} ({})", client.endpoint(), client.source());

    if !args.wait {
        println!("discovery: {}", session.discovery().status());
        return Ok(());
    }

    let status = session.discovery().wait().await;
    info!("Discovery finished: {}", status);
    let client = session.factory().current();
    println!("discovery: {}", status);
    println!("endpoint:  {} ({})", client.endpoint(), client.source());
    Ok(())
}
