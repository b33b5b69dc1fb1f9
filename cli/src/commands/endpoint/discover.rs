//! # Catalink Discover Handler
//!
//! File: cli/src/commands/endpoint/discover.rs
//!
//! ## Overview
//!
//! Implements `catalink discover`: one discovery exchange run in the foreground.
//! A successful reply is persisted and rebinds the client exactly like the
//! background path. Failures are reported, not raised; the command succeeds either
//! way because discovery is advisory.
//!
use crate::commands::CommandContext;
use crate::core::error::Result;
use crate::discovery::probe::DiscoveryProbe;
use crate::discovery::DiscoveryStatus;
use crate::session::DiscoveryMode;
use clap::Parser;
use tracing::debug;

/// # Discover Arguments (`DiscoverArgs`)
#[derive(Parser, Debug)]
#[command(about = "Broadcast one discovery request and apply the reply")]
pub struct DiscoverArgs {
    /// Override the receive budget in milliseconds.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=10_000))]
    timeout_ms: Option<u64>,
}

/// # Handle Discover Command (`handle_discover`)
///
/// Runs one probe in the foreground and prints its status together with the
/// endpoint in effect afterwards. In an emulator environment no datagram is
/// sent and the status is `skipped`.
///
/// ## Arguments
///
/// * `args`: Optional `--timeout-ms` replacing `discovery.timeout_ms`.
/// * `ctx`: Loaded configuration and store selection.
///
/// ## Returns
///
/// * `Result<()>`: `Ok(())` whatever the probe outcome; a timeout or rejected
///   reply is reported on stdout, not as an error.
///
/// ## Errors
///
/// Only session startup can fail, i.e. the HTTP client cannot be built.
pub async fn handle_discover(args: DiscoverArgs, ctx: &CommandContext) -> Result<()> {
    let session = ctx.start_session(DiscoveryMode::Off)?;
    let factory = session.factory();

    let status = if factory.is_emulator() {
        debug!("Not probing from an emulator environment");
        DiscoveryStatus::Skipped
    } else {
        let mut config = ctx.config.discovery.clone();
        if let Some(timeout_ms) = args.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        debug!("Probing {} with a {} ms budget", config.target(), config.timeout_ms);
        DiscoveryProbe::new(config).run(factory).await
    };

    let client = factory.current();
    println!("discovery: {}", status);
    println!("endpoint:  {} ({})", client.endpoint(), client.source());
    Ok(())
}
