//! # Catalink Show Handler
//!
//! File: cli/src/commands/endpoint/show.rs
//!
//! ## Overview
//!
//! Implements `catalink show`: prints each resolution input and the resulting
//! endpoint. Performs no network I/O.
//!
use crate::commands::CommandContext;
use crate::core::error::Result;
use crate::session::DiscoveryMode;
use clap::Parser;

/// # Show Arguments (`ShowArgs`)
#[derive(Parser, Debug)]
#[command(about = "Show the resolution inputs and the effective endpoint")]
pub struct ShowArgs {}

/// # Handle Show Command (`handle_show`)
///
/// Never probes the network; fails only if the session cannot start.
pub async fn handle_show(_args: ShowArgs, ctx: &CommandContext) -> Result<()> {
    let session = ctx.start_session(DiscoveryMode::Off)?;
    let factory = session.factory();
    let inputs = factory.context();
    let client = factory.current();

    let identity = session.identity();
    println!(
        "platform:          {}/{}/{}",
        identity.brand, identity.product, identity.device
    );
    println!("emulator:          {}", inputs.is_emulator);
    println!(
        "persisted:         {}",
        inputs
            .persisted_endpoint
            .as_ref()
            .map_or_else(|| "(none)".to_string(), ToString::to_string)
    );
    println!("compiled default:  {}", inputs.compiled_default);
    println!("without override:  {}", factory.resolve_without_override());
    println!("store:             {}", ctx.store_location());
    println!("discovery target:  {}", ctx.config.discovery.target());
    println!("endpoint:          {} ({})", client.endpoint(), client.source());
    Ok(())
}
