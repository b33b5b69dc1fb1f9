//! # Catalink Set-Endpoint Handler
//!
//! File: cli/src/commands/endpoint/set.rs
//!
//! ## Overview
//!
//! Implements `catalink set-endpoint <ENDPOINT>`: persists a manual override and
//! rebinds the client immediately, the same way a successful discovery does. In
//! an emulator environment the override is stored but the loopback alias stays
//! in effect.
//!
use crate::commands::CommandContext;
use crate::core::error::{CatalinkError, Result};
use crate::endpoint::Endpoint;
use crate::session::DiscoveryMode;
use clap::Parser;

/// # Set-Endpoint Arguments (`SetEndpointArgs`)
#[derive(Parser, Debug)]
#[command(about = "Persist an endpoint override and rebind the client")]
pub struct SetEndpointArgs {
    /// Base address of the catalog service, e.g. http://192.168.1.20:5000/
    endpoint: String,
}

/// # Handle Set-Endpoint Command (`handle_set_endpoint`)
///
/// Writes the override to the store and rebinds the client, exactly as a
/// successful discovery would. The printed endpoint is the one in effect
/// afterwards, which stays the emulator loopback in an emulator environment.
///
/// ## Arguments
///
/// * `args`: The address to persist. It is stored as given.
/// * `ctx`: Loaded configuration and store selection.
///
/// ## Errors
///
/// - `CatalinkError::Config` if the address is blank.
/// - Session startup failures.
///
/// A failed write to the preference file is logged, not returned.
pub async fn handle_set_endpoint(args: SetEndpointArgs, ctx: &CommandContext) -> Result<()> {
    let endpoint = Endpoint::from(args.endpoint);
    if endpoint.is_blank() {
        return Err(CatalinkError::Config("endpoint override cannot be blank".to_string()).into());
    }

    let session = ctx.start_session(DiscoveryMode::Off)?;
    let client = session.factory().set_override(endpoint.clone());

    println!("saved:     {}", endpoint);
    println!("endpoint:  {} ({})", client.endpoint(), client.source());
    Ok(())
}
