//! # Catalink Respond Handler
//!
//! File: cli/src/commands/respond.rs
//!
//! ## Overview
//!
//! Implements `catalink respond`, the server side of discovery. Run it on the
//! machine hosting the catalog service; clients on the same network that
//! broadcast a discovery request learn this machine's address.
//!
//! ```bash
//! # Advertise http://<lan-ip>:5000/ on the configured discovery port
//! catalink respond
//!
//! # Advertise an explicit address
//! catalink respond --advertise http://192.168.1.20:8080/
//! ```
//!
//! Runs until Ctrl+C (or SIGTERM on Unix).
//!
use crate::commands::CommandContext;
use crate::core::error::Result;
use crate::discovery::responder::{Advertisement, DiscoveryResponder};
use crate::endpoint::Endpoint;
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tracing::{error, info};

/// # Respond Arguments (`RespondArgs`)
#[derive(Parser, Debug)]
#[command(about = "Answer discovery requests with this machine's service address")]
pub struct RespondArgs {
    /// Interface to listen on.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    bind: IpAddr,

    /// Discovery port to listen on. Defaults to `discovery.port` from the config.
    #[arg(long, short)]
    port: Option<u16>,

    /// Port the catalog service listens on, used for the default advertised address.
    #[arg(long, default_value_t = 5000)]
    api_port: u16,

    /// Advertise this address instead of http://<lan-ip>:<api-port>/.
    #[arg(long)]
    advertise: Option<String>,
}

/// # Handle Respond Command (`handle_respond`)
///
/// Binds the discovery port and answers requests until Ctrl+C or SIGTERM.
/// Without `--advertise`, each reply carries `http://<lan-ip>:<api-port>/` with
/// the LAN address looked up again for every request.
///
/// ## Arguments
///
/// * `args`: Bind address, port overrides and the advertised address.
/// * `ctx`: Loaded configuration; `discovery.port`, `discovery.request` and
///   `discovery.reply_prefix` shape the exchange.
///
/// ## Errors
///
/// Returns an error if the socket cannot be created or bound (e.g. the port is
/// taken by a socket without address reuse, or needs privileges). Errors on
/// individual datagrams are logged and do not stop the responder.
pub async fn handle_respond(args: RespondArgs, ctx: &CommandContext) -> Result<()> {
    let port = args.port.unwrap_or(ctx.config.discovery.port);
    let advertisement = match args.advertise {
        Some(address) => Advertisement::Fixed(Endpoint::from(address)),
        None => Advertisement::Lan {
            api_port: args.api_port,
        },
    };
    let currently = advertisement.current();

    let responder = DiscoveryResponder::bind(
        SocketAddr::new(args.bind, port),
        &ctx.config.discovery,
        advertisement,
    )
    .await?;

    println!("Answering discovery requests on {}", responder.local_addr()?);
    println!("Advertising {}", currently);
    println!("Press Ctrl+C to stop.");

    responder.serve_until(shutdown_signal()).await
}

/// Resolves when Ctrl+C or (on Unix) SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received SIGTERM, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
