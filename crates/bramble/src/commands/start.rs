//! Start command - launches the Bramble server.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;

use bramble_config::{ServerSection, SessionSection};
use bramble_server::{Server, ServerConfig};
use bramble_session::{Manager, ManagerConfig, ProviderRegistry};

use super::Context;

/// Arguments for the start command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<IpAddr>,
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    let loaded = &ctx.config;

    if ctx.verbose {
        let sources = loaded.loaded_from();
        if sources.is_empty() {
            println!("No config files found, using defaults + CLI args");
        } else {
            for source in sources {
                println!("Loaded config: {}", source.display());
            }
        }
    }

    // ── Sessions ────────────────────────────────────────────────────────

    let session_section = loaded.config.session();
    let registry = ProviderRegistry::with_builtin();
    let sessions = Arc::new(
        Manager::new(&registry, manager_config(&session_section))
            .with_context(|| format!("session provider '{}'", session_section.provider))?,
    );
    let gc = sessions.spawn_gc();

    if ctx.verbose {
        println!(
            "Sessions: provider={} cookie={} lifetime={}s",
            session_section.provider,
            session_section.cookie_name,
            session_section.max_lifetime_secs
        );
    }

    // ── Server ──────────────────────────────────────────────────────────

    let server_config = server_config(&loaded.config.server(), &args)?;
    let addr = server_config.bind_address;
    if ctx.verbose {
        println!("Bind address: {}", addr);
        println!("Upload dir: {}", server_config.upload_dir.display());
    }

    let server = Server::new(server_config, sessions);
    println!("Bramble listening on http://{}", addr);

    let result = server.run_until(shutdown_signal()).await;

    // Stop sweeping once the server has drained.
    gc.shutdown().await;
    result?;

    Ok(())
}

fn manager_config(section: &SessionSection) -> ManagerConfig {
    let config = ManagerConfig::new()
        .with_provider(section.provider.clone())
        .with_cookie_name(section.cookie_name.clone())
        .with_max_lifetime(section.max_lifetime());

    match section.gc_interval() {
        Some(interval) => config.with_gc_interval(interval),
        None => config,
    }
}

fn server_config(section: &ServerSection, args: &StartArgs) -> Result<ServerConfig> {
    let mut addr: SocketAddr = section.socket_addr()?;
    if let Some(bind) = args.bind {
        addr.set_ip(bind);
    }
    if let Some(port) = args.port {
        addr.set_port(port);
    }

    Ok(ServerConfig::new()
        .with_bind_address(addr)
        .with_request_timeout(section.request_timeout())
        .with_request_logging(section.request_logging)
        .with_upload_dir(section.upload_dir.clone())
        .with_max_upload_bytes(section.max_upload_bytes))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown requested"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
    }
}
