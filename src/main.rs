//! Calendar tool gateway - main entry point.
//!
//! Loads configuration (file, then `GCAL_*` environment, then flags), wires
//! the credential broker, token resolver and dispatcher, and serves the
//! `tools` and `health` IPC services until Ctrl-C.

use clap::Parser;
use gcal_gateway::auth::{HttpCredentialBroker, TokenResolver};
use gcal_gateway::dispatch::{Dispatcher, ReqwestTransport};
use gcal_gateway::ipc::IpcServer;
use gcal_gateway::tools::builtin_catalog;
use gcal_gateway::Config;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// How often expired entries are swept from the credential cache.
const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Parser)]
#[command(name = "gcal-gateway", version, about = "Google Calendar tool gateway")]
struct Cli {
    /// JSON config file.
    #[arg(short, long, env = "GCAL_CONFIG")]
    config: Option<PathBuf>,

    /// IPC listen address, e.g. 127.0.0.1:50061.
    #[arg(long)]
    listen: Option<String>,

    /// Credential broker base URL.
    #[arg(long)]
    broker_url: Option<String>,

    /// Calendar API base URL.
    #[arg(long)]
    api_base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize observability
    gcal_gateway::observability::init_tracing();

    // Load configuration: file < environment < flags
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply_env();
    if let Some(listen) = cli.listen {
        config.server.listen_addr = listen;
    }
    if let Some(url) = cli.broker_url {
        config.broker.base_url = url;
    }
    if let Some(url) = cli.api_base_url {
        config.api.base_url = url;
    }
    config.validate()?;

    let catalog = Arc::new(builtin_catalog()?);
    let broker = Arc::new(HttpCredentialBroker::new(&config.broker)?);
    let resolver = TokenResolver::new(broker, &config.auth, catalog.required_scopes());
    let transport = Arc::new(ReqwestTransport::new(config.api.request_timeout)?);
    let dispatcher = Arc::new(Dispatcher::new(
        catalog,
        resolver.clone(),
        transport,
        &config.api.base_url,
    )?);

    let addr = config.server.listen_addr.parse()?;
    let server = IpcServer::new(dispatcher, addr, config.ipc.clone());
    let cancel = server.cancel_token();

    // Periodic cache sweep
    if resolver.cache().is_enabled() {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CACHE_PURGE_INTERVAL);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        let purged = resolver.cache().purge_expired().await;
                        if purged > 0 {
                            tracing::debug!("purged {} expired credentials", purged);
                        }
                    }
                }
            }
        });
    }

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, shutting down");
            cancel.cancel();
        }
    });

    tracing::info!(
        "gcal-gateway starting on {} (api={}, broker={}, connection={})",
        addr,
        config.api.base_url,
        config.broker.base_url,
        config.broker.connection,
    );
    server.serve().await?;

    Ok(())
}
