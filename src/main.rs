use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wallet_watch::{api, config, upstream::DuneClient};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // RUST_LOG=debug to see upstream calls and replay steps
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();

    info!("Wallet watch starting...");

    let cfg = config::load()?;
    info!("  Dune base URL: {}", cfg.dune_base_url);
    info!("  Chain id: {}", cfg.chain_id);
    info!("  Contract interactions query: {}", cfg.contract_query_id);
    info!("  Upstream timeout: {:?}", cfg.upstream_timeout);

    let source = Arc::new(DuneClient::new(&cfg)?);

    let api_handle = tokio::spawn({
        let cfg = cfg.clone();
        async move { api::serve(&cfg, source).await }
    });

    tokio::select! {
        res = api_handle => match res {
            Ok(Ok(_)) => info!("API exited cleanly"),
            Ok(Err(e)) => error!("API error: {:?}", e),
            Err(e) => error!("API task panicked: {:?}", e),
        },
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received, stopping...");
        }
    }

    info!("Wallet watch stopped.");
    Ok(())
}
