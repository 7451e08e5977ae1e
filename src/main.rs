use anyhow::Result;
use tariffwatch::provider::{FeeScraper, SpotPriceClient, build_http_client};
use tariffwatch::sink::sink_from_config;
use tariffwatch::{Config, Scheduler, TariffAggregator, TariffStore};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    tariffwatch::logging::init_logging(&config.logging)?;
    info!("Tariffwatch {} starting up", env!("APP_VERSION"));

    let http = build_http_client(config.provider.request_timeout())?;
    let aggregator = TariffAggregator::new(
        Box::new(SpotPriceClient::new(http.clone(), &config.provider)),
        Box::new(FeeScraper::new(http, &config.provider)),
    );
    let store = Arc::new(TariffStore::new(aggregator));
    let sink = sink_from_config(&config.metrics)?;

    let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel::<()>();
    tokio::spawn(async move {
        wait_for_termination().await;
        let _ = shutdown_tx.send(());
    });

    Scheduler::from_config(store, sink, &config)
        .run(shutdown_rx)
        .await?;

    info!("Tariffwatch shutdown complete");
    Ok(())
}

/// Resolve on SIGINT, or SIGTERM where available
async fn wait_for_termination() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
                return;
            }
            Err(e) => warn!("Cannot listen for SIGTERM, using Ctrl-C only: {}", e),
        }
    }
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
