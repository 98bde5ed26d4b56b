use std::sync::Arc;

use anyhow::Result;
use axum::serve;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use wa_relay::{BridgeSessionClient, RelayConfig, RelayState, build_router};
use wa_relay_core::{InMemorySessionClient, SharedSessionClient};
use wa_relay_telemetry::install as init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let config = RelayConfig::parse();
    init_telemetry("wa-relay")?;

    let session: SharedSessionClient = if config.dry_run {
        warn!("dry run: messages are recorded in memory and never delivered");
        Arc::new(InMemorySessionClient::accepting_all())
    } else {
        Arc::new(BridgeSessionClient::from_config(&config)?)
    };

    let router = build_router(RelayState::from_config(&config, session.clone()));
    let listener = TcpListener::bind(config.bind).await?;
    info!("app running in port {}", config.bind.port());

    info!(bridge = %config.bridge_url, client_id = %config.client_id, "whatsapp is starting");
    tokio::spawn(async move {
        if let Err(err) = session.initialize().await {
            error!(error = %err, "whatsapp session failed to start");
        }
    });

    serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
