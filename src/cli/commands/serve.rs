//! Implementation of the `tally serve` command.

use anyhow::{anyhow, Result};
use clap::Args;
use tracing::info;

use super::build_engine;
use crate::adapters::http::{ReportsHttpConfig, ReportsHttpServer};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Host to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

pub async fn execute(args: ServeArgs, config: &Config) -> Result<()> {
    let mut http_config = ReportsHttpConfig::from(&config.server);
    if let Some(host) = args.host {
        http_config.host = host;
    }
    if let Some(port) = args.port {
        http_config.port = port;
    }

    let engine = build_engine(config).await?;
    let server = ReportsHttpServer::new(engine, http_config);

    server
        .serve_with_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .map_err(|e| anyhow!("HTTP server failed: {e}"))
}
