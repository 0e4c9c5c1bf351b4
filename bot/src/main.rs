mod config;
mod orchestrator;
mod worker;

use anyhow::Result;
use config::Config;
use log::{error, info};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let logging = common::setup_env()?;
    let config = Config::from_env()?;

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_on_ctrl_c(cancel.clone()));

    orchestrator::run(&config, cancel).await?;

    logging.flush();
    Ok(())
}

async fn shutdown_on_ctrl_c(cancel: CancellationToken) {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        return;
    }

    info!("Shutdown signal received, stopping workers");
    cancel.cancel();
}
