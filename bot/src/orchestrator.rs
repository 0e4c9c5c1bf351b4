use crate::config::Config;
use crate::worker::Worker;
use anyhow::Result;
use futures::future;
use hotmail007::HttpClient;
use log::{error, info};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Starts every worker on one shared client and waits until all of them stop.
/// Workers only stop once `cancel` fires.
pub(crate) async fn run(config: &Config, cancel: CancellationToken) -> Result<()> {
    info!(
        "Starting mail worker with {} concurrent workers",
        config.workers
    );

    let http = HttpClient::new(&config.client_config())?;
    let worker_config = Arc::new(config.worker.clone());

    let tasks: Vec<_> = (0..config.workers)
        .map(|id| {
            let worker = Worker::new(id, http.clone(), Arc::clone(&worker_config), cancel.clone());
            tokio::spawn(worker.run())
        })
        .collect();

    for (id, result) in future::join_all(tasks).await.into_iter().enumerate() {
        if let Err(e) = result {
            error!("Worker {id}: task failed: {e}");
        }
    }

    info!("All workers stopped");
    Ok(())
}
