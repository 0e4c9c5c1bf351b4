use crate::config::WorkerConfig;
use hotmail007::HttpClient;
use log::{debug, error, info};
use serde_json::Value;
use std::sync::Arc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// How many mails to buy given the configured cap and the current stock.
/// `None` means there is nothing to buy.
pub(crate) fn purchase_quantity(max: u32, stock: u32) -> Option<u32> {
    match max.min(stock) {
        0 => None,
        quantity => Some(quantity),
    }
}

/// One poll-and-buy loop. Workers never coordinate, so several of them can
/// buy against the same stock in the same interval.
pub(crate) struct Worker {
    id: usize,
    http: HttpClient,
    config: Arc<WorkerConfig>,
    cancel: CancellationToken,
}

impl Worker {
    pub fn new(
        id: usize,
        http: HttpClient,
        config: Arc<WorkerConfig>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            http,
            config,
            cancel,
        }
    }

    /// Runs cycles until the token is cancelled. An in-flight request or sleep
    /// is abandoned as soon as that happens.
    pub async fn run(self) {
        debug!("Worker {}: started", self.id);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = self.cycle() => {}
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = sleep(self.config.interval) => {}
            }
        }

        info!("Worker {}: stopped", self.id);
    }

    async fn cycle(&self) {
        let stock = self.check_stock().await;

        if let Some(quantity) = purchase_quantity(self.config.quantity, stock) {
            info!(
                "Worker {}: Stock available ({stock}), attempting to buy...",
                self.id
            );
            self.buy(quantity).await;
        }
    }

    /// Current stock, or zero when it could not be read.
    pub async fn check_stock(&self) -> u32 {
        match self.http.fetch_stock().await {
            Ok(stock) => {
                info!("Worker {}: Stock checked - {stock}", self.id);
                stock
            }
            Err(e) => {
                error!("Worker {}: Error checking stock: {e}", self.id);
                0
            }
        }
    }

    pub async fn buy(&self, quantity: u32) -> Option<Value> {
        match self
            .http
            .buy_mails(&self.config.client_key, quantity)
            .await
        {
            Ok(data) => {
                info!("Successfully bought {quantity} mails: {data}");
                Some(data)
            }
            Err(e) => {
                error!("Error buying mails: {e}");
                None
            }
        }
    }
}
