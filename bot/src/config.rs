use anyhow::{bail, Context, Result};
use hotmail007::{ClientConfig, DEFAULT_BASE_URL};
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_WORKERS: usize = 5;
const DEFAULT_QUANTITY: u32 = 1;
const DEFAULT_INTERVAL_MS: u64 = 200;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Settings every worker shares.
#[derive(Clone, Debug)]
pub(crate) struct WorkerConfig {
    pub client_key: String,
    /// Most mails bought in one purchase
    pub quantity: u32,
    /// Pause between the end of one cycle and the start of the next
    pub interval: Duration,
}

#[derive(Clone, Debug)]
pub(crate) struct Config {
    pub workers: usize,
    pub base_url: String,
    pub timeout: Duration,
    pub worker: WorkerConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let client_key = var("CLIENT_KEY").context("CLIENT_KEY not found in environment")?;

        let workers = parse(&var, "NUM_WORKERS", DEFAULT_WORKERS)?;
        let quantity = parse(&var, "QUANTITY", DEFAULT_QUANTITY)?;
        if workers == 0 {
            bail!("NUM_WORKERS must be at least 1");
        }
        if quantity == 0 {
            bail!("QUANTITY must be at least 1");
        }

        Ok(Self {
            workers,
            base_url: var("BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(parse(&var, "REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?),
            worker: WorkerConfig {
                client_key,
                quantity,
                interval: Duration::from_millis(parse(&var, "CHECK_INTERVAL_MS", DEFAULT_INTERVAL_MS)?),
            },
        })
    }

    /// Pool sized at two connections per worker.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            max_connections: self.workers * 2,
            timeout: self.timeout,
        }
    }
}

fn parse<T>(var: impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(name) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {name}: {value:?}")),
        None => Ok(default),
    }
}
