use std::sync::Arc;

use anyhow::Context;

use crate::cache::memory_backend::MemoryBackend;
use crate::clock::SystemClock;
use crate::config::Config;
use crate::metrics::Metrics;
use crate::resolver::BalanceResolver;
use crate::rpc_client::{HttpRpcClient, RPC_TIMEOUT};

const METRICS_PREFIX: &str = "eth_balance_api";

pub struct AppState {
    pub resolver: BalanceResolver,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let metrics =
            Arc::new(Metrics::new(METRICS_PREFIX).context("fail to register metrics")?);
        let rpc_client = HttpRpcClient::new(config.rpc_url.clone(), RPC_TIMEOUT)?;

        tracing::info!("Using in memory cache backend");

        let resolver = BalanceResolver::new(
            Arc::new(rpc_client),
            Arc::new(MemoryBackend::new()),
            Arc::new(SystemClock),
            config.cache_ttl,
            metrics.clone(),
        );

        Ok(Self { resolver, metrics })
    }
}
