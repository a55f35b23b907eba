use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::U256;
use serde::Serialize;
use serde_json::{json, Value};

use crate::address::{self, InvalidAddress};
use crate::cache::{CacheBackend, CacheStatus};
use crate::clock::Clock;
use crate::metrics::Metrics;
use crate::rpc_client::{RpcTransport, UpstreamError};
use crate::units;

pub const NETWORK: &str = "mainnet";
pub const BLOCK_TAG: &str = "latest";

const GET_BALANCE_REQUEST_ID: u64 = 1;
const BLOCK_NUMBER_REQUEST_ID: u64 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub address: String,
    pub network: String,
    pub block_tag: String,
    /// Whole ether, exact decimal.
    pub balance: String,
    pub balance_wei: String,
    pub head_block_number: Option<String>,
}

impl BalanceResponse {
    fn new(address: String, wei: U256, head_block_number: Option<String>) -> Self {
        Self {
            address,
            network: NETWORK.to_string(),
            block_tag: BLOCK_TAG.to_string(),
            balance: units::format_wei_to_ether(wei),
            balance_wei: wei.to_string(),
            head_block_number,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidAddress),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Validates an address, answers from the cache when it can and otherwise
/// asks the upstream provider for the balance and the head block.
pub struct BalanceResolver {
    rpc: Arc<dyn RpcTransport>,
    cache: Arc<dyn CacheBackend>,
    clock: Arc<dyn Clock>,
    cache_ttl: Duration,
    metrics: Arc<Metrics>,
}

impl BalanceResolver {
    pub fn new(
        rpc: Arc<dyn RpcTransport>,
        cache: Arc<dyn CacheBackend>,
        clock: Arc<dyn Clock>,
        cache_ttl: Duration,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            rpc,
            cache,
            clock,
            cache_ttl,
            metrics,
        }
    }

    pub async fn resolve(&self, raw_address: &str) -> Result<BalanceResponse, ResolveError> {
        let address = address::validate(raw_address)?.to_checksum(None);

        match self.cache.read(&address, self.clock.now())? {
            CacheStatus::Cached(response) => {
                tracing::info!("cache hit for {}", address);
                self.metrics.cache_hit_counter.inc();
                return Ok(response);
            }
            CacheStatus::Expired => {
                tracing::info!("cache expired for {}", address);
                self.metrics.cache_expired_miss_counter.inc();
                self.metrics.cache_miss_counter.inc();
            }
            CacheStatus::Missed => {
                tracing::info!("cache missed for {}", address);
                self.metrics.cache_miss_counter.inc();
            }
        }

        let wei = self.fetch_balance(&address).await.map_err(|err| {
            tracing::error!("fail to fetch balance of {address}: {err}");
            self.metrics.upstream_error_counter.inc();
            err
        })?;

        let head_block_number = self.fetch_head_block_number().await;

        let response = BalanceResponse::new(address.clone(), wei, head_block_number);
        self.cache
            .write(&address, response.clone(), self.clock.now(), self.cache_ttl)?;

        Ok(response)
    }

    async fn fetch_balance(&self, address: &str) -> Result<U256, UpstreamError> {
        let result = self
            .rpc
            .call(
                "eth_getBalance",
                json!([address, BLOCK_TAG]),
                GET_BALANCE_REQUEST_ID,
            )
            .await?;

        result
            .as_str()
            .and_then(units::parse_hex_quantity)
            .ok_or(UpstreamError::MalformedResponse)
    }

    // Best effort: the head block only enriches the response.
    async fn fetch_head_block_number(&self) -> Option<String> {
        let result = self
            .rpc
            .call("eth_blockNumber", json!([]), BLOCK_NUMBER_REQUEST_ID)
            .await;

        let reason = match result {
            Ok(Value::String(head)) if !head.is_empty() => return Some(head),
            Ok(other) => format!("unexpected result {other}"),
            Err(err) => err.to_string(),
        };

        tracing::warn!("fail to fetch head block number, returning null: {reason}");
        self.metrics.head_block_failure_counter.inc();
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cache::memory_backend::MemoryBackend;
    use crate::clock::ManualClock;
    use crate::rpc_client::mock::{MockTransport, Reply};

    const ADDRESS: &str = "0x000000000000000000000000000000000000dEaD";
    const TTL: Duration = Duration::from_secs(5);

    struct Fixture {
        resolver: BalanceResolver,
        rpc: Arc<MockTransport>,
        clock: Arc<ManualClock>,
        metrics: Arc<Metrics>,
    }

    fn fixture(reply: Reply) -> Fixture {
        let rpc = Arc::new(MockTransport::new(reply));
        let clock = Arc::new(ManualClock::new());
        let metrics = Arc::new(Metrics::new("test").unwrap());

        let resolver = BalanceResolver::new(
            rpc.clone(),
            Arc::new(MemoryBackend::new()),
            clock.clone(),
            TTL,
            metrics.clone(),
        );

        Fixture {
            resolver,
            rpc,
            clock,
            metrics,
        }
    }

    fn one_ether(method: &str) -> Result<Value, UpstreamError> {
        match method {
            "eth_getBalance" => Ok(json!("0xde0b6b3a7640000")),
            "eth_blockNumber" => Ok(json!("0x12d687")),
            _ => unreachable!(),
        }
    }

    #[actix_web::test]
    async fn test_resolve() {
        let f = fixture(one_ether);

        let response = f.resolver.resolve(ADDRESS).await.unwrap();

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "address": ADDRESS,
                "network": "mainnet",
                "blockTag": "latest",
                "balance": "1",
                "balanceWei": "1000000000000000000",
                "headBlockNumber": "0x12d687",
            })
        );

        assert_eq!(
            f.rpc.calls(),
            vec![
                ("eth_getBalance".to_string(), json!([ADDRESS, "latest"]), 1),
                ("eth_blockNumber".to_string(), json!([]), 2),
            ]
        );
    }

    #[actix_web::test]
    async fn test_fractional_balance() {
        let f = fixture(|method| match method {
            // 1.5 ether
            "eth_getBalance" => Ok(json!("0x14d1120d7b160000")),
            _ => Ok(json!("0x1")),
        });

        let response = f.resolver.resolve(ADDRESS).await.unwrap();
        assert_eq!(response.balance, "1.5");
        assert_eq!(response.balance_wei, "1500000000000000000");
    }

    #[actix_web::test]
    async fn test_invalid_address_skips_upstream() {
        let f = fixture(one_ether);

        for raw in [
            "000000000000000000000000000000000000dEaD",
            "0x000000000000000000000000000000000000dead",
            "0x0000000000000000000000000000000000dEaD",
        ] {
            assert!(matches!(
                f.resolver.resolve(raw).await,
                Err(ResolveError::InvalidInput(_))
            ));
        }

        assert_eq!(f.rpc.call_count(), 0);
    }

    #[actix_web::test]
    async fn test_cache_hit_within_ttl() {
        let f = fixture(one_ether);

        let first = f.resolver.resolve(ADDRESS).await.unwrap();
        f.clock.advance(Duration::from_secs(4));
        let second = f.resolver.resolve(ADDRESS).await.unwrap();

        assert_eq!(f.rpc.call_count(), 2);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
        assert_eq!(f.metrics.cache_hit_counter.get(), 1.0);
        assert_eq!(f.metrics.cache_miss_counter.get(), 1.0);
    }

    #[actix_web::test]
    async fn test_cache_miss_after_ttl() {
        let f = fixture(one_ether);

        f.resolver.resolve(ADDRESS).await.unwrap();
        f.clock.advance(Duration::from_secs(6));
        f.resolver.resolve(ADDRESS).await.unwrap();

        assert_eq!(f.rpc.call_count(), 4);
        assert_eq!(f.metrics.cache_expired_miss_counter.get(), 1.0);
        assert_eq!(f.metrics.cache_miss_counter.get(), 2.0);
    }

    #[actix_web::test]
    async fn test_head_block_failure_is_swallowed() {
        let f = fixture(|method| match method {
            "eth_getBalance" => Ok(json!("0xde0b6b3a7640000")),
            _ => Err(UpstreamError::Transport(anyhow::anyhow!("connection reset"))),
        });

        let response = f.resolver.resolve(ADDRESS).await.unwrap();
        assert_eq!(response.head_block_number, None);
        assert_eq!(
            serde_json::to_value(&response).unwrap()["headBlockNumber"],
            Value::Null
        );
        assert_eq!(f.metrics.head_block_failure_counter.get(), 1.0);
    }

    #[actix_web::test]
    async fn test_head_block_non_string_is_null() {
        let f = fixture(|method| match method {
            "eth_getBalance" => Ok(json!("0x1")),
            _ => Ok(json!(1234)),
        });

        let response = f.resolver.resolve(ADDRESS).await.unwrap();
        assert_eq!(response.head_block_number, None);
        assert_eq!(response.balance, "0.000000000000000001");
    }

    #[actix_web::test]
    async fn test_upstream_rpc_error() {
        let f = fixture(|_| {
            Err(UpstreamError::Rpc(
                json!({"code": -32000, "message": "header not found"}),
            ))
        });

        match f.resolver.resolve(ADDRESS).await {
            Err(ResolveError::Upstream(UpstreamError::Rpc(value))) => {
                assert_eq!(value, json!({"code": -32000, "message": "header not found"}))
            }
            other => panic!("unexpected: {other:?}"),
        }

        // the head block is never asked for once the balance failed
        assert_eq!(f.rpc.call_count(), 1);
        assert_eq!(f.metrics.upstream_error_counter.get(), 1.0);
    }

    #[actix_web::test]
    async fn test_balance_not_a_string() {
        let f = fixture(|_| Ok(json!(12)));

        assert!(matches!(
            f.resolver.resolve(ADDRESS).await,
            Err(ResolveError::Upstream(UpstreamError::MalformedResponse))
        ));
    }

    #[actix_web::test]
    async fn test_balance_not_hex() {
        let f = fixture(|_| Ok(json!("0xnothex")));

        assert!(matches!(
            f.resolver.resolve(ADDRESS).await,
            Err(ResolveError::Upstream(UpstreamError::MalformedResponse))
        ));
    }

    #[actix_web::test]
    async fn test_failure_is_not_cached() {
        let f = fixture(|_| Err(UpstreamError::MalformedResponse));

        assert!(f.resolver.resolve(ADDRESS).await.is_err());
        assert!(f.resolver.resolve(ADDRESS).await.is_err());

        assert_eq!(f.rpc.call_count(), 2);
    }
}
