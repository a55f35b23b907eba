pub mod memory_backend;

use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};

use crate::resolver::BalanceResponse;

pub enum CacheStatus {
    Cached(BalanceResponse),
    Expired,
    Missed,
}

/// Address keyed store of resolved balances. Entries expire lazily: an
/// expired entry stays in the backend until it is overwritten.
pub trait CacheBackend: Send + Sync {
    fn read(&self, key: &str, now: DateTime<Utc>) -> anyhow::Result<CacheStatus>;

    fn write(
        &self,
        key: &str,
        value: BalanceResponse,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub expires_at: DateTime<Utc>,
    pub value: BalanceResponse,
}

impl CacheEntry {
    pub fn new(value: BalanceResponse, now: DateTime<Utc>, ttl: Duration) -> anyhow::Result<Self> {
        let ttl = chrono::Duration::from_std(ttl).context("cache ttl out of range")?;
        let expires_at = now
            .checked_add_signed(ttl)
            .context("cache expiry out of range")?;

        Ok(Self { expires_at, value })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
