use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::{CacheBackend, CacheEntry, CacheStatus};
use crate::resolver::BalanceResponse;

#[derive(Default)]
pub struct MemoryBackend {
    data: DashMap<String, CacheEntry>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.data.len()
    }
}

impl CacheBackend for MemoryBackend {
    fn read(&self, key: &str, now: DateTime<Utc>) -> anyhow::Result<CacheStatus> {
        let status = match self.data.get(key) {
            Some(entry) if !entry.is_expired(now) => CacheStatus::Cached(entry.value.clone()),
            Some(_) => CacheStatus::Expired,
            None => CacheStatus::Missed,
        };

        Ok(status)
    }

    fn write(
        &self,
        key: &str,
        value: BalanceResponse,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> anyhow::Result<()> {
        let entry = CacheEntry::new(value, now, ttl)?;
        let _ = self.data.insert(key.to_string(), entry);
        Ok(())
    }
}
