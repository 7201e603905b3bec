use super::{CurrencyListStore, DateFilter, RateStore};
use crate::core::rates::{CurrencyEntry, RateSnapshot};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use std::path::Path;
use tracing::debug;

/// Persistent store backed by a fjall keyspace with two partitions:
/// `historical` (date key → rates JSON) and `list` (name key → entry JSON).
///
/// The date string itself is the partition key, so a reverse iterator walks
/// snapshots newest-first without a secondary index.
pub struct FjallStore {
    _keyspace: Keyspace,
    rates: PartitionHandle,
    list: PartitionHandle,
}

impl FjallStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open keyspace at {}", path.display()))?;
        let rates = keyspace
            .open_partition("historical", PartitionCreateOptions::default())
            .context("Failed to open historical partition")?;
        let list = keyspace
            .open_partition("list", PartitionCreateOptions::default())
            .context("Failed to open list partition")?;

        Ok(Self {
            _keyspace: keyspace,
            rates,
            list,
        })
    }

    fn decode(pair: (fjall::Slice, fjall::Slice)) -> Result<RateSnapshot> {
        let (key, value) = pair;
        let date = std::str::from_utf8(&key)
            .context("Snapshot key is not valid UTF-8")?
            .to_string();
        let rates = serde_json::from_slice(&value)
            .with_context(|| format!("Corrupt rates payload for {date}"))?;
        Ok(RateSnapshot { date, rates })
    }
}

#[async_trait]
impl RateStore for FjallStore {
    async fn upsert(&self, snapshot: &RateSnapshot) -> Result<()> {
        let value = serde_json::to_vec(&snapshot.rates)?;
        self.rates.insert(snapshot.date.as_bytes(), value)?;
        debug!(date = %snapshot.date, "upserted snapshot");
        Ok(())
    }

    async fn insert_missing(&self, snapshots: &[RateSnapshot]) -> Result<usize> {
        let mut inserted = 0;
        for snapshot in snapshots {
            if self.rates.contains_key(snapshot.date.as_bytes())? {
                continue;
            }
            let value = serde_json::to_vec(&snapshot.rates)?;
            self.rates.insert(snapshot.date.as_bytes(), value)?;
            inserted += 1;
        }
        debug!(inserted, skipped = snapshots.len() - inserted, "bulk insert done");
        Ok(inserted)
    }

    async fn latest(&self) -> Result<Option<RateSnapshot>> {
        match self.rates.iter().rev().next() {
            Some(pair) => Ok(Some(Self::decode(pair?)?)),
            None => Ok(None),
        }
    }

    async fn recent(&self, limit: usize) -> Result<Vec<RateSnapshot>> {
        let mut out = Vec::with_capacity(limit);
        for pair in self.rates.iter().rev().take(limit) {
            out.push(Self::decode(pair?)?);
        }
        Ok(out)
    }

    async fn find_desc(
        &self,
        filter: &DateFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<RateSnapshot>> {
        let mut matched = 0;
        let mut out = Vec::new();
        for pair in self.rates.iter().rev() {
            let (key, value) = pair?;
            let date = std::str::from_utf8(&key).context("Snapshot key is not valid UTF-8")?;
            if !filter.matches(date) {
                continue;
            }
            matched += 1;
            if matched <= skip {
                continue;
            }
            if out.len() == limit {
                break;
            }
            out.push(Self::decode((key.clone(), value))?);
        }
        Ok(out)
    }
}

#[async_trait]
impl CurrencyListStore for FjallStore {
    async fn all(&self) -> Result<Vec<CurrencyEntry>> {
        let mut out = Vec::new();
        // name is the partition key; reverse order gives name descending
        for pair in self.list.iter().rev() {
            let (_, value) = pair?;
            out.push(serde_json::from_slice(&value).context("Corrupt currency list entry")?);
        }
        Ok(out)
    }

    async fn put_all(&self, entries: &[CurrencyEntry]) -> Result<()> {
        for entry in entries {
            self.list
                .insert(entry.name.as_bytes(), serde_json::to_vec(entry)?)?;
        }
        Ok(())
    }
}
