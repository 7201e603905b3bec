use super::{CurrencyListStore, DateFilter, RateStore};
use crate::core::rates::{CurrencyEntry, RateSnapshot};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

/// In-memory store over a BTreeMap. Used by tests and ephemeral runs; the
/// ordered map mirrors the disk store's key ordering so both backends
/// answer scans identically.
#[derive(Default)]
pub struct MemoryStore {
    rates: Mutex<BTreeMap<String, HashMap<String, f64>>>,
    list: Mutex<Vec<CurrencyEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateStore for MemoryStore {
    async fn upsert(&self, snapshot: &RateSnapshot) -> Result<()> {
        let mut rates = self.rates.lock().await;
        rates.insert(snapshot.date.clone(), snapshot.rates.clone());
        Ok(())
    }

    async fn insert_missing(&self, snapshots: &[RateSnapshot]) -> Result<usize> {
        let mut rates = self.rates.lock().await;
        let mut inserted = 0;
        for snapshot in snapshots {
            if !rates.contains_key(&snapshot.date) {
                rates.insert(snapshot.date.clone(), snapshot.rates.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn latest(&self) -> Result<Option<RateSnapshot>> {
        let rates = self.rates.lock().await;
        Ok(rates
            .last_key_value()
            .map(|(date, data)| RateSnapshot::new(date.clone(), data.clone())))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<RateSnapshot>> {
        let rates = self.rates.lock().await;
        Ok(rates
            .iter()
            .rev()
            .take(limit)
            .map(|(date, data)| RateSnapshot::new(date.clone(), data.clone()))
            .collect())
    }

    async fn find_desc(
        &self,
        filter: &DateFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<RateSnapshot>> {
        let rates = self.rates.lock().await;
        Ok(rates
            .iter()
            .rev()
            .filter(|(date, _)| filter.matches(date))
            .skip(skip)
            .take(limit)
            .map(|(date, data)| RateSnapshot::new(date.clone(), data.clone()))
            .collect())
    }
}

#[async_trait]
impl CurrencyListStore for MemoryStore {
    async fn all(&self) -> Result<Vec<CurrencyEntry>> {
        let mut entries = self.list.lock().await.clone();
        entries.sort_by(|a, b| b.name.cmp(&a.name));
        Ok(entries)
    }

    async fn put_all(&self, entries: &[CurrencyEntry]) -> Result<()> {
        let mut list = self.list.lock().await;
        for entry in entries {
            list.retain(|existing| existing.name != entry.name);
            list.push(entry.clone());
        }
        Ok(())
    }
}
