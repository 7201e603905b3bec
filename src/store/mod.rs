//! Persistence for rate snapshots and the static currency list.
//!
//! The engine needs exactly four read/write shapes against the rate
//! collection: upsert-by-date, bulk insert of missing dates, newest
//! snapshot, and a newest-first scan with suffix filter and pagination.

pub mod disk;
pub mod memory;

use crate::core::rates::{CurrencyEntry, RateSnapshot};
use anyhow::Result;
use async_trait::async_trait;

/// Filter over the canonical `YYYY-MM-DD` snapshot key.
///
/// Period filtering is a suffix match on the date string rather than a
/// calendar-aware query: `DaySuffix("31")` matches every 31st regardless of
/// month length, which is the documented period semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateFilter {
    /// Every snapshot.
    All,
    /// Snapshots sharing the trailing `DD` segment.
    DaySuffix(String),
    /// Snapshots sharing the trailing `MM-DD` segment.
    MonthDaySuffix(String),
}

impl DateFilter {
    /// Same day-of-month as the reference date.
    pub fn same_day(reference: &str) -> Self {
        DateFilter::DaySuffix(reference.chars().skip(8).collect())
    }

    /// Same month and day-of-month as the reference date.
    pub fn same_month_day(reference: &str) -> Self {
        DateFilter::MonthDaySuffix(reference.chars().skip(5).collect())
    }

    pub fn matches(&self, date: &str) -> bool {
        match self {
            DateFilter::All => true,
            DateFilter::DaySuffix(suffix) | DateFilter::MonthDaySuffix(suffix) => {
                !suffix.is_empty() && date.ends_with(suffix.as_str())
            }
        }
    }
}

#[async_trait]
pub trait RateStore: Send + Sync {
    /// Replaces the snapshot for `snapshot.date` in full, creating it if
    /// absent. At most one snapshot exists per date.
    async fn upsert(&self, snapshot: &RateSnapshot) -> Result<()>;

    /// Writes only the snapshots whose date is not already present, so a
    /// repeated backfill never clobbers data written by a refresh. Returns
    /// the number of snapshots written.
    async fn insert_missing(&self, snapshots: &[RateSnapshot]) -> Result<usize>;

    /// The newest snapshot by date, if any.
    async fn latest(&self) -> Result<Option<RateSnapshot>>;

    /// Up to `limit` snapshots, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<RateSnapshot>>;

    /// Newest-first scan: apply `filter`, then skip `skip` matches, then
    /// take up to `limit`.
    async fn find_desc(
        &self,
        filter: &DateFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<RateSnapshot>>;
}

#[async_trait]
pub trait CurrencyListStore: Send + Sync {
    /// All known currencies, sorted by display name descending.
    async fn all(&self) -> Result<Vec<CurrencyEntry>>;

    /// Seeds the list. Administrative; the serving path never writes here.
    async fn put_all(&self, entries: &[CurrencyEntry]) -> Result<()>;
}
