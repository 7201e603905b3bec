//! Historical rates engine: periodic refresh, one-shot backfill and the
//! period-filtered query operations. Stateless between calls; every piece
//! of state lives in the rate store.

use crate::core::period::Period;
use crate::core::rates::{DATE_FORMAT, RateSnapshot};
use crate::error::RatesError;
use crate::rate_provider::RateProvider;
use crate::store::{DateFilter, RateStore};
use chrono::{Days, Months, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Number of backfill windows. Each window spans six months, so 21 windows
/// cover roughly ten years of history.
const BACKFILL_WINDOWS: usize = 21;

/// Pause between backfill windows, to stay inside the provider's rate limit.
const BACKFILL_DELAY: Duration = Duration::from_secs(20);

const DEFAULT_LIMIT: usize = 365;

/// Start boundary of the window anchored at `anchor`: one day back.
fn window_start(anchor: NaiveDate) -> NaiveDate {
    anchor - Days::new(1)
}

/// End boundary of the window anchored at `anchor`: six months back.
fn window_end(anchor: NaiveDate) -> NaiveDate {
    anchor - Months::new(6)
}

pub struct HistoryService {
    store: Arc<dyn RateStore>,
    provider: Arc<dyn RateProvider>,
    refresh_key: String,
    round_latest: bool,
    backfill_windows: usize,
    backfill_delay: Duration,
}

impl HistoryService {
    pub fn new(
        store: Arc<dyn RateStore>,
        provider: Arc<dyn RateProvider>,
        refresh_key: &str,
    ) -> Self {
        Self {
            store,
            provider,
            refresh_key: refresh_key.to_string(),
            round_latest: true,
            backfill_windows: BACKFILL_WINDOWS,
            backfill_delay: BACKFILL_DELAY,
        }
    }

    /// Selects between the two observed response shapes for the latest view:
    /// rates rounded to 3 decimals (default) or raw provider precision.
    pub fn with_rounding(mut self, round_latest: bool) -> Self {
        self.round_latest = round_latest;
        self
    }

    #[cfg(test)]
    fn with_backfill_tuning(mut self, windows: usize, delay: Duration) -> Self {
        self.backfill_windows = windows;
        self.backfill_delay = delay;
        self
    }

    /// Key-checked refresh, for the HTTP trigger. A wrong key performs no
    /// provider call and no store write.
    pub async fn refresh_latest(&self, key: &str) -> Result<(), RatesError> {
        if key != self.refresh_key {
            return Err(RatesError::Unauthorized);
        }
        self.refresh_now().await
    }

    /// Fetches the provider's "today" rates and upserts them under today's
    /// date, replacing any existing snapshot for that date in full. Used
    /// directly by the in-process scheduler, which needs no key.
    pub async fn refresh_now(&self) -> Result<(), RatesError> {
        let today = Utc::now().date_naive().format(DATE_FORMAT).to_string();
        let rates = self.provider.fetch_latest().await?;
        let snapshot = RateSnapshot::new(today, rates);
        self.store
            .upsert(&snapshot)
            .await
            .map_err(RatesError::Store)?;
        debug!(date = %snapshot.date, currencies = snapshot.rates.len(), "refreshed latest rates");
        Ok(())
    }

    /// One-shot bulk load of roughly ten years of history, walking backward
    /// from today in six-month windows with a rate-limit pause between
    /// windows. Dates already present in the store are left untouched, so
    /// re-running after a partial failure is safe. Any fetch or insert
    /// failure aborts the remaining windows.
    pub async fn backfill(&self) -> Result<(), RatesError> {
        let mut anchor = Utc::now().date_naive();

        for window in 0..self.backfill_windows {
            let start = window_start(anchor);
            let end = window_end(anchor);
            let from = end.format(DATE_FORMAT).to_string();
            let to = start.format(DATE_FORMAT).to_string();

            let snapshots = self.provider.fetch_range(&from, &to).await?;
            let inserted = self
                .store
                .insert_missing(&snapshots)
                .await
                .map_err(RatesError::BackfillInsert)?;
            info!(%from, %to, fetched = snapshots.len(), inserted, "backfill window stored");

            anchor = end;
            if window + 1 < self.backfill_windows {
                tokio::time::sleep(self.backfill_delay).await;
            }
        }
        Ok(())
    }

    /// The 7 most recent snapshots, newest first, with the configured
    /// rounding policy applied to the response only.
    pub async fn latest_rates(&self) -> Result<Vec<RateSnapshot>, RatesError> {
        let mut recent = self.store.recent(7).await.map_err(RatesError::Store)?;
        if self.round_latest {
            for snapshot in &mut recent {
                snapshot.round_rates();
            }
        }
        Ok(recent)
    }

    /// Period-filtered history for one currency, newest first, projected to
    /// `date` plus that currency's rate.
    ///
    /// The reference date is the most recent snapshot's; it also validates
    /// the currency sign before any filtered scan happens.
    pub async fn rates_by_period(
        &self,
        currency: Option<&str>,
        period: Option<&str>,
        skip: Option<usize>,
        limit: Option<usize>,
    ) -> Result<Vec<RateSnapshot>, RatesError> {
        let sign = match currency {
            Some(sign) if !sign.is_empty() => sign,
            _ => return Err(RatesError::MissingParameter("currency")),
        };
        let period: Period = match period {
            Some(period) if !period.is_empty() => period.parse()?,
            _ => return Err(RatesError::MissingParameter("period")),
        };

        let reference = self
            .store
            .latest()
            .await
            .map_err(RatesError::Store)?
            .ok_or_else(|| RatesError::InvalidCurrency(sign.to_string()))?;
        if !reference.rates.contains_key(sign) {
            return Err(RatesError::InvalidCurrency(sign.to_string()));
        }

        let filter = match period {
            Period::Year => DateFilter::same_month_day(&reference.date),
            Period::Month => DateFilter::same_day(&reference.date),
            Period::Day => DateFilter::All,
        };
        let snapshots = self
            .store
            .find_desc(&filter, skip.unwrap_or(0), limit.unwrap_or(DEFAULT_LIMIT))
            .await
            .map_err(RatesError::Store)?;

        Ok(snapshots.iter().map(|s| s.project(sign)).collect())
    }
}
