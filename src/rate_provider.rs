//! Seam to the external FX rate API.

use crate::core::rates::RateSnapshot;
use crate::error::RatesError;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the provider's "today" rates as a currency code → rate map.
    async fn fetch_latest(&self) -> Result<HashMap<String, f64>, RatesError>;

    /// Fetches one snapshot per date in the inclusive `from..=to` window.
    /// Dates are `YYYY-MM-DD` strings; `from` is the older boundary.
    async fn fetch_range(&self, from: &str, to: &str)
    -> Result<Vec<RateSnapshot>, RatesError>;
}
