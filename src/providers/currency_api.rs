use super::util::with_retry;
use crate::core::rates::RateSnapshot;
use crate::error::RatesError;
use crate::rate_provider::RateProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::error;

const RETRIES: usize = 2;
const RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Deserialize)]
struct LatestResponse {
    data: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct HistoricalResponse {
    data: HashMap<String, HashMap<String, f64>>,
}

/// Client for the third-party FX rate API. Authenticates via an `apikey`
/// query parameter on every request.
pub struct CurrencyApiProvider {
    base_url: String,
    api_key: String,
    client: Client,
}

impl CurrencyApiProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            client: Client::new(),
        }
    }

    async fn get(
        &self,
        path: &str,
        extra_params: &[(&str, &str)],
    ) -> Result<reqwest::Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        with_retry(
            || async {
                let mut request = self.client.get(&url).query(&[("apikey", &self.api_key)]);
                for (name, value) in extra_params {
                    request = request.query(&[(name, value)]);
                }
                request.send().await
            },
            RETRIES,
            RETRY_DELAY,
        )
        .await
    }
}

/// Logs the failure detail and returns the coarse domain error. The provider
/// error body is intentionally dropped from the caller-visible error.
async fn reject(endpoint: &str, response: reqwest::Response, domain_err: RatesError) -> RatesError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error!(endpoint, %status, body = %body, "rate provider rejected the request");
    domain_err
}

#[async_trait]
impl RateProvider for CurrencyApiProvider {
    async fn fetch_latest(&self) -> Result<HashMap<String, f64>, RatesError> {
        let response = self.get("/latest", &[]).await.map_err(|err| {
            error!(error = %err, "latest rates request failed");
            RatesError::LatestRatesFetch
        })?;

        if !response.status().is_success() {
            return Err(reject("/latest", response, RatesError::LatestRatesFetch).await);
        }

        let parsed: LatestResponse = response.json().await.map_err(|err| {
            error!(error = %err, "failed to parse latest rates response");
            RatesError::LatestRatesFetch
        })?;

        Ok(parsed.data)
    }

    async fn fetch_range(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Vec<RateSnapshot>, RatesError> {
        let response = self
            .get("/historical", &[("date_from", from), ("date_to", to)])
            .await
            .map_err(|err| {
                error!(error = %err, from, to, "historical rates request failed");
                RatesError::HistoricalRatesFetch
            })?;

        if !response.status().is_success() {
            return Err(reject("/historical", response, RatesError::HistoricalRatesFetch).await);
        }

        let parsed: HistoricalResponse = response.json().await.map_err(|err| {
            error!(error = %err, "failed to parse historical rates response");
            RatesError::HistoricalRatesFetch
        })?;

        Ok(parsed
            .data
            .into_iter()
            .map(|(date, rates)| RateSnapshot { date, rates })
            .collect())
    }
}
