use thiserror::Error;

/// Domain errors surfaced by the historical rates engine and its
/// collaborators. Provider errors are deliberately coarse: the raw
/// transport error and response body are logged at the call site and
/// never reach the client.
#[derive(Debug, Error)]
pub enum RatesError {
    #[error("refresh key is not valid")]
    Unauthorized,

    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("unknown currency: {0}")]
    InvalidCurrency(String),

    #[error("unknown period: {0}")]
    UnknownPeriod(String),

    #[error("latest rates fetch failed")]
    LatestRatesFetch,

    #[error("historical rates fetch failed")]
    HistoricalRatesFetch,

    #[error("backfill insert failed")]
    BackfillInsert(#[source] anyhow::Error),

    #[error("store operation failed")]
    Store(#[source] anyhow::Error),
}

impl RatesError {
    /// True for errors caused by the caller's input rather than by a
    /// downstream failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RatesError::Unauthorized
                | RatesError::MissingParameter(_)
                | RatesError::InvalidCurrency(_)
                | RatesError::UnknownPeriod(_)
        )
    }
}
