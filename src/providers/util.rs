use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retries an async operation a fixed number of times with a constant delay.
/// Total runs = 1 initial attempt + `retries`.
pub async fn with_retry<F, Fut, T, E>(mut operation: F, retries: usize, delay: Duration) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!("Attempt {}/{} failed: {}. Retrying...", attempt, retries, err);
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
        }
    }
}
