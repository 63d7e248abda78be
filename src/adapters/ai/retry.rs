//! Shared HTTP plumbing for the hosted model adapters.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::ports::AIError;

/// Cap on the exponent used for backoff so delays stay bounded.
const MAX_BACKOFF_EXPONENT: u32 = 5;

/// Runs `attempt` until it succeeds, fails with a non-retryable error, or
/// `max_retries` retries have been spent.
pub(crate) async fn with_backoff<T, F, Fut>(
    provider: &str,
    max_retries: u32,
    mut attempt: F,
) -> Result<T, AIError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AIError>>,
{
    let mut retries = 0;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && retries < max_retries => {
                let delay = backoff_delay(retries, &err);
                tracing::warn!(
                    provider,
                    retry = retries + 1,
                    max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retrying completion request"
                );
                sleep(delay).await;
                retries += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// 1s, 2s, 4s, ... or the provider's retry-after hint when that is longer.
pub(crate) fn backoff_delay(retries: u32, err: &AIError) -> Duration {
    let base = Duration::from_secs(1 << retries.min(MAX_BACKOFF_EXPONENT));
    match err {
        AIError::RateLimited { retry_after_secs } => {
            base.max(Duration::from_secs(u64::from(*retry_after_secs)))
        }
        _ => base,
    }
}

/// Maps a transport failure from `reqwest` onto the port's error type.
pub(crate) fn map_send_error(err: reqwest::Error, timeout: Duration) -> AIError {
    if err.is_timeout() {
        AIError::Timeout {
            timeout_secs: u32::try_from(timeout.as_secs()).unwrap_or(u32::MAX),
        }
    } else if err.is_connect() {
        AIError::network(format!("Connection failed: {}", err))
    } else {
        AIError::network(err.to_string())
    }
}

/// Pulls "try again in N" seconds out of a JSON error body.
pub(crate) fn parse_retry_after(error_body: &str, default_secs: u32) -> u32 {
    const HINT: &str = "try again in ";

    serde_json::from_str::<serde_json::Value>(error_body)
        .ok()
        .and_then(|body| {
            let message = body.get("error")?.get("message")?.as_str()?.to_string();
            let rest = &message[message.find(HINT)? + HINT.len()..];
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()
        })
        .unwrap_or(default_secs)
}
