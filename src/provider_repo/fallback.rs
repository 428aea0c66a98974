// Ordered provider fallback: attempts run one after another, first success wins.

use futures_util::future::BoxFuture;
use std::future::Future;

use crate::error::FetchError;

/// One provider path. The future is not polled until its turn, so later
/// attempts cost nothing when an earlier one succeeds.
pub(crate) struct Attempt<'a, T> {
    provider: &'static str,
    run: BoxFuture<'a, Result<T, FetchError>>,
}

impl<'a, T> Attempt<'a, T> {
    pub(crate) fn new<F>(provider: &'static str, run: F) -> Self
    where
        F: Future<Output = Result<T, FetchError>> + Send + 'a,
    {
        Self {
            provider,
            run: Box::pin(run),
        }
    }
}

/// Await `attempts` strictly in order; no racing. All failing yields
/// `AllProvidersExhausted` carrying every attempt's error.
pub(crate) async fn first_success<T>(
    operation: &'static str,
    attempts: Vec<Attempt<'_, T>>,
) -> Result<T, FetchError> {
    let mut failures = Vec::with_capacity(attempts.len());
    for attempt in attempts {
        match attempt.run.await {
            Ok(value) => {
                if !failures.is_empty() {
                    tracing::info!(operation, provider = attempt.provider, "served by fallback provider");
                }
                return Ok(value);
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    operation,
                    provider = attempt.provider,
                    "provider attempt failed"
                );
                failures.push(format!("{}: {}", attempt.provider, e));
            }
        }
    }
    Err(FetchError::AllProvidersExhausted {
        operation,
        attempts: failures,
    })
}
