//! Opt-in retry for flaky providers.
//!
//! The collector itself never retries: a provider error fails the target.
//! Wrapping a provider in [`RetryingProvider`] retries individual calls on
//! [`ProviderError::Timeout`] and [`ProviderError::Transport`] with
//! exponential back-off and jitter before the error reaches the collector.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::provider::PageProvider;
use crate::types::RawCreative;

const MAX_DELAY_MS: u64 = 60_000;

fn is_retriable(err: &ProviderError) -> bool {
    matches!(
        err,
        ProviderError::Timeout { .. } | ProviderError::Transport(_)
    )
}

/// Runs `operation` with up to `max_retries` additional attempts.
///
/// Back-off with `backoff_base_ms = 1_000`:
///
/// | Retry | Sleep before it              |
/// |-------|------------------------------|
/// | 1     | 1 000 ms × 2⁰ ± 25 % jitter |
/// | 2     | 1 000 ms × 2¹ ± 25 % jitter |
/// | 3     | 1 000 ms × 2² ± 25 % jitter |
///
/// Delay is capped at 60 s. [`ProviderError::Other`] is returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    operation_name: &'static str,
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "provider error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// A [`PageProvider`] decorator that retries transient failures.
///
/// `close` is passed through untouched.
pub struct RetryingProvider<P> {
    inner: P,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl<P> RetryingProvider<P> {
    pub fn new(inner: P, max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            inner,
            max_retries,
            backoff_base_ms,
        }
    }
}

#[async_trait]
impl<P: PageProvider> PageProvider for RetryingProvider<P> {
    type Session = P::Session;

    async fn render(&self, url: &str) -> Result<Self::Session, ProviderError> {
        let inner = &self.inner;
        retry_with_backoff("render", self.max_retries, self.backoff_base_ms, move || {
            inner.render(url)
        })
        .await
    }

    async fn extract_visible_items(
        &self,
        session: &Self::Session,
    ) -> Result<Vec<RawCreative>, ProviderError> {
        let inner = &self.inner;
        retry_with_backoff("extract", self.max_retries, self.backoff_base_ms, move || {
            inner.extract_visible_items(session)
        })
        .await
    }

    async fn advance(&self, session: &Self::Session) -> Result<(), ProviderError> {
        let inner = &self.inner;
        retry_with_backoff("advance", self.max_retries, self.backoff_base_ms, move || {
            inner.advance(session)
        })
        .await
    }

    async fn probe_size(&self, session: &Self::Session) -> Result<u64, ProviderError> {
        let inner = &self.inner;
        retry_with_backoff("probe", self.max_retries, self.backoff_base_ms, move || {
            inner.probe_size(session)
        })
        .await
    }

    async fn entity_name(&self, session: &Self::Session) -> Result<Option<String>, ProviderError> {
        let inner = &self.inner;
        retry_with_backoff("entity_name", self.max_retries, self.backoff_base_ms, move || {
            inner.entity_name(session)
        })
        .await
    }

    async fn close(&self, session: Self::Session) {
        self.inner.close(session).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff("test", 3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, ProviderError>(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transport_errors_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff("test", 3, 0, || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ProviderError::Transport("reset".into()))
                } else {
                    Ok(1u32)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<(), _> = retry_with_backoff("test", 2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::Timeout { operation: "render" })
            }
        })
        .await;
        assert!(matches!(result, Err(ProviderError::Timeout { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<(), _> = retry_with_backoff("test", 5, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::Other("no such listing".into()))
            }
        })
        .await;
        assert!(matches!(result, Err(ProviderError::Other(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_fails_fast() {
        let result: Result<(), _> = retry_with_backoff("test", 0, 1_000, || async {
            Err(ProviderError::Transport("down".into()))
        })
        .await;
        assert!(result.is_err());
    }
}
