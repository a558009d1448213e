//! Timeout wrapper for asynchronous chain operations.
//!
//! The wrapper races the operation against a timer and threads a
//! [`CancelToken`] into it so the underlying HTTP request is aborted rather
//! than merely ignored. Dropping the losing future on either exit path also
//! drops its timer, so no pending timers accumulate across calls.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use omniname_core::cancel::CancelToken;
use omniname_core::error::{OmniNameError, Result};

/// Runs `operation` under an optional effective timeout.
///
/// With no timeout configured the operation runs directly, receiving no
/// cancellation token. Otherwise the operation receives a token that fires
/// exactly once if the timer elapses first, and the call settles with
/// [`OmniNameError::Timeout`] carrying the configured duration.
pub async fn with_timeout<T, F, Fut>(timeout: Option<Duration>, operation: F) -> Result<T>
where
    F: FnOnce(Option<CancelToken>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let Some(duration) = timeout else {
        return operation(None).await;
    };

    let token = CancelToken::new();
    tokio::select! {
        result = operation(Some(token.clone())) => result,
        _ = tokio::time::sleep(duration) => {
            token.cancel();
            debug!(millis = duration.as_millis() as u64, "operation timed out");
            Err(OmniNameError::Timeout {
                millis: duration.as_millis() as u64,
            })
        }
    }
}
