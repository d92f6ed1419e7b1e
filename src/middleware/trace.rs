//! Request tracing.

use std::future::Future;
use std::time::Instant;

use tracing::{Instrument, info, info_span, warn};

use crate::method::Method;
use crate::response::Response;

/// Runs `next` inside a `request` span and logs its outcome.
///
/// Server errors are logged at `warn`, everything else at `info`.
pub(crate) async fn trace<F>(method: Method, path: &str, next: F) -> Response
where
    F: Future<Output = Response>,
{
    let span = info_span!("request", %method, path);
    let started = Instant::now();
    let response = next.instrument(span.clone()).await;
    let latency_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    let status = response.status_code();

    span.in_scope(|| {
        if status >= 500 {
            warn!(status, latency_us, "request failed");
        } else {
            info!(status, latency_us, "request completed");
        }
    });
    response
}
