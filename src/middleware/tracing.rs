use ::tracing::field::Empty;
use ::tracing::{debug, info_span, warn};
use std::time::Instant;

use super::Middleware;
use crate::dispatcher::{Handler, Request};

/// Wrap each request in an `http_request` span carrying the request id, method and path.
///
/// The response status and latency are recorded on the span when the handler returns, so a
/// subscriber with span-close events sees one line per request.
#[must_use]
pub fn trace_requests() -> Middleware {
    Middleware::new(|next: Handler| {
        Handler::new(move |req: &Request| {
            let span = info_span!(
                "http_request",
                request_id = %req.request_id(),
                method = %req.method(),
                path = %req.path(),
                status = Empty,
                latency_us = Empty,
            );
            let start = Instant::now();
            let res = span.in_scope(|| next.call(req));
            let latency_us = start.elapsed().as_micros() as u64;
            span.record("status", res.status);
            span.record("latency_us", latency_us);

            span.in_scope(|| {
                if res.status >= 500 {
                    warn!(status = res.status, latency_us, "Request failed");
                } else {
                    debug!(status = res.status, latency_us, "Request handled");
                }
            });
            res
        })
    })
}
