use std::fmt;
use std::sync::Arc;

use crate::dispatcher::Handler;

/// A handler decorator: receives the next handler and returns the wrapped one.
///
/// ```rust,ignore
/// let timing = Middleware::new(|next: Handler| {
///     Handler::new(move |req| {
///         let start = Instant::now();
///         let res = next.call(req);
///         tracing::info!(elapsed_us = start.elapsed().as_micros() as u64, "done");
///         res
///     })
/// });
/// ```
#[derive(Clone)]
pub struct Middleware(Arc<dyn Fn(Handler) -> Handler + Send + Sync>);

impl Middleware {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Handler) -> Handler + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    #[must_use]
    pub fn wrap(&self, next: Handler) -> Handler {
        (self.0)(next)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Middleware")
    }
}

/// Closures and [`Middleware`] values accepted by the registration API.
pub trait IntoMiddleware {
    fn into_middleware(self) -> Middleware;
}

impl IntoMiddleware for Middleware {
    fn into_middleware(self) -> Middleware {
        self
    }
}

impl<F> IntoMiddleware for F
where
    F: Fn(Handler) -> Handler + Send + Sync + 'static,
{
    fn into_middleware(self) -> Middleware {
        Middleware::new(self)
    }
}

/// Compose `[m0, m1, .., mN]` around `handler` as `m0(m1(..mN(handler)))`.
///
/// `m0` runs first on the way in and last on the way out.
#[must_use]
pub fn chain(handler: Handler, middlewares: &[Middleware]) -> Handler {
    middlewares
        .iter()
        .rev()
        .fold(handler, |next, middleware| middleware.wrap(next))
}
