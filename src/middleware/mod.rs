//! # Middleware Module
//!
//! Middleware are handler decorators: a [`Middleware`] receives the next [`Handler`] and
//! returns a new one that may run code before and after it, replace its response, or
//! short-circuit without calling it.
//!
//! Chains are composed once, when the dispatcher is built. For a chain `[A, B]` around
//! handler `H` the call order is `A > B > H > B > A`.
//!
//! ## Provided middleware
//!
//! - [`trace_requests`]: one `tracing` span per request with status and latency
//! - [`RequestMetrics`]: lock-free request, latency and error counters
//!
//! [`Handler`]: crate::Handler

mod core;
mod metrics;
mod tracing;

pub use self::core::{chain, IntoMiddleware, Middleware};
pub use self::metrics::RequestMetrics;
pub use self::tracing::trace_requests;
