//! # Dispatcher Module
//!
//! Request entry point: the [`AppBuilder`] collects routes, validators, middleware and
//! static mounts, and [`AppBuilder::build`] freezes them into an immutable [`Dispatcher`].
//!
//! ## Request Flow
//!
//! 1. Static mounts are checked in registration order. A mount whose prefix matches and
//!    whose remainder names an existing file serves it directly, skipping all middleware.
//! 2. Otherwise the request enters the application middleware chain.
//! 3. The innermost handler asks the [`Router`](crate::router::Router) for the first
//!    matching route, binds its path parameters to the request, and calls the route's
//!    handler wrapped in its own middleware.
//! 4. When nothing matches, the configured not-found handler runs (inside the application
//!    middleware, so it is logged and timed like any other response).
//!
//! ## Middleware order
//!
//! With application middleware `[A, B]` and route middleware `[C, D]`:
//!
//! ```text
//! A > B > C > D > handler > D > C > B > A
//! ```
//!
//! ## Example
//!
//! ```rust
//! use waypost::{AppBuilder, Request, Response};
//! use http::Method;
//!
//! let mut app = AppBuilder::new();
//! app.get("/hello/{name@alpha}", |req: &Request| {
//!     Response::text(200, format!("hello {}", req.param("name").unwrap_or_default()))
//! })
//! .name("hello");
//! let dispatcher = app.build().unwrap();
//!
//! let res = dispatcher.dispatch(Request::new(Method::GET, "/hello/ada"));
//! assert_eq!(res.body_str(), Some("hello ada"));
//! ```

mod builder;
mod core;
mod handler;
mod request;
mod response;

pub use self::core::{Dispatcher, StaticMount};
pub use builder::{AppBuilder, RouteEntry};
pub use handler::{Handler, IntoHandler};
pub use request::{
    HeaderVec, ParamError, PathParams, Request, MAX_INLINE_HEADERS, MAX_INLINE_PARAMS,
};
pub use response::Response;
