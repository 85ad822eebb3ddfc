//! # Router Module
//!
//! Pattern compilation, compiled routes and the ordered route table.
//!
//! ## Overview
//!
//! 1. **Compilation** ([`RoutePattern::parse`]): a declared pattern such as
//!    `/posts/{year@int}/{slug}?` is expanded into variants (one per optional segment, plus
//!    the full form) and each variant into static and parameter segments.
//! 2. **Binding** ([`Route::compile`]): validator names are resolved against a
//!    [`ValidatorRegistry`](crate::validators::ValidatorRegistry); unknown names are a
//!    configuration error.
//! 3. **Matching** ([`Router::route`]): routes are tried in registration order, variants in
//!    compiler order; the first full match wins and yields its path parameters.
//!
//! ## Pattern grammar
//!
//! ```text
//! pattern   := "/" segment ("/" segment)*
//! segment   := literal | "{" name ["@" validator ("," validator)*] "}" ["?"]
//! ```
//!
//! ## Example
//!
//! ```rust
//! use waypost::router::{MethodFilter, Route, RoutePattern, Router};
//! use waypost::validators::ValidatorRegistry;
//! use waypost::{Handler, Request, Response};
//! use http::Method;
//!
//! let route = Route::compile(
//!     MethodFilter::Exact(Method::GET),
//!     RoutePattern::parse("/users/{id@int}").unwrap(),
//!     Handler::new(|_req: &Request| Response::text(200, "user")),
//!     Vec::new(),
//!     &ValidatorRegistry::new(),
//! )
//! .unwrap();
//! let router = Router::new(vec![route]);
//!
//! let m = router.route(&Method::GET, "/users/42").unwrap();
//! assert_eq!(m.path_params.get("id"), Some("42"));
//! assert!(router.route(&Method::GET, "/users/abc").is_none());
//! ```

mod core;
mod pattern;
mod route;

pub use self::core::{RouteMatch, Router};
pub use pattern::{expand_optional, RoutePattern, Segment};
pub use route::{MethodFilter, Route};
