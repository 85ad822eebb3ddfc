//! # waypost
//!
//! An embeddable HTTP request router: declarative path patterns with optional segments and
//! validator chains, first-match route tables, composable middleware, static asset mounts and
//! an adapter that turns handler errors into HTTP responses.
//!
//! ## Architecture
//!
//! - **[`validators`]** - named validate-and-transform functions (`int`, `bool`, `uuid`,
//!   `alpha`, `alphanumeric`, plus your own)
//! - **[`router`]** - pattern compilation (`/posts/{year@int}/{slug}?`), compiled routes and
//!   the ordered route table
//! - **[`middleware`]** - handler decorators and their composition
//! - **[`dispatcher`]** - the [`AppBuilder`] registration API and the frozen [`Dispatcher`]
//!   pipeline (static mounts, application middleware, routing, not-found)
//! - **[`error`]** - configuration errors, [`HttpError`] and the [`ErrorConverter`] adapter
//! - **[`server`]** - `may_minihttp` transport
//! - **[`config`]**, **[`logging`]**, **[`console`]** - runtime switches, `tracing` setup and
//!   development-mode console output
//!
//! ## Quick Start
//!
//! ```rust
//! use http::{Method, StatusCode};
//! use waypost::{with_errors, AppBuilder, HttpError, Request, Response};
//!
//! let mut app = AppBuilder::new();
//! app.get("/users/{id@int}", |req: &Request| {
//!     Response::text(200, format!("user {}", req.param("id").unwrap_or_default()))
//! })
//! .name("get_user");
//! app.get(
//!     "/admin",
//!     with_errors(|_req: &Request| -> anyhow::Result<Response> {
//!         Err(HttpError::new(StatusCode::FORBIDDEN, "Forbidden").into())
//!     }),
//! );
//! let dispatcher = app.build().unwrap();
//!
//! let res = dispatcher.dispatch(Request::new(Method::GET, "/users/7"));
//! assert_eq!(res.body_str(), Some("user 7"));
//!
//! let res = dispatcher.dispatch(Request::new(Method::GET, "/users/abc"));
//! assert_eq!(res.status, 404);
//!
//! let res = dispatcher.dispatch(Request::new(Method::GET, "/admin"));
//! assert_eq!(res.status, 403);
//! ```

pub mod config;
pub mod console;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod server;
pub mod static_files;
pub mod validators;

pub use config::{AppConfig, ConfigError};
pub use dispatcher::{
    AppBuilder, Dispatcher, Handler, IntoHandler, ParamError, PathParams, Request, Response,
    RouteEntry,
};
pub use error::{default_error_response, with_errors, ErrorConverter, HttpError, RouteError};
pub use ids::RequestId;
pub use middleware::{IntoMiddleware, Middleware};
pub use validators::{ValidationError, ValidatorRegistry};
