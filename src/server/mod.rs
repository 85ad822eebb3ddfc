//! HTTP transport over `may_minihttp`: converts wire requests into [`Request`]s, hands
//! them to a shared [`Dispatcher`], and writes the resulting [`Response`] back.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use waypost::server::{AppService, HttpServer};
//! use waypost::{AppBuilder, Request, Response};
//!
//! let mut app = AppBuilder::new();
//! app.get("/", |_req: &Request| Response::text(200, "ok"));
//! let service = AppService::new(Arc::new(app.build().unwrap()));
//! let handle = HttpServer(service).start("127.0.0.1:8080").unwrap();
//! handle.join().unwrap();
//! ```
//!
//! [`Request`]: crate::Request
//! [`Response`]: crate::Response
//! [`Dispatcher`]: crate::Dispatcher

mod http_server;
mod request;
mod response;
mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{split_target, to_request, RequestParseError};
pub use response::{status_reason, write_response};
pub use service::AppService;
