//! Error types and the handler error conversion adapter.
//!
//! Two families of failures exist:
//!
//! - [`RouteError`]: configuration problems found while the route table is compiled
//!   (malformed patterns, unknown validators, bad methods). They are returned from
//!   [`AppBuilder::build`](crate::AppBuilder::build) and should stop the process from
//!   serving.
//! - Handler failures: a handler wrapped by [`ErrorConverter`] returns
//!   `anyhow::Result<Response>`. An [`HttpError`] anywhere in the error chain decides the
//!   status and the client-facing message; anything else becomes a 500.

use http::StatusCode;
use std::fmt;
use std::sync::Arc;
use tracing::{error, warn};

use crate::dispatcher::{Handler, Request, Response};

/// Route table configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("invalid segment '{segment}' in route pattern '{pattern}': {reason}")]
    InvalidSegment {
        pattern: String,
        segment: String,
        reason: String,
    },
    #[error("validator '{validator}' used by parameter '{param}' in '{pattern}' is not registered")]
    UnknownValidator {
        pattern: String,
        param: String,
        validator: String,
    },
    #[error("invalid HTTP method '{method}' for route '{pattern}'")]
    InvalidMethod { method: String, pattern: String },
}

/// A handler failure that knows its HTTP status and client-facing message.
///
/// The optional internal cause is logged by the converter but never sent to the client.
#[derive(thiserror::Error)]
#[error("{message}")]
pub struct HttpError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl fmt::Debug for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpError")
            .field("status", &self.status.as_u16())
            .field("message", &self.message)
            .field("internal", &self.internal.as_ref().map(|e| format!("{e:#}")))
            .finish()
    }
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            internal: None,
        }
    }

    /// Error whose message is the status' canonical reason phrase.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        Self::new(status, status.canonical_reason().unwrap_or("Unknown Status"))
    }

    #[must_use]
    pub fn bad_request() -> Self {
        Self::from_status(StatusCode::BAD_REQUEST)
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self::from_status(StatusCode::UNAUTHORIZED)
    }

    #[must_use]
    pub fn forbidden() -> Self {
        Self::from_status(StatusCode::FORBIDDEN)
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self::from_status(StatusCode::NOT_FOUND)
    }

    #[must_use]
    pub fn conflict() -> Self {
        Self::from_status(StatusCode::CONFLICT)
    }

    #[must_use]
    pub fn unprocessable_entity() -> Self {
        Self::from_status(StatusCode::UNPROCESSABLE_ENTITY)
    }

    #[must_use]
    pub fn too_many_requests() -> Self {
        Self::from_status(StatusCode::TOO_MANY_REQUESTS)
    }

    #[must_use]
    pub fn internal_server_error() -> Self {
        Self::from_status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    #[must_use]
    pub fn service_unavailable() -> Self {
        Self::from_status(StatusCode::SERVICE_UNAVAILABLE)
    }

    /// Attach the underlying cause for server-side logging.
    #[must_use]
    pub fn with_internal(mut self, cause: impl Into<anyhow::Error>) -> Self {
        self.internal = Some(cause.into());
        self
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn internal(&self) -> Option<&anyhow::Error> {
        self.internal.as_ref()
    }
}

type ConvertFn = Arc<dyn Fn(&Request, anyhow::Error) -> Response + Send + Sync>;

/// Turns fallible handlers into plain [`Handler`]s.
///
/// ```rust,ignore
/// let errors = ErrorConverter::default();
/// app.get("/admin", errors.wrap(|_req: &Request| {
///     Err(HttpError::forbidden().into())
/// }));
/// ```
#[derive(Clone)]
pub struct ErrorConverter {
    convert: ConvertFn,
}

impl Default for ErrorConverter {
    fn default() -> Self {
        Self {
            convert: Arc::new(default_error_response),
        }
    }
}

impl ErrorConverter {
    /// Use a custom conversion instead of [`default_error_response`].
    pub fn with_handler<F>(convert: F) -> Self
    where
        F: Fn(&Request, anyhow::Error) -> Response + Send + Sync + 'static,
    {
        Self {
            convert: Arc::new(convert),
        }
    }

    pub fn wrap<F>(&self, handler: F) -> Handler
    where
        F: Fn(&Request) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        let convert = Arc::clone(&self.convert);
        Handler::new(move |req: &Request| match handler(req) {
            Ok(response) => response,
            Err(err) => convert(req, err),
        })
    }
}

/// [`ErrorConverter::wrap`] with the default conversion.
pub fn with_errors<F>(handler: F) -> Handler
where
    F: Fn(&Request) -> anyhow::Result<Response> + Send + Sync + 'static,
{
    ErrorConverter::default().wrap(handler)
}

/// Default conversion: [`HttpError`] keeps its status and message, anything else is a 500
/// carrying the error's top-level description.
pub fn default_error_response(req: &Request, err: anyhow::Error) -> Response {
    if let Some(http_err) = err.chain().find_map(|e| e.downcast_ref::<HttpError>()) {
        match http_err.internal() {
            Some(cause) => warn!(
                request_id = %req.request_id(),
                status = http_err.status().as_u16(),
                message = %http_err.message(),
                internal = %format!("{cause:#}"),
                "Handler returned HTTP error"
            ),
            None => warn!(
                request_id = %req.request_id(),
                status = http_err.status().as_u16(),
                message = %http_err.message(),
                "Handler returned HTTP error"
            ),
        }
        return Response::error(http_err.status().as_u16(), http_err.message());
    }

    error!(
        request_id = %req.request_id(),
        method = %req.method(),
        path = %req.path(),
        error = %format!("{err:#}"),
        "Handler failed"
    );
    Response::error(StatusCode::INTERNAL_SERVER_ERROR.as_u16(), &err.to_string())
}
