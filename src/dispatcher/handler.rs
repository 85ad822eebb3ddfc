use std::fmt;
use std::sync::Arc;

use super::request::Request;
use super::response::Response;

/// A terminal request handler. Cheap to clone; shared across concurrent requests.
#[derive(Clone)]
pub struct Handler(Arc<dyn Fn(&Request) -> Response + Send + Sync>);

impl Handler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    #[inline]
    pub fn call(&self, req: &Request) -> Response {
        (self.0)(req)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler")
    }
}

/// Anything the registration API accepts as a handler: closures and [`Handler`] values
/// (for example the output of [`ErrorConverter::wrap`](crate::ErrorConverter::wrap)).
pub trait IntoHandler {
    fn into_handler(self) -> Handler;
}

impl IntoHandler for Handler {
    fn into_handler(self) -> Handler {
        self
    }
}

impl<F> IntoHandler for F
where
    F: Fn(&Request) -> Response + Send + Sync + 'static,
{
    fn into_handler(self) -> Handler {
        Handler::new(self)
    }
}
