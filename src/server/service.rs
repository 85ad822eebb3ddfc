use may_minihttp::{HttpService, Request as WireRequest, Response as WireResponse};
use std::io;
use std::sync::Arc;
use tracing::warn;

use super::request::to_request;
use super::response::write_response;
use crate::dispatcher::{Dispatcher, Response};

/// `may_minihttp` service backed by a shared, immutable [`Dispatcher`].
#[derive(Clone)]
pub struct AppService {
    dispatcher: Arc<Dispatcher>,
}

impl AppService {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: WireRequest, res: &mut WireResponse) -> io::Result<()> {
        let response = match to_request(req) {
            Ok(request) => self.dispatcher.dispatch(request),
            Err(e) => {
                warn!(error = %e, "Rejecting malformed request");
                Response::error(400, &e.to_string())
            }
        };
        write_response(res, response);
        Ok(())
    }
}
