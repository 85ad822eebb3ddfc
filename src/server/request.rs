use http::Method;
use may_minihttp::Request as WireRequest;
use std::borrow::Cow;
use std::io::{self, Read};
use tracing::debug;

use crate::dispatcher::Request;
use crate::ids::RequestId;

#[derive(Debug, thiserror::Error)]
pub enum RequestParseError {
    #[error("unsupported method {0:?}")]
    Method(String),
    #[error("request path is not valid UTF-8 once decoded")]
    Path,
    #[error("failed to read request body: {0}")]
    Body(#[from] io::Error),
}

/// Split a request target into its percent-decoded path and raw query string.
pub fn split_target(target: &str) -> Result<(Cow<'_, str>, Option<&str>), RequestParseError> {
    let (raw_path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };
    let path = urlencoding::decode(raw_path).map_err(|_| RequestParseError::Path)?;
    Ok((path, query))
}

/// Convert a `may_minihttp` request. The body is read last since reading consumes it.
pub fn to_request(req: WireRequest) -> Result<Request, RequestParseError> {
    let method = Method::from_bytes(req.method().as_bytes())
        .map_err(|_| RequestParseError::Method(req.method().to_string()))?;
    let target = req.path().to_string();
    let headers: Vec<(String, String)> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_string(),
                String::from_utf8_lossy(h.value).into_owned(),
            )
        })
        .collect();

    let mut body = Vec::new();
    req.body().read_to_end(&mut body)?;

    let (path, query) = split_target(&target)?;
    let request_id = RequestId::from_header_or_new(
        headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("x-request-id"))
            .map(|(_, value)| value.as_str()),
    );

    debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        headers_count = headers.len(),
        body_size_bytes = body.len(),
        "HTTP request parsed"
    );

    let mut request = Request::from_parts(method, &path, query)
        .with_request_id(request_id)
        .with_body(body);
    for (name, value) in headers {
        request = request.with_header(&name, value);
    }
    Ok(request)
}
