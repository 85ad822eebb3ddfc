use http::Method;
use once_cell::sync::Lazy;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use tracing::warn;

use crate::ids::RequestId;

/// Maximum number of path parameters or headers before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header storage: lowercase-insensitive lookups over a small inline vector.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Path parameters extracted by a matched route.
///
/// Names are shared with the compiled route (`Arc<str>`); values are the outputs of the
/// segment's validator chain. Inserting an existing name overwrites its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    entries: SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>,
}

static NO_PARAMS: Lazy<PathParams> = Lazy::new(PathParams::default);

impl PathParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: Arc<str>, value: String) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    /// Allocating copy for callers that want a map.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

/// Error reading a typed path parameter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    #[error("parameter {0} not found")]
    Missing(String),
    #[error("parameter {name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: String,
        value: String,
        reason: String,
    },
}

/// An inbound request as seen by middleware and handlers.
#[derive(Debug)]
pub struct Request {
    request_id: RequestId,
    method: Method,
    path: String,
    query_params: HashMap<String, String>,
    headers: HeaderVec,
    body: Vec<u8>,
    params: OnceLock<PathParams>,
}

impl Request {
    /// Build a request from a method and a request target; anything after `?` is parsed
    /// as the query string.
    pub fn new(method: Method, target: &str) -> Self {
        match target.split_once('?') {
            Some((path, query)) => Self::from_parts(method, path, Some(query)),
            None => Self::from_parts(method, target, None),
        }
    }

    /// Build a request from an already-decoded path and a raw query string.
    pub fn from_parts(method: Method, path: &str, query: Option<&str>) -> Self {
        let query_params = query
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();
        let path = if path.is_empty() { "/" } else { path };
        Self {
            request_id: RequestId::new(),
            method,
            path: path.to_string(),
            query_params,
            headers: HeaderVec::new(),
            body: Vec::new(),
            params: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .push((Arc::from(name.to_ascii_lowercase().as_str()), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderVec {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Parameters bound by the matched route; empty before routing or when nothing matched.
    #[must_use]
    pub fn params(&self) -> &PathParams {
        self.params.get().unwrap_or(&NO_PARAMS)
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params().get(name)
    }

    pub fn param_int(&self, name: &str) -> Result<i64, ParamError> {
        self.param_parse::<i64>(name)
    }

    pub fn param_parse<T>(&self, name: &str) -> Result<T, ParamError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let value = self
            .param(name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ParamError::Missing(name.to_string()))?;
        value.parse::<T>().map_err(|e| ParamError::Invalid {
            name: name.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
    }

    /// Attach the matched route's parameters. Only the first binding sticks.
    pub(crate) fn bind_params(&self, params: PathParams) {
        if self.params.set(params).is_err() {
            warn!(
                request_id = %self.request_id,
                path = %self.path,
                "Path parameters already bound; keeping the first binding"
            );
        }
    }
}
