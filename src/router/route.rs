use http::Method;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use super::pattern::{RoutePattern, Segment};
use crate::dispatcher::{Handler, PathParams};
use crate::error::RouteError;
use crate::middleware::{chain, Middleware};
use crate::validators::{ValidatorFn, ValidatorRegistry};

/// Which request methods a route answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFilter {
    /// Declared as `*`.
    Any,
    Exact(Method),
}

impl MethodFilter {
    pub fn parse(method: &str, pattern: &str) -> Result<Self, RouteError> {
        let method = method.trim();
        if method == "*" {
            return Ok(MethodFilter::Any);
        }
        Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map(MethodFilter::Exact)
            .map_err(|_| RouteError::InvalidMethod {
                method: method.to_string(),
                pattern: pattern.to_string(),
            })
    }

    #[must_use]
    pub fn allows(&self, method: &Method) -> bool {
        match self {
            MethodFilter::Any => true,
            MethodFilter::Exact(m) => m == method,
        }
    }
}

impl fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodFilter::Any => f.write_str("*"),
            MethodFilter::Exact(m) => f.write_str(m.as_str()),
        }
    }
}

/// Segment with its validators already resolved to functions.
#[derive(Clone)]
enum CompiledSegment {
    Static(String),
    Param {
        name: Arc<str>,
        chain: Vec<ValidatorFn>,
    },
}

fn compile_variant(
    pattern: &RoutePattern,
    segments: &[Segment],
    validators: &ValidatorRegistry,
) -> Result<Vec<CompiledSegment>, RouteError> {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Static(literal) => Ok(CompiledSegment::Static(literal.clone())),
            Segment::Param {
                name,
                validators: names,
            } => {
                let chain = names
                    .iter()
                    .map(|v| {
                        validators
                            .resolve(v)
                            .ok_or_else(|| RouteError::UnknownValidator {
                                pattern: pattern.raw().to_string(),
                                param: name.clone(),
                                validator: v.clone(),
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(CompiledSegment::Param {
                    name: Arc::from(name.as_str()),
                    chain,
                })
            }
        })
        .collect()
}

/// Split a request path into segments; the root is the empty list.
fn split_path(path: &str) -> SmallVec<[&str; 8]> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        SmallVec::new()
    } else {
        trimmed.split('/').collect()
    }
}

/// A registered route: method filter, compiled pattern, handler and route middleware.
///
/// The handler is composed with the route middleware once, at construction.
pub struct Route {
    name: String,
    method: MethodFilter,
    pattern: RoutePattern,
    compiled: Vec<Vec<CompiledSegment>>,
    handler: Handler,
    middlewares: Vec<Middleware>,
    endpoint: Handler,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.display_name())
            .field("method", &self.method)
            .field("pattern", &self.pattern.raw())
            .field("variants", &self.compiled.len())
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}

impl Route {
    /// Compile a route, resolving every validator name against `validators`.
    pub fn compile(
        method: MethodFilter,
        pattern: RoutePattern,
        handler: Handler,
        middlewares: Vec<Middleware>,
        validators: &ValidatorRegistry,
    ) -> Result<Self, RouteError> {
        let compiled = pattern
            .variants()
            .iter()
            .map(|segments| compile_variant(&pattern, segments, validators))
            .collect::<Result<Vec<_>, _>>()?;
        let endpoint = chain(handler.clone(), &middlewares);
        Ok(Self {
            name: String::new(),
            method,
            pattern,
            compiled,
            handler,
            middlewares,
            endpoint,
        })
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name, or `unnamed` when none was given.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "unnamed"
        } else {
            &self.name
        }
    }

    #[must_use]
    pub fn method(&self) -> &MethodFilter {
        &self.method
    }

    #[must_use]
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    #[must_use]
    pub fn normalized_paths(&self) -> Vec<String> {
        self.pattern.normalized_paths()
    }

    #[must_use]
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    #[must_use]
    pub fn middlewares(&self) -> &[Middleware] {
        &self.middlewares
    }

    /// Handler wrapped in the route middleware.
    #[must_use]
    pub fn endpoint(&self) -> &Handler {
        &self.endpoint
    }

    /// Match a request against this route's variants in precedence order.
    ///
    /// A validator rejection only disqualifies the variant it occurred in.
    #[must_use]
    pub fn matches(&self, method: &Method, path: &str) -> Option<PathParams> {
        if !self.method.allows(method) {
            return None;
        }
        let parts = split_path(path);
        self.compiled
            .iter()
            .filter(|variant| variant.len() == parts.len())
            .find_map(|variant| match_variant(variant, &parts))
    }
}

fn match_variant(variant: &[CompiledSegment], parts: &[&str]) -> Option<PathParams> {
    let mut params = PathParams::new();
    for (segment, part) in variant.iter().zip(parts) {
        match segment {
            CompiledSegment::Static(literal) => {
                if literal != part {
                    return None;
                }
            }
            CompiledSegment::Param { name, chain } => {
                let mut value = (*part).to_string();
                for validator in chain {
                    value = validator(&value).ok()?;
                }
                params.insert(Arc::clone(name), value);
            }
        }
    }
    Some(params)
}
