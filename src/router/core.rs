//! Router table: routes in registration order, first match wins.

use http::Method;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::route::Route;
use crate::dispatcher::PathParams;

/// Result of successfully matching a request to a route.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<Route>,
    pub path_params: PathParams,
}

/// Immutable, ordered route table.
///
/// Routes are tried in registration order; the first route whose method filter and one of
/// whose variants match decides the request. There is no specificity scoring, so register
/// `/users/me` before `/users/{id}`.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Arc<Route>>,
}

impl Router {
    #[must_use]
    pub fn new(routes: Vec<Route>) -> Self {
        let routes: Vec<Arc<Route>> = routes.into_iter().map(Arc::new).collect();

        let routes_summary: Vec<String> = routes
            .iter()
            .take(10)
            .map(|r| format!("{} {}", r.method(), r.pattern().raw()))
            .collect();
        info!(
            routes_count = routes.len(),
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );

        Self { routes }
    }

    #[must_use]
    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find the first route matching `method` and `path`.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        debug!(method = %method, path = %path, "Route match attempt");
        let match_start = Instant::now();

        let result = self.routes.iter().find_map(|route| {
            route
                .matches(method, path)
                .map(|params| (Arc::clone(route), params))
        });
        let duration_us = match_start.elapsed().as_micros();

        match result {
            Some((route, path_params)) => {
                if match_start.elapsed() > std::time::Duration::from_millis(1) {
                    warn!(
                        method = %method,
                        path = %path,
                        route_pattern = %route.pattern().raw(),
                        route_name = %route.display_name(),
                        duration_us,
                        "Slow route matching detected"
                    );
                } else {
                    debug!(
                        method = %method,
                        path = %path,
                        route_pattern = %route.pattern().raw(),
                        route_name = %route.display_name(),
                        path_params = ?path_params,
                        duration_us,
                        "Route matched"
                    );
                }
                Some(RouteMatch { route, path_params })
            }
            None => {
                debug!(method = %method, path = %path, duration_us, "No route matched");
                None
            }
        }
    }
}
