use std::path::PathBuf;
use tracing::{debug, info};

use super::core::{Dispatcher, StaticMount};
use super::handler::{Handler, IntoHandler};
use super::request::Request;
use super::response::Response;
use crate::config::AppConfig;
use crate::error::RouteError;
use crate::middleware::{IntoMiddleware, Middleware};
use crate::router::{MethodFilter, Route, RoutePattern, Router};
use crate::static_files::StaticFiles;
use crate::validators::{ValidationError, ValidatorRegistry};

/// A route as registered, before compilation.
#[derive(Debug)]
pub struct RouteEntry {
    method: String,
    pattern: String,
    name: String,
    handler: Handler,
    middlewares: Vec<Middleware>,
}

impl RouteEntry {
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    /// Append route middleware. The first one added is the outermost.
    pub fn middleware(&mut self, middleware: impl IntoMiddleware) -> &mut Self {
        self.middlewares.push(middleware.into_middleware());
        self
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn compile(self, validators: &ValidatorRegistry) -> Result<Route, RouteError> {
        let method = MethodFilter::parse(&self.method, &self.pattern)?;
        let pattern = RoutePattern::parse(&self.pattern)?;
        let mut route = Route::compile(method, pattern, self.handler, self.middlewares, validators)?;
        route.set_name(self.name);
        Ok(route)
    }
}

/// Mutable application setup.
///
/// Validators, routes, middleware and static mounts may be registered in any order; all
/// names are resolved by [`AppBuilder::build`].
#[derive(Debug)]
pub struct AppBuilder {
    config: AppConfig,
    validators: ValidatorRegistry,
    routes: Vec<RouteEntry>,
    middlewares: Vec<Middleware>,
    mounts: Vec<(String, PathBuf)>,
    not_found: Option<Handler>,
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    #[must_use]
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            validators: ValidatorRegistry::new(),
            routes: Vec::new(),
            middlewares: Vec::new(),
            mounts: Vec::new(),
            not_found: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Register a named validator, replacing any existing one with that name.
    pub fn validator<F>(&mut self, name: &str, validator: F) -> &mut Self
    where
        F: Fn(&str) -> Result<String, ValidationError> + Send + Sync + 'static,
    {
        self.validators.register(name, validator);
        self
    }

    /// Register a route. `method` is an HTTP method name or `*` for any method.
    pub fn handle(
        &mut self,
        method: &str,
        pattern: &str,
        handler: impl IntoHandler,
    ) -> &mut RouteEntry {
        debug!(method, pattern, "Route registered");
        let index = self.routes.len();
        self.routes.push(RouteEntry {
            method: method.to_string(),
            pattern: pattern.to_string(),
            name: String::new(),
            handler: handler.into_handler(),
            middlewares: Vec::new(),
        });
        &mut self.routes[index]
    }

    pub fn get(&mut self, pattern: &str, handler: impl IntoHandler) -> &mut RouteEntry {
        self.handle("GET", pattern, handler)
    }

    pub fn post(&mut self, pattern: &str, handler: impl IntoHandler) -> &mut RouteEntry {
        self.handle("POST", pattern, handler)
    }

    pub fn put(&mut self, pattern: &str, handler: impl IntoHandler) -> &mut RouteEntry {
        self.handle("PUT", pattern, handler)
    }

    pub fn patch(&mut self, pattern: &str, handler: impl IntoHandler) -> &mut RouteEntry {
        self.handle("PATCH", pattern, handler)
    }

    pub fn delete(&mut self, pattern: &str, handler: impl IntoHandler) -> &mut RouteEntry {
        self.handle("DELETE", pattern, handler)
    }

    pub fn head(&mut self, pattern: &str, handler: impl IntoHandler) -> &mut RouteEntry {
        self.handle("HEAD", pattern, handler)
    }

    pub fn options(&mut self, pattern: &str, handler: impl IntoHandler) -> &mut RouteEntry {
        self.handle("OPTIONS", pattern, handler)
    }

    /// Register a route matching every method.
    pub fn any(&mut self, pattern: &str, handler: impl IntoHandler) -> &mut RouteEntry {
        self.handle("*", pattern, handler)
    }

    /// Append application middleware. The first one added is the outermost.
    pub fn use_middleware(&mut self, middleware: impl IntoMiddleware) -> &mut Self {
        self.middlewares.push(middleware.into_middleware());
        self
    }

    /// Serve files from `dir` under `prefix`. Mounting an existing prefix again replaces
    /// its directory and keeps its position.
    pub fn public(&mut self, prefix: &str, dir: impl Into<PathBuf>) -> &mut Self {
        let dir = dir.into();
        match self.mounts.iter_mut().find(|(p, _)| p == prefix) {
            Some(existing) => existing.1 = dir,
            None => self.mounts.push((prefix.to_string(), dir)),
        }
        self
    }

    pub fn not_found(&mut self, handler: impl IntoHandler) -> &mut Self {
        self.not_found = Some(handler.into_handler());
        self
    }

    /// Compile every route and freeze the pipeline.
    pub fn build(self) -> Result<Dispatcher, RouteError> {
        let Self {
            config,
            validators,
            routes,
            middlewares,
            mounts,
            not_found,
        } = self;

        let routes = routes
            .into_iter()
            .map(|entry| entry.compile(&validators))
            .collect::<Result<Vec<_>, _>>()?;
        let router = Router::new(routes);

        let static_mounts = mounts
            .into_iter()
            .map(|(prefix, dir)| StaticMount::new(prefix, StaticFiles::new(dir)))
            .collect::<Vec<_>>();
        let not_found = not_found
            .unwrap_or_else(|| Handler::new(|_req: &Request| Response::not_found()));

        info!(
            routes = router.len(),
            middlewares = middlewares.len(),
            static_mounts = static_mounts.len(),
            development = config.development,
            "Dispatcher built"
        );

        let dispatcher = Dispatcher::new(router, &middlewares, not_found, static_mounts, config);
        if config.log_routes {
            dispatcher.log_routes();
        }
        Ok(dispatcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn quiet() -> AppBuilder {
        AppBuilder::with_config(AppConfig::production())
    }

    #[test]
    fn test_unknown_validator_fails_build() {
        let mut app = quiet();
        app.get("/u/{id@nope}", |_req: &Request| Response::text(200, ""));
        let err = app.build().unwrap_err();
        assert!(matches!(err, RouteError::UnknownValidator { ref validator, .. } if validator == "nope"));
    }

    #[test]
    fn test_validator_registered_after_route() {
        let mut app = quiet();
        app.get("/u/{code@upper}", |req: &Request| {
            Response::text(200, req.param("code").unwrap_or_default().to_string())
        });
        app.validator("upper", |v: &str| Ok(v.to_uppercase()));
        let dispatcher = app.build().unwrap();
        let res = dispatcher.dispatch(Request::new(Method::GET, "/u/abc"));
        assert_eq!(res.body_str(), Some("ABC"));
    }

    #[test]
    fn test_invalid_method_fails_build() {
        let mut app = quiet();
        app.handle("GE T", "/x", |_req: &Request| Response::text(200, ""));
        assert!(matches!(app.build(), Err(RouteError::InvalidMethod { .. })));
    }

    #[test]
    fn test_remount_keeps_position() {
        let mut app = quiet();
        app.public("/a", "one").public("/b", "two").public("/a", "three");
        let dispatcher = app.build().unwrap();
        let mounts: Vec<_> = dispatcher
            .static_mounts()
            .iter()
            .map(|m| (m.prefix().to_string(), m.files().base_dir().to_path_buf()))
            .collect();
        assert_eq!(
            mounts,
            vec![
                ("/a".to_string(), PathBuf::from("three")),
                ("/b".to_string(), PathBuf::from("two")),
            ]
        );
    }

    #[test]
    fn test_route_names_survive_build() {
        let mut app = quiet();
        app.get("/a", |_req: &Request| Response::text(200, "")).name("a");
        app.post("/b", |_req: &Request| Response::text(200, ""));
        let dispatcher = app.build().unwrap();
        let names: Vec<_> = dispatcher
            .router()
            .routes()
            .iter()
            .map(|r| r.display_name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "unnamed"]);
    }
}
