use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::handler::Handler;
use super::request::Request;
use super::response::Response;
use crate::config::AppConfig;
use crate::console;
use crate::middleware::{chain, Middleware};
use crate::router::{RouteMatch, Router};
use crate::static_files::StaticFiles;

/// A directory served under a URL prefix.
#[derive(Debug, Clone)]
pub struct StaticMount {
    prefix: String,
    files: StaticFiles,
}

impl StaticMount {
    pub fn new(prefix: impl Into<String>, files: StaticFiles) -> Self {
        Self {
            prefix: prefix.into(),
            files,
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn files(&self) -> &StaticFiles {
        &self.files
    }

    fn serve(&self, path: &str) -> Option<Response> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        let file = self.files.resolve(rest)?;
        match std::fs::read(&file) {
            Ok(bytes) => Some(Response::bytes(
                200,
                StaticFiles::content_type(&file),
                bytes,
            )),
            Err(e) => {
                warn!(path = %file.display(), error = %e, "Static file read failed");
                None
            }
        }
    }
}

/// Frozen request pipeline. Cheap to share behind an `Arc` across server coroutines.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
    static_mounts: Vec<StaticMount>,
    entry: Handler,
    config: AppConfig,
}

fn terminal(router: Arc<Router>, not_found: Handler) -> Handler {
    Handler::new(move |req: &Request| match router.route(req.method(), req.path()) {
        Some(RouteMatch { route, path_params }) => {
            req.bind_params(path_params);
            route.endpoint().call(req)
        }
        None => not_found.call(req),
    })
}

impl Dispatcher {
    /// Assemble the pipeline. Application middleware is composed here, once.
    pub fn new(
        router: Router,
        middlewares: &[Middleware],
        not_found: Handler,
        static_mounts: Vec<StaticMount>,
        config: AppConfig,
    ) -> Self {
        let router = Arc::new(router);
        let entry = chain(terminal(Arc::clone(&router), not_found), middlewares);
        Self {
            router,
            static_mounts,
            entry,
            config,
        }
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn static_mounts(&self) -> &[StaticMount] {
        &self.static_mounts
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Print the route table to the console.
    pub fn log_routes(&self) {
        let lines = console::route_table_lines(
            &self.router,
            console::terminal_width(),
            console::stdout_is_terminal(),
        );
        for line in lines {
            println!("{line}");
        }
    }

    fn serve_static(&self, req: &Request) -> Option<Response> {
        self.static_mounts.iter().find_map(|mount| {
            let res = mount.serve(req.path())?;
            debug!(prefix = %mount.prefix(), path = %req.path(), "Served static file");
            Some(res)
        })
    }

    /// Handle one request end to end.
    pub fn dispatch(&self, req: Request) -> Response {
        let start = Instant::now();
        let response = match self.serve_static(&req) {
            Some(res) => res,
            None => self.entry.call(&req),
        };
        let elapsed = start.elapsed();

        info!(
            request_id = %req.request_id(),
            method = %req.method(),
            path = %req.path(),
            status = response.status,
            duration_us = elapsed.as_micros() as u64,
            "Request complete"
        );
        if self.config.development {
            println!(
                "{}",
                console::request_line(
                    req.method(),
                    req.path(),
                    elapsed,
                    console::terminal_width(),
                    console::stdout_is_terminal(),
                )
            );
        }
        response
    }
}
