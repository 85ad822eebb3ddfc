use anyhow::{anyhow, Context, Result};
use clap::Parser;
use http::StatusCode;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use waypost::logging::{init_logging, LogConfig};
use waypost::middleware::{trace_requests, RequestMetrics};
use waypost::server::{AppService, HttpServer};
use waypost::{console, AppBuilder, AppConfig, HttpError, Request, Response};
use waypost::{with_errors, ValidationError};

#[derive(Parser)]
#[command(name = "waypost-demo")]
#[command(about = "Demo service for the waypost router", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "WAYPOST_ADDR", default_value = "127.0.0.1:8080")]
    addr: String,

    /// TOML config file; the environment is used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Static mount as PREFIX=DIR, repeatable
    #[arg(long = "public", value_parser = parse_mount)]
    public: Vec<(String, PathBuf)>,
}

fn parse_mount(s: &str) -> Result<(String, PathBuf), String> {
    let (prefix, dir) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PREFIX=DIR, got {s:?}"))?;
    if !prefix.starts_with('/') {
        return Err(format!("mount prefix must start with '/': {prefix:?}"));
    }
    Ok((prefix.to_string(), PathBuf::from(dir)))
}

fn slug(value: &str) -> Result<String, ValidationError> {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        Ok(value.to_string())
    } else {
        Err(ValidationError::new(value, "not a slug"))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_env())?;

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::from_env(),
    };

    let metrics = RequestMetrics::new();
    let mut app = AppBuilder::with_config(config);
    app.use_middleware(trace_requests())
        .use_middleware(metrics.middleware())
        .validator("slug", slug);
    for (prefix, dir) in &cli.public {
        app.public(prefix, dir.clone());
    }

    app.get("/users/{id@int}", |req: &Request| {
        Response::json(200, &json!({ "id": req.param_int("id").ok() }))
    })
    .name("get_user");
    app.get("/posts/{year@int}/{slug@slug}?", |req: &Request| {
        Response::json(
            200,
            &json!({ "year": req.param("year"), "slug": req.param("slug") }),
        )
    })
    .name("posts");
    app.get(
        "/admin",
        with_errors(|req: &Request| {
            match req.header("authorization") {
                Some(_) => Ok(Response::text(200, "welcome")),
                None => Err(HttpError::new(StatusCode::FORBIDDEN, "Forbidden").into()),
            }
        }),
    )
    .name("admin");
    app.post(
        "/upload",
        with_errors(|req: &Request| {
            if req.body().is_empty() {
                return Err(anyhow!("empty upload")).context("saving upload");
            }
            Ok(Response::json(201, &json!({ "bytes": req.body().len() })))
        }),
    )
    .name("upload");
    let stats = Arc::clone(&metrics);
    app.get("/stats", move |_req: &Request| {
        Response::json(
            200,
            &json!({
                "requests": stats.request_count(),
                "client_errors": stats.client_errors(),
                "server_errors": stats.server_errors(),
                "average_latency_us": stats.average_latency().as_micros() as u64,
            }),
        )
    })
    .name("stats");

    let dispatcher = Arc::new(app.build()?);
    let handle = HttpServer(AppService::new(Arc::clone(&dispatcher)))
        .start(cli.addr.as_str())
        .with_context(|| format!("failed to bind {}", cli.addr))?;
    print!("{}", console::banner(&cli.addr, dispatcher.config().development));

    handle
        .join()
        .map_err(|_| anyhow!("server coroutine panicked"))?;
    Ok(())
}
