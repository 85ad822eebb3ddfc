use http::Method;
use waypost::middleware::{chain, RequestMetrics};
use waypost::{AppBuilder, AppConfig, Handler, Middleware, Request, Response};

#[test]
fn test_metrics_middleware_counts_outcomes() {
    let metrics = RequestMetrics::new();
    let mut app = AppBuilder::with_config(AppConfig::production());
    app.use_middleware(metrics.middleware());
    app.get("/ok", |_req: &Request| Response::text(200, "ok"));
    app.get("/fail", |_req: &Request| Response::error(503, "down"));
    let dispatcher = app.build().unwrap();

    for path in ["/ok", "/ok", "/fail", "/nope"] {
        let _ = dispatcher.dispatch(Request::new(Method::GET, path));
    }
    assert_eq!(metrics.request_count(), 4);
    assert_eq!(metrics.client_errors(), 1);
    assert_eq!(metrics.server_errors(), 1);
}

#[test]
fn test_short_circuit_skips_inner_layers() {
    let auth = Middleware::new(|next: Handler| {
        Handler::new(move |req: &Request| match req.header("authorization") {
            Some(_) => next.call(req),
            None => Response::error(401, "Unauthorized"),
        })
    });
    let metrics = RequestMetrics::new();
    let handler = chain(
        Handler::new(|_req: &Request| Response::text(200, "secret")),
        &[auth, metrics.middleware()],
    );

    let res = handler.call(&Request::new(Method::GET, "/"));
    assert_eq!(res.status, 401);
    assert_eq!(metrics.request_count(), 0);

    let res = handler.call(&Request::new(Method::GET, "/").with_header("Authorization", "t"));
    assert_eq!(res.body_str(), Some("secret"));
    assert_eq!(metrics.request_count(), 1);
}

#[test]
fn test_middleware_can_rewrite_response() {
    let mut app = AppBuilder::with_config(AppConfig::production());
    app.use_middleware(|next: Handler| {
        Handler::new(move |req: &Request| next.call(req).with_header("x-served-by", "waypost"))
    });
    app.get("/", |_req: &Request| Response::text(200, "home"));
    let dispatcher = app.build().unwrap();

    let res = dispatcher.dispatch(Request::new(Method::GET, "/"));
    assert_eq!(res.get_header("X-Served-By"), Some("waypost"));
    let res = dispatcher.dispatch(Request::new(Method::GET, "/404"));
    assert_eq!(res.get_header("x-served-by"), Some("waypost"));
}
