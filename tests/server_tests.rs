use http::StatusCode;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;
use waypost::server::{AppService, HttpServer, ServerHandle};
use waypost::{with_errors, AppBuilder, AppConfig, HttpError, Request, Response};

fn start_service() -> (ServerHandle, SocketAddr) {
    start_service_with(AppConfig::production())
}

fn start_service_with(config: AppConfig) -> (ServerHandle, SocketAddr) {
    let mut app = AppBuilder::with_config(config);
    app.get("/users/{id@int}", |req: &Request| {
        Response::text(200, format!("user {}", req.param("id").unwrap_or_default()))
    });
    app.get("/files/{name}", |req: &Request| {
        Response::text(200, req.param("name").unwrap_or_default().to_string())
    });
    app.post("/echo", |req: &Request| {
        Response::text(
            200,
            format!(
                "{}|{}",
                String::from_utf8_lossy(req.body()),
                req.query_param("tag").unwrap_or("")
            ),
        )
    });
    app.get(
        "/admin",
        with_errors(|_req: &Request| -> anyhow::Result<Response> {
            Err(HttpError::new(StatusCode::FORBIDDEN, "Forbidden").into())
        }),
    );
    let service = AppService::new(Arc::new(app.build().unwrap()));

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let handle = HttpServer(service).start(addr).unwrap();
    handle.wait_ready().unwrap();
    (handle, addr)
}

fn send_request(addr: &SocketAddr, req: &str) -> String {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(req.as_bytes()).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_millis(200)))
        .unwrap();
    let mut buf = Vec::new();
    loop {
        let mut tmp = [0u8; 1024];
        match stream.read(&mut tmp) {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&tmp[..n]),
            Err(ref e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                break
            }
            Err(e) => panic!("read error: {e:?}"),
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn parse_response(resp: &str) -> (u16, String) {
    let (head, body) = resp.split_once("\r\n\r\n").unwrap_or((resp, ""));
    let status = head
        .lines()
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    (status, body.to_string())
}

#[test]
fn test_routes_over_tcp() {
    let (handle, addr) = start_service();

    let (status, body) = parse_response(&send_request(
        &addr,
        "GET /users/42 HTTP/1.1\r\nHost: x\r\n\r\n",
    ));
    assert_eq!(status, 200);
    assert_eq!(body, "user 42");

    let (status, body) = parse_response(&send_request(
        &addr,
        "GET /users/abc HTTP/1.1\r\nHost: x\r\n\r\n",
    ));
    assert_eq!(status, 404);
    assert_eq!(body, "404 page not found");

    let (status, body) = parse_response(&send_request(
        &addr,
        "GET /admin HTTP/1.1\r\nHost: x\r\n\r\n",
    ));
    assert_eq!(status, 403);
    assert_eq!(body, "Forbidden");

    handle.stop();
}

#[test]
fn test_path_is_percent_decoded() {
    let (handle, addr) = start_service();
    let (status, body) = parse_response(&send_request(
        &addr,
        "GET /files/a%20b HTTP/1.1\r\nHost: x\r\n\r\n",
    ));
    handle.stop();
    assert_eq!(status, 200);
    assert_eq!(body, "a b");
}

#[test]
fn test_body_and_query_reach_handler() {
    let (handle, addr) = start_service();
    let (status, body) = parse_response(&send_request(
        &addr,
        "POST /echo?tag=t1 HTTP/1.1\r\nHost: x\r\nContent-Length: 5\r\n\r\nhello",
    ));
    handle.stop();
    assert_eq!(status, 200);
    assert_eq!(body, "hello|t1");
}

#[test]
fn test_configured_stack_size_serves_requests() {
    let config = AppConfig {
        stack_size: 0x20000,
        ..AppConfig::production()
    };
    let (handle, addr) = start_service_with(config);
    // Other tests may lower it back to the default concurrently, never below.
    assert!(may::config().get_stack_size() >= 0x10000);
    let (status, body) = parse_response(&send_request(
        &addr,
        "GET /users/42 HTTP/1.1\r\nHost: x\r\n\r\n",
    ));
    handle.stop();
    assert_eq!(status, 200);
    assert_eq!(body, "user 42");
}
