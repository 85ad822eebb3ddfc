//! Human-readable console output for development mode: the startup banner, the route table
//! and one line per request.
//!
//! Lines are laid out as
//!
//! ```text
//!  ...GET /users/{id@int} ........................... get_user
//! ```
//!
//! with the method right-aligned to six columns and the dot leader filling the terminal
//! width (never fewer than five dots). Colour is only emitted when stdout is a terminal.

use crossterm::style::{StyledContent, Stylize};
use http::Method;
use std::io::IsTerminal;
use std::time::Duration;

use crate::router::Router;

const METHOD_WIDTH: usize = 6;
const MIN_LEADER: usize = 5;
const FALLBACK_WIDTH: usize = 80;

/// Current terminal width, or 80 columns when stdout is not a terminal.
#[must_use]
pub fn terminal_width() -> usize {
    match crossterm::terminal::size() {
        Ok((cols, _)) if cols > 0 => cols as usize,
        _ => FALLBACK_WIDTH,
    }
}

/// Whether stdout is a terminal, i.e. whether console lines should carry ANSI colours.
#[must_use]
pub fn stdout_is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

fn method_color(method: &str) -> StyledContent<&str> {
    match method {
        "GET" => method.green(),
        "POST" => method.blue(),
        "PUT" => method.cyan(),
        "PATCH" => method.yellow(),
        "DELETE" => method.red(),
        _ => method.magenta(),
    }
}

fn render(method: &str, path: &str, trailer: &str, width: usize, colored: bool) -> String {
    let pad = ".".repeat(METHOD_WIDTH.saturating_sub(method.len()));
    let used = pad.len() + method.len() + path.chars().count() + trailer.chars().count() + 5;
    let leader = ".".repeat(width.saturating_sub(used).max(MIN_LEADER));
    if colored {
        format!(
            " {pad}{} {path} {leader} {} ",
            method_color(method),
            trailer.dark_grey()
        )
    } else {
        format!(" {pad}{method} {path} {leader} {trailer} ")
    }
}

/// One line per route variant, in registration order.
#[must_use]
pub fn route_table_lines(router: &Router, width: usize, colored: bool) -> Vec<String> {
    router
        .routes()
        .iter()
        .flat_map(|route| {
            let method = route.method().to_string();
            let name = route.display_name().to_string();
            route
                .normalized_paths()
                .into_iter()
                .map(move |path| render(&method, &path, &name, width, colored))
        })
        .collect()
}

/// Request echo: method, path and elapsed time.
#[must_use]
pub fn request_line(
    method: &Method,
    path: &str,
    elapsed: Duration,
    width: usize,
    colored: bool,
) -> String {
    render(method.as_str(), path, &format!("{elapsed:?}"), width, colored)
}

/// Startup banner shown by the server binary.
#[must_use]
pub fn banner(addr: &str, development: bool) -> String {
    let mode = if development { "development" } else { "production" };
    let mut out = format!(
        " {} {} {}\n {}\n",
        "waypost".magenta().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).green(),
        mode.yellow(),
        format!("↳ Server listening on {addr}").blue().bold(),
    );
    if development {
        out.push_str(&format!(
            "\n {}\n",
            "Running in development mode. Do not use in production!"
                .red()
                .bold()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{Handler, Request, Response};
    use crate::router::{MethodFilter, Route, RoutePattern};
    use crate::validators::ValidatorRegistry;

    #[test]
    fn test_method_is_right_aligned() {
        let line = render("GET", "/a", "x", 30, false);
        assert!(line.starts_with(" ...GET /a "));
        let line = render("DELETE", "/a", "x", 30, false);
        assert!(line.starts_with(" DELETE /a "));
        let line = render("OPTIONS", "/a", "x", 30, false);
        assert!(line.starts_with(" OPTIONS /a "));
    }

    #[test]
    fn test_leader_fills_width() {
        // 3 + 3 + 3 + 4 + 5 = 18 used, 22 dots left of 40.
        let line = render("GET", "/ab", "name", 40, false);
        assert_eq!(line, format!(" ...GET /ab {} name ", ".".repeat(22)));
    }

    #[test]
    fn test_leader_minimum() {
        let line = render("GET", "/a/very/long/path", "handler", 10, false);
        assert!(line.contains(" ..... handler "));
    }

    fn posts_router() -> Router {
        let mut route = Route::compile(
            MethodFilter::parse("GET", "/posts/{slug}?").unwrap(),
            RoutePattern::parse("/posts/{slug}?").unwrap(),
            Handler::new(|_req: &Request| Response::text(200, "")),
            Vec::new(),
            &ValidatorRegistry::new(),
        )
        .unwrap();
        route.set_name("posts");
        Router::new(vec![route])
    }

    #[test]
    fn test_plain_output_has_no_escape_codes() {
        let lines = route_table_lines(&posts_router(), 60, false);
        assert!(lines.iter().all(|l| !l.contains('\x1b')));
        let line = request_line(&Method::DELETE, "/a", Duration::from_millis(3), 60, false);
        assert!(!line.contains('\x1b'));
        assert!(line.starts_with(" DELETE /a "));
        assert!(line.ends_with(" 3ms "));
    }

    #[test]
    fn test_route_lines_cover_variants() {
        let lines = route_table_lines(&posts_router(), 60, false);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" ...GET /posts/{slug} "));
        assert!(lines[1].starts_with(" ...GET /posts "));
        assert!(lines.iter().all(|l| l.ends_with(" posts ")));
    }
}
