use dashmap::DashMap;
use http::StatusCode;
use may_minihttp::Response as WireResponse;
use once_cell::sync::Lazy;
use tracing::warn;

use crate::dispatcher::Response;

/// `may_minihttp` only accepts `&'static str` header lines, so each distinct line is leaked
/// once and reused. The cap bounds that leak.
const MAX_INTERNED_HEADERS: usize = 4096;

static HEADER_LINES: Lazy<DashMap<String, &'static str>> = Lazy::new(DashMap::new);

fn intern(line: String) -> Option<&'static str> {
    if let Some(existing) = HEADER_LINES.get(&line) {
        return Some(*existing);
    }
    if HEADER_LINES.len() >= MAX_INTERNED_HEADERS {
        return None;
    }
    let leaked: &'static str = Box::leak(line.clone().into_boxed_str());
    Some(*HEADER_LINES.entry(line).or_insert(leaked))
}

#[must_use]
pub fn status_reason(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

fn is_header_safe(s: &str) -> bool {
    !s.contains(['\r', '\n'])
}

/// Write status, headers and body. `content-length` is left to the transport.
pub fn write_response(res: &mut WireResponse, response: Response) {
    res.status_code(response.status as usize, status_reason(response.status));
    for (name, value) in &response.headers {
        if name.eq_ignore_ascii_case("content-length") {
            continue;
        }
        if !is_header_safe(name) || !is_header_safe(value) {
            warn!(header = %name, "Dropping response header containing a line break");
            continue;
        }
        match intern(format!("{name}: {value}")) {
            Some(line) => {
                res.header(line);
            }
            None => warn!(header = %name, "Header intern cache full; dropping header"),
        }
    }
    res.body_vec(response.body);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(404), "Not Found");
        assert_eq!(status_reason(418), "I'm a teapot");
        assert_eq!(status_reason(599), "Unknown");
    }

    #[test]
    fn test_intern_reuses_lines() {
        let a = intern("x-test-intern: 1".to_string()).unwrap();
        let b = intern("x-test-intern: 1".to_string()).unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_header_safety() {
        assert!(is_header_safe("text/plain"));
        assert!(!is_header_safe("a\r\nSet-Cookie: x"));
    }
}
