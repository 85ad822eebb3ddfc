//! Route pattern compiler.
//!
//! Turns a declared pattern such as `/posts/{year@int}/{slug}?` into its ordered
//! variants and per-variant segment descriptors.
//!
//! Optional segments expand to `N + 1` variants rather than every combination: the full
//! form first, then one variant per optional token (in source order) with only that token
//! removed. `/a/{b}?/{c}?` therefore yields `/a/{b}/{c}`, `/a/{c}` and `/a/{b}`, but not
//! `/a`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::error::RouteError;

static OPTIONAL_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^}]+\}\?").expect("static regex"));

/// One `/`-delimited unit of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matched by exact string equality.
    Static(String),
    /// Named parameter; validators run left to right.
    Param { name: String, validators: Vec<String> },
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Static(literal) => f.write_str(literal),
            Segment::Param { name, validators } if validators.is_empty() => {
                write!(f, "{{{name}}}")
            }
            Segment::Param { name, validators } => {
                write!(f, "{{{name}@{}}}", validators.join(","))
            }
        }
    }
}

/// A compiled pattern: the declared text plus its variants in match-precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    variants: Vec<Vec<Segment>>,
}

impl RoutePattern {
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let raw = raw.trim();
        if !raw.starts_with('/') {
            return Err(RouteError::InvalidPattern {
                pattern: raw.to_string(),
                reason: "pattern must start with '/'".to_string(),
            });
        }
        if raw
            .char_indices()
            .any(|(i, c)| c == '?' && !raw[..i].ends_with('}'))
        {
            return Err(RouteError::InvalidPattern {
                pattern: raw.to_string(),
                reason: "'?' is only allowed right after a closing '}'".to_string(),
            });
        }
        let variants = expand_optional(raw)
            .iter()
            .map(|variant| parse_segments(raw, variant))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            raw: raw.to_string(),
            variants,
        })
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn variants(&self) -> &[Vec<Segment>] {
        &self.variants
    }

    /// Canonical `/literal/{name}` rendering of every variant, one entry per variant.
    ///
    /// A variant that reduces to the root is listed as `/` rather than skipped, so
    /// `/{page}?` reports both `/{page}` and `/`.
    #[must_use]
    pub fn normalized_paths(&self) -> Vec<String> {
        self.variants.iter().map(|segments| render(segments)).collect()
    }
}

fn render(segments: &[Segment]) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }
    segments.iter().fold(String::new(), |mut path, segment| {
        path.push('/');
        path.push_str(&segment.to_string());
        path
    })
}

/// Expand optional `{..}?` tokens into the full variant plus one single-removal variant per
/// token.
#[must_use]
pub fn expand_optional(raw: &str) -> Vec<String> {
    let tokens: Vec<_> = OPTIONAL_TOKEN.find_iter(raw).collect();
    if tokens.is_empty() {
        return vec![raw.to_string()];
    }

    let mut variants = Vec::with_capacity(tokens.len() + 1);
    variants.push(raw.replace('?', ""));
    for token in tokens {
        let mut without = String::with_capacity(raw.len());
        without.push_str(&raw[..token.start()]);
        without.push_str(&raw[token.end()..]);

        let mut collapsed = collapse_slashes(&without);
        if collapsed != "/" && collapsed.ends_with('/') {
            collapsed.pop();
        }
        variants.push(collapsed.replace('?', ""));
    }
    variants
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for c in path.chars() {
        if c == '/' && prev_slash {
            continue;
        }
        prev_slash = c == '/';
        out.push(c);
    }
    out
}

/// Split one variant into typed segments.
fn parse_segments(pattern: &str, variant: &str) -> Result<Vec<Segment>, RouteError> {
    let trimmed = variant.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    trimmed
        .split('/')
        .map(|part| parse_segment(pattern, part))
        .collect()
}

fn parse_segment(pattern: &str, part: &str) -> Result<Segment, RouteError> {
    let invalid = |reason: &str| RouteError::InvalidSegment {
        pattern: pattern.to_string(),
        segment: part.to_string(),
        reason: reason.to_string(),
    };

    if part.is_empty() {
        return Err(invalid("empty segment"));
    }

    let Some(inner) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) else {
        if part.contains(['{', '}']) {
            return Err(invalid("parameter braces must wrap the whole segment"));
        }
        if part.contains('?') {
            return Err(invalid("'?' is only allowed right after a closing '}'"));
        }
        return Ok(Segment::Static(part.to_string()));
    };

    if inner.contains(['{', '}', '?']) {
        return Err(invalid("nested braces or misplaced '?'"));
    }

    let (name, validators) = match inner.split_once('@') {
        Some((name, list)) => {
            if list.is_empty() {
                return Err(invalid("missing validator list after '@'"));
            }
            let validators: Vec<String> = list.split(',').map(|v| v.trim().to_string()).collect();
            if validators.iter().any(String::is_empty) {
                return Err(invalid("empty validator name"));
            }
            (name, validators)
        }
        None => (inner, Vec::new()),
    };

    if name.trim().is_empty() {
        return Err(invalid("empty parameter name"));
    }

    Ok(Segment::Param {
        name: name.trim().to_string(),
        validators,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, validators: &[&str]) -> Segment {
        Segment::Param {
            name: name.to_string(),
            validators: validators.iter().map(|v| v.to_string()).collect(),
        }
    }

    fn lit(s: &str) -> Segment {
        Segment::Static(s.to_string())
    }

    #[test]
    fn test_no_optional_single_variant() {
        assert_eq!(expand_optional("/users/{id@int}"), vec!["/users/{id@int}"]);
        let p = RoutePattern::parse("/users/{id@int}").unwrap();
        assert_eq!(p.variants().len(), 1);
        assert_eq!(p.variants()[0], vec![lit("users"), param("id", &["int"])]);
    }

    #[test]
    fn test_single_optional_two_variants() {
        assert_eq!(
            expand_optional("/posts/{year}/{slug}?"),
            vec!["/posts/{year}/{slug}", "/posts/{year}"]
        );
    }

    #[test]
    fn test_n_optionals_yield_n_plus_one_variants() {
        // Combinations of absent optionals (here `/a`) are not generated.
        assert_eq!(
            expand_optional("/a/{b}?/{c}?"),
            vec!["/a/{b}/{c}", "/a/{c}", "/a/{b}"]
        );
        assert_eq!(
            expand_optional("/{a}?/{b}?/{c}?").len(),
            4,
        );
    }

    #[test]
    fn test_removed_middle_optional_collapses_slashes() {
        assert_eq!(
            expand_optional("/a/{b@int}?/c"),
            vec!["/a/{b@int}/c", "/a/c"]
        );
    }

    #[test]
    fn test_only_optional_reduces_to_root() {
        let p = RoutePattern::parse("/{page}?").unwrap();
        assert_eq!(p.variants().len(), 2);
        assert_eq!(p.variants()[0], vec![param("page", &[])]);
        assert!(p.variants()[1].is_empty());
        assert_eq!(p.normalized_paths(), vec!["/{page}", "/"]);
    }

    #[test]
    fn test_root_has_zero_segments() {
        let p = RoutePattern::parse("/").unwrap();
        assert_eq!(p.variants(), &[Vec::<Segment>::new()]);
        assert_eq!(p.normalized_paths(), vec!["/"]);
    }

    #[test]
    fn test_validator_chain_parsed_in_order() {
        let p = RoutePattern::parse("/files/{name@alpha,lower}").unwrap();
        assert_eq!(
            p.variants()[0][1],
            param("name", &["alpha", "lower"])
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let p = RoutePattern::parse("/users/").unwrap();
        assert_eq!(p.variants()[0], vec![lit("users")]);
    }

    #[test]
    fn test_normalized_paths_keep_validators() {
        let p = RoutePattern::parse("/posts/{year@int}/{slug}?").unwrap();
        assert_eq!(
            p.normalized_paths(),
            vec!["/posts/{year@int}/{slug}", "/posts/{year@int}"]
        );
    }

    #[test]
    fn test_normalized_path_recompiles_to_same_variant() {
        let p = RoutePattern::parse("/a/{b@int,alpha}/c/{d}?").unwrap();
        let again = RoutePattern::parse(&p.normalized_paths()[0]).unwrap();
        assert_eq!(again.variants().len(), 1);
        assert_eq!(again.variants()[0], p.variants()[0]);
    }

    #[test]
    fn test_malformed_patterns_rejected() {
        for bad in [
            "/users/{id@}",
            "/users/{id@int,}",
            "/users/{}",
            "/users/{@int}",
            "/users/{id",
            "/users/id}",
            "/users/x{id}",
            "/users/{id}x",
            "/users/a?",
            "/users//posts",
            "users/{id}",
        ] {
            assert!(RoutePattern::parse(bad).is_err(), "expected error for {bad}");
        }
    }

    #[test]
    fn test_missing_leading_slash_error() {
        let err = RoutePattern::parse("users").unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { .. }));
    }
}
