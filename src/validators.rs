//! # Validator Registry
//!
//! Named, pure checks that a dynamic path segment must pass before a route matches.
//! A validator either rejects the value or returns it (possibly transformed); chains such
//! as `{id@int,positive}` feed each validator the previous one's output.
//!
//! Every registry starts with the built-ins:
//!
//! | name           | accepts                                             |
//! |----------------|-----------------------------------------------------|
//! | `int`          | base-10 signed 64-bit integers (`-7`, `+42`, `0`)   |
//! | `bool`         | `1 t T TRUE true True 0 f F FALSE false False`      |
//! | `uuid`         | any UUID version, hyphenated or simple              |
//! | `alpha`        | `^[A-Za-z]+$`                                       |
//! | `alphanumeric` | `^[A-Za-z0-9]+$`                                    |
//!
//! Names are resolved to function values once, when the route table is built, so an
//! unknown name fails startup instead of the first request that reaches it.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Why a segment value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("value {value:?} rejected: {reason}")]
pub struct ValidationError {
    pub value: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(value: &str, reason: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// A shareable segment validator.
pub type ValidatorFn = Arc<dyn Fn(&str) -> Result<String, ValidationError> + Send + Sync>;

static ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]+$").expect("static regex"));
static ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("static regex"));

const BOOL_TOKENS: [&str; 12] = [
    "1", "t", "T", "TRUE", "true", "True", "0", "f", "F", "FALSE", "false", "False",
];

fn validate_int(value: &str) -> Result<String, ValidationError> {
    value
        .parse::<i64>()
        .map(|_| value.to_string())
        .map_err(|e| ValidationError::new(value, e.to_string()))
}

fn validate_bool(value: &str) -> Result<String, ValidationError> {
    if BOOL_TOKENS.contains(&value) {
        Ok(value.to_string())
    } else {
        Err(ValidationError::new(value, "not a boolean"))
    }
}

fn validate_uuid(value: &str) -> Result<String, ValidationError> {
    uuid::Uuid::parse_str(value)
        .map(|_| value.to_string())
        .map_err(|e| ValidationError::new(value, e.to_string()))
}

fn validate_alpha(value: &str) -> Result<String, ValidationError> {
    if ALPHA.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(ValidationError::new(value, "param is not alpha"))
    }
}

fn validate_alphanumeric(value: &str) -> Result<String, ValidationError> {
    if ALPHANUMERIC.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(ValidationError::new(value, "param is not alphanumeric"))
    }
}

/// Name → validator mapping. Registering an existing name replaces it.
#[derive(Clone)]
pub struct ValidatorRegistry {
    validators: HashMap<String, ValidatorFn>,
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ValidatorRegistry")
            .field("validators", &names)
            .finish()
    }
}

impl ValidatorRegistry {
    /// A registry seeded with the built-in validators.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("int", validate_int);
        registry.register("bool", validate_bool);
        registry.register("uuid", validate_uuid);
        registry.register("alpha", validate_alpha);
        registry.register("alphanumeric", validate_alphanumeric);
        registry
    }

    /// A registry without any validators.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            validators: HashMap::new(),
        }
    }

    pub fn register<F>(&mut self, name: &str, validator: F)
    where
        F: Fn(&str) -> Result<String, ValidationError> + Send + Sync + 'static,
    {
        if self
            .validators
            .insert(name.to_string(), Arc::new(validator))
            .is_some()
        {
            tracing::debug!(validator = %name, "Validator replaced");
        }
    }

    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<ValidatorFn> {
        self.validators.get(name).map(Arc::clone)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(registry: &ValidatorRegistry, name: &str, value: &str) -> Result<String, ValidationError> {
        let validator = registry.resolve(name).expect("validator registered");
        validator(value)
    }

    #[test]
    fn test_int_validator() {
        let r = ValidatorRegistry::new();
        assert_eq!(run(&r, "int", "42").unwrap(), "42");
        assert_eq!(run(&r, "int", "-7").unwrap(), "-7");
        assert_eq!(run(&r, "int", "+3").unwrap(), "+3");
        assert!(run(&r, "int", "abc").is_err());
        assert!(run(&r, "int", "4.2").is_err());
        assert!(run(&r, "int", "").is_err());
    }

    #[test]
    fn test_bool_validator() {
        let r = ValidatorRegistry::new();
        for token in BOOL_TOKENS {
            assert_eq!(run(&r, "bool", token).unwrap(), token);
        }
        assert!(run(&r, "bool", "yes").is_err());
        assert!(run(&r, "bool", "tRUE").is_err());
    }

    #[test]
    fn test_uuid_validator_is_version_agnostic() {
        let r = ValidatorRegistry::new();
        // v1 and v4
        assert!(run(&r, "uuid", "c232ab00-9414-11ec-b3c8-9e6bdeced846").is_ok());
        assert!(run(&r, "uuid", "67e55044-10b1-426f-9247-bb680e5fe0c8").is_ok());
        assert!(run(&r, "uuid", "67e55044-10b1-426f").is_err());
    }

    #[test]
    fn test_alpha_and_alphanumeric() {
        let r = ValidatorRegistry::new();
        assert!(run(&r, "alpha", "Hello").is_ok());
        assert!(run(&r, "alpha", "Hello1").is_err());
        assert!(run(&r, "alphanumeric", "Hello1").is_ok());
        assert!(run(&r, "alphanumeric", "Hello-1").is_err());
        assert!(run(&r, "alpha", "").is_err());
    }

    #[test]
    fn test_last_registration_wins() {
        let mut r = ValidatorRegistry::new();
        r.register("int", |v: &str| Ok(format!("n{v}")));
        assert_eq!(run(&r, "int", "abc").unwrap(), "nabc");
    }

    #[test]
    fn test_empty_registry_resolves_nothing() {
        let r = ValidatorRegistry::empty();
        assert!(r.resolve("int").is_none());
        assert!(!r.contains("uuid"));
    }
}
