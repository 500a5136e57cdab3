//! Deterministic cache keys derived from an operation id and its arguments.
//!
//! Every argument is canonicalized to a string first: strings are taken
//! verbatim, numbers and booleans are stringified, and structured values are
//! serialized to JSON with object keys sorted. The canonical strings are then
//! hashed with SHA-256, positional arguments in call order and named
//! arguments sorted by name, each length-prefixed so that argument
//! boundaries cannot alias (`["ab", "c"]` and `["a", "bc"]` hash differently).

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// An argument could not be canonicalized, so the call cannot be cached.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot derive cache key: {0}")]
pub struct KeyError(String);

/// Argument list of a cached operation.
///
/// Built with [`CacheArgs::arg`] for positional values and
/// [`CacheArgs::named`] for named options. Canonicalization failures are
/// recorded rather than raised, and surface from [`CacheArgs::cache_key`].
#[derive(Debug, Clone, Default)]
pub struct CacheArgs {
    positional: Vec<String>,
    named: BTreeMap<String, String>,
    error: Option<KeyError>,
}

impl CacheArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match canonicalize(value) {
            Ok(canonical) => self.positional.push(canonical),
            Err(e) => self.record(e),
        }
        self
    }

    /// Sets a named argument. Setting the same name twice keeps the last value.
    pub fn named<T: Serialize + ?Sized>(mut self, name: &str, value: &T) -> Self {
        match canonicalize(value) {
            Ok(canonical) => {
                self.named.insert(name.to_string(), canonical);
            }
            Err(e) => self.record(e),
        }
        self
    }

    fn record(&mut self, error: KeyError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Key for `operation_id` invoked with these arguments, as
    /// `{namespace}:{operation_id}:{sha256-hex}`.
    pub fn cache_key(&self, namespace: &str, operation_id: &str) -> Result<String, KeyError> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }

        let mut hasher = Sha256::new();
        for value in &self.positional {
            hasher.update(b"p");
            update_prefixed(&mut hasher, value);
        }
        for (name, value) in &self.named {
            hasher.update(b"n");
            update_prefixed(&mut hasher, name);
            update_prefixed(&mut hasher, value);
        }
        let digest = hasher.finalize();

        if namespace.is_empty() {
            Ok(format!("{}:{:x}", operation_id, digest))
        } else {
            Ok(format!("{}:{}:{:x}", namespace, operation_id, digest))
        }
    }
}

fn update_prefixed(hasher: &mut Sha256, value: &str) {
    hasher.update(value.len().to_string().as_bytes());
    hasher.update(b":");
    hasher.update(value.as_bytes());
}

/// Canonical string form of a single argument.
pub fn canonicalize<T: Serialize + ?Sized>(value: &T) -> Result<String, KeyError> {
    let value = serde_json::to_value(value).map_err(|e| KeyError(e.to_string()))?;
    Ok(match value {
        Value::String(s) => s,
        Value::Array(_) | Value::Object(_) => sort_keys(value).to_string(),
        other => other.to_string(),
    })
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
