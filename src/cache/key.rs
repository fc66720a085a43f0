//! Cache Key Module
//!
//! Derives deterministic cache keys from an operation name and its arguments.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use sha2::{Digest, Sha256};

// == Fingerprint ==
/// Identity of one memoized call: operation name, positional arguments and
/// keyword arguments.
///
/// Keyword arguments are kept sorted by name, so the order in which a call
/// site supplies them never changes the key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fingerprint {
    name: String,
    args: Vec<Value>,
    kwargs: BTreeMap<String, Value>,
}

impl Fingerprint {
    /// Starts a fingerprint for the named operation.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Sets a keyword argument, replacing an earlier one with the same name.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `"<name>:<sha256 hex>"` over the normalized argument document.
    pub fn key(&self) -> String {
        let document = json!({
            "args": self.args,
            "kwargs": self.kwargs,
        });
        let digest = Sha256::digest(document.to_string().as_bytes());
        format!("{}:{:x}", self.name, digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_deterministic() {
        let a = Fingerprint::new("package_info").arg("requests");
        let b = Fingerprint::new("package_info").arg("requests");
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_key_is_prefixed_with_name() {
        let key = Fingerprint::new("package_versions").arg("django").key();
        assert!(key.starts_with("package_versions:"));
        // name + ':' + 64 hex chars
        assert_eq!(key.len(), "package_versions:".len() + 64);
    }

    #[test]
    fn test_keyword_order_does_not_matter() {
        let a = Fingerprint::new("op")
            .arg("pkg")
            .kwarg("version", "1.0")
            .kwarg("extras", true);
        let b = Fingerprint::new("op")
            .arg("pkg")
            .kwarg("extras", true)
            .kwarg("version", "1.0");
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_different_arguments_differ() {
        let base = Fingerprint::new("op").arg("pkg").kwarg("version", "1.0");
        let other_kwarg = Fingerprint::new("op").arg("pkg").kwarg("version", "2.0");
        let other_arg = Fingerprint::new("op").arg("other").kwarg("version", "1.0");
        let other_name = Fingerprint::new("op2").arg("pkg").kwarg("version", "1.0");

        assert_ne!(base.key(), other_kwarg.key());
        assert_ne!(base.key(), other_arg.key());
        assert_ne!(base.key(), other_name.key());
    }

    #[test]
    fn test_positional_order_matters() {
        let a = Fingerprint::new("op").arg("x").arg("y");
        let b = Fingerprint::new("op").arg("y").arg("x");
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_absent_optional_is_distinct_from_empty_string() {
        let none = Fingerprint::new("op").kwarg("version", None::<&str>);
        let empty = Fingerprint::new("op").kwarg("version", "");
        assert_ne!(none.key(), empty.key());
    }
}
