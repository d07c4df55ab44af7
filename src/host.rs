//! Target host descriptor.
//!
//! A session is bound to exactly one host for its whole lifetime. The host
//! carries a name and an opaque set of connection parameters that this core
//! never interprets; an execution backend may read them to reach the host.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A single target host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    /// Host name (also the key of the result map returned by `run_all`)
    name: String,

    /// Opaque connection parameters (address, port, user, ...)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    params: IndexMap<String, Value>,
}

impl Host {
    /// Creates a host with the given name and no connection parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: IndexMap::new(),
        }
    }

    /// Adds a connection parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Returns the host name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a connection parameter, if set.
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Returns all connection parameters.
    pub fn params(&self) -> &IndexMap<String, Value> {
        &self.params
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_host_params_are_opaque() {
        let host = Host::new("web01")
            .with_param("address", json!("192.0.2.10"))
            .with_param("port", json!(22));

        assert_eq!(host.name(), "web01");
        assert_eq!(host.param("address"), Some(&json!("192.0.2.10")));
        assert_eq!(host.param("missing"), None);
        assert_eq!(host.params().len(), 2);
    }

    #[test]
    fn test_host_display() {
        assert_eq!(Host::new("db01").to_string(), "db01");
    }
}
