//! Playbook loading.
//!
//! The session does not parse playbook syntax itself; it consumes a
//! [`Loader`] collaborator that turns source text into play objects. The
//! built-in [`YamlLoader`] covers the YAML form described in
//! [`crate::playbook`]; callers with other playbook languages supply their
//! own implementation.

use crate::error::{Error, Result};
use crate::playbook::Play;

/// Turns playbook source text into an ordered sequence of plays.
pub trait Loader: Send + Sync {
    /// Parses `source` into plays, in playbook order.
    fn load(&self, source: &str) -> Result<Vec<Play>>;
}

/// Loader for YAML playbooks.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlLoader;

impl YamlLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Loader for YamlLoader {
    fn load(&self, source: &str) -> Result<Vec<Play>> {
        // An empty document is an empty playbook, not a parse error.
        let trimmed = source.trim();
        if trimmed.is_empty() || trimmed == "---" {
            return Ok(Vec::new());
        }

        serde_yaml::from_str(source)
            .map_err(|e| Error::playbook_parse(e.to_string(), Some(Box::new(e))))
    }
}
