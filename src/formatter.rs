//! Result formatting dispatch.
//!
//! Raw task results are reshaped before they reach the caller. The registry
//! maps a module name to a formatter callable; modules without one go
//! through [`default_format`], which lifts the `invocation` sub-map to the
//! top and tags it with the module and task names. A formatter receives the
//! runtime session handle, the task, and the raw result, and may
//! restructure the emitted shape arbitrarily.
//!
//! Formatters must not fail: a formatter error aborts the whole run rather
//! than being folded into the result stream.

use serde_json::Value;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::executor::task::RawResult;
use crate::playbook::Task;
use crate::session::RuntimeSession;

/// A result formatter callable.
pub type Formatter =
    Box<dyn Fn(&RuntimeSession, &Task, RawResult) -> Result<Value> + Send + Sync>;

/// Registry mapping module names to result formatters.
#[derive(Default)]
pub struct FormatterRegistry {
    formatters: HashMap<String, Formatter>,
}

impl FormatterRegistry {
    /// Creates an empty registry; every module falls back to the default
    /// formatter.
    pub fn new() -> Self {
        Self {
            formatters: HashMap::new(),
        }
    }

    /// Registers a formatter for a module name, replacing any existing one.
    pub fn register(&mut self, module: impl Into<String>, formatter: Formatter) {
        self.formatters.insert(module.into(), formatter);
    }

    /// Returns true if a custom formatter is registered for the module.
    pub fn contains(&self, module: &str) -> bool {
        self.formatters.contains_key(module)
    }

    /// Formats a raw result through the module's formatter or the default.
    pub fn format(
        &self,
        session: &RuntimeSession,
        task: &Task,
        raw: RawResult,
    ) -> Result<Value> {
        match self.formatters.get(task.action.as_str()) {
            Some(formatter) => formatter(session, task, raw),
            None => default_format(task, raw),
        }
    }
}

impl std::fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("modules", &self.formatters.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Default result formatter.
///
/// Pops the `invocation` sub-map out of the raw result, injects `modname`
/// and `taskname`, and emits `{"invocation": .., "result": ..}` with the
/// remaining fields under `result`. The task runner guarantees the
/// `invocation` key is present; its absence is a programming error.
pub fn default_format(task: &Task, mut raw: RawResult) -> Result<Value> {
    debug_assert!(
        raw.contains_key("invocation"),
        "task runner must attach an invocation map before formatting"
    );

    let invocation = raw
        .remove("invocation")
        .ok_or_else(|| Error::MissingInvocation {
            task: task.name.clone(),
            module: task.action.clone(),
        })?;

    let mut invocation = match invocation {
        Value::Object(map) => map,
        _ => {
            return Err(Error::MissingInvocation {
                task: task.name.clone(),
                module: task.action.clone(),
            })
        }
    };

    invocation.insert("modname".to_string(), Value::String(task.action.clone()));
    invocation.insert("taskname".to_string(), Value::String(task.name.clone()));

    Ok(serde_json::json!({
        "invocation": Value::Object(invocation),
        "result": Value::Object(raw),
    }))
}
