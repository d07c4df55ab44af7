//! Single-task execution.
//!
//! The task runner is the one place this core touches module execution
//! machinery. Backend errors never escape it: any error from the execution
//! backend is absorbed into a failed raw result whose `invocation.error`
//! carries the message, so the caller always receives one report per task
//! attempted.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::executor::ExecutionContext;
use crate::playbook::Task;
use crate::session::RuntimeSession;
use crate::vars::VarStack;

/// Raw result mapping produced by an execution backend.
pub type RawResult = serde_json::Map<String, Value>;

/// Helpers for reading and writing the flag fields of a raw result.
pub trait ResultExt {
    /// Returns true if the key holds a truthy flag.
    fn flag(&self, key: &str) -> bool;

    /// Sets the key to `true`.
    fn set_flag(&mut self, key: &str);
}

impl ResultExt for RawResult {
    fn flag(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Null) | None => false,
            // Tolerate sloppy backends that report flags as strings/numbers.
            Some(Value::String(s)) => !s.is_empty() && s != "false",
            Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
            Some(_) => true,
        }
    }

    fn set_flag(&mut self, key: &str) {
        self.insert(key.to_string(), Value::Bool(true));
    }
}

/// One task's outcome: the formatted result plus the raw flags.
///
/// The flags are captured from the raw result before formatting so a
/// custom formatter cannot hide a failure from the play runner.
#[derive(Debug, Clone)]
pub struct TaskReport {
    /// Formatted, JSON-serializable result
    pub value: Value,
    /// Whether the task failed (includes unreachable)
    pub failed: bool,
    /// Whether the task changed anything
    pub changed: bool,
}

/// Executes single tasks against the session's host.
pub struct TaskRunner<'a> {
    session: &'a RuntimeSession,
}

impl<'a> TaskRunner<'a> {
    pub fn new(session: &'a RuntimeSession) -> Self {
        Self { session }
    }

    /// Runs one task and returns its report.
    ///
    /// Task-level failures are reported in-band; `Err` is reserved for
    /// formatter and programming errors.
    pub fn run_task(
        &self,
        task: &Task,
        scope: &VarStack,
        ctx: &ExecutionContext,
    ) -> Result<TaskReport> {
        let host = self.session.host();
        info!(
            "Executing task: {} --> {} ON HOST: {}",
            task.name, task.action, host
        );

        // The invocation map travels with the result even when the backend
        // never ran far enough to produce one.
        let mut invocation = serde_json::Map::new();

        let mut raw = match self.session.backend().execute(host, task, scope, ctx) {
            Ok(mut raw) => {
                if !raw.contains_key("invocation") {
                    debug!("Backend returned no invocation map, attaching empty");
                    raw.insert("invocation".to_string(), Value::Object(invocation));
                }
                raw
            }
            Err(e) => {
                warn!("Task execution raised an error: {}", e);
                let mut raw = RawResult::new();
                raw.set_flag("failed");
                invocation.insert("error".to_string(), Value::String(e.to_string()));
                raw.insert("invocation".to_string(), Value::Object(invocation));
                raw
            }
        };

        if raw.flag("unreachable") {
            raw.set_flag("failed");
        }

        let failed = raw.flag("failed");
        let changed = raw.flag("changed");

        let value = self
            .session
            .formatters()
            .format(self.session, task, raw)?;

        Ok(TaskReport {
            value,
            failed,
            changed,
        })
    }
}
