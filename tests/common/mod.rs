//! Shared fixtures for integration tests.

#![allow(dead_code)]

use playlet::backend::{BackendResult, ExecutionBackend};
use playlet::executor::{ExecutionContext, RawResult, ResultExt};
use playlet::host::Host;
use playlet::playbook::Task;
use playlet::vars::VarStack;
use serde_json::{json, Value};

/// Backend driven by a closure, for scripting per-task outcomes.
pub struct ScriptedBackend<F>
where
    F: Fn(&Task) -> BackendResult<RawResult> + Send + Sync,
{
    script: F,
}

impl<F> ScriptedBackend<F>
where
    F: Fn(&Task) -> BackendResult<RawResult> + Send + Sync,
{
    pub fn new(script: F) -> Self {
        Self { script }
    }
}

impl<F> ExecutionBackend for ScriptedBackend<F>
where
    F: Fn(&Task) -> BackendResult<RawResult> + Send + Sync,
{
    fn execute(
        &self,
        _host: &Host,
        task: &Task,
        _scope: &VarStack,
        _ctx: &ExecutionContext,
    ) -> BackendResult<RawResult> {
        (self.script)(task)
    }
}

/// A successful raw result with an invocation map attached.
pub fn ok_result(changed: bool) -> RawResult {
    let mut raw = RawResult::new();
    raw.insert("changed".to_string(), Value::Bool(changed));
    raw.insert("invocation".to_string(), json!({"module_args": {}}));
    raw
}

/// A failed raw result with an invocation map attached.
pub fn failed_result(msg: &str) -> RawResult {
    let mut raw = ok_result(false);
    raw.set_flag("failed");
    raw.insert("msg".to_string(), Value::String(msg.to_string()));
    raw
}

/// A raw result flagged unreachable but not failed.
pub fn unreachable_result() -> RawResult {
    let mut raw = ok_result(false);
    raw.insert("unreachable".to_string(), Value::Bool(true));
    raw
}

/// A minimal task for scripted-backend tests.
pub fn task(name: &str, action: &str) -> Task {
    Task::new(name, action, json!({}))
}
