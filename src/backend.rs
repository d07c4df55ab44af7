//! Execution backends.
//!
//! The [`ExecutionBackend`] trait is the single interaction point between
//! this core and module execution machinery. The built-in
//! [`ModuleBackend`] dispatches tasks to in-process modules; callers may
//! substitute any implementation (a remote executor, a recorder, a mock).
//!
//! A backend must not keep process-wide mutable caches: sessions on
//! different threads each hold their own backend instance, and nothing in
//! this core synchronizes them.

use thiserror::Error;

use crate::executor::task::RawResult;
use crate::executor::ExecutionContext;
use crate::host::Host;
use crate::modules::{ModuleContext, ModuleError, ModuleParams, ModuleRegistry};
use crate::playbook::Task;
use crate::vars::VarStack;

/// Errors raised by an execution backend.
///
/// These never reach a caller of the engine: the task runner absorbs them
/// into failed results.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Module '{0}' is not known to this backend")]
    ModuleNotFound(String),

    #[error(transparent)]
    Module(#[from] ModuleError),

    #[error("{0}")]
    Other(String),
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Performs a task's side effects and returns a raw result mapping.
pub trait ExecutionBackend: Send + Sync {
    /// Executes one task against a host.
    ///
    /// On success the raw result should carry an `invocation` sub-map; the
    /// task runner attaches an empty one if it is missing.
    fn execute(
        &self,
        host: &Host,
        task: &Task,
        scope: &VarStack,
        ctx: &ExecutionContext,
    ) -> BackendResult<RawResult>;
}

/// In-process backend dispatching tasks through a [`ModuleRegistry`].
pub struct ModuleBackend {
    registry: ModuleRegistry,
}

impl ModuleBackend {
    /// Creates a backend over the given registry.
    pub fn new(registry: ModuleRegistry) -> Self {
        Self { registry }
    }

    /// Creates a backend with the built-in modules.
    pub fn with_builtins() -> Self {
        Self::new(ModuleRegistry::with_builtins())
    }

    /// Returns the underlying registry.
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }
}

impl Default for ModuleBackend {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ExecutionBackend for ModuleBackend {
    fn execute(
        &self,
        _host: &Host,
        task: &Task,
        scope: &VarStack,
        ctx: &ExecutionContext,
    ) -> BackendResult<RawResult> {
        if !self.registry.contains(&task.action) {
            return Err(BackendError::ModuleNotFound(task.action.clone()));
        }

        let params: ModuleParams = task
            .args
            .as_object()
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();

        let context = ModuleContext {
            check_mode: ctx.check_mode,
            diff_mode: ctx.diff_mode,
            vars: scope.flatten(),
            environment: ctx.environment.clone(),
            work_dir: None,
            r#become: ctx.r#become,
            become_user: ctx.become_user.clone(),
        };

        let output = self.registry.execute(&task.action, &params, &context)?;
        Ok(output.into_raw(&task.args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::task::ResultExt;
    use indexmap::IndexMap;
    use serde_json::json;

    fn fixture() -> (Host, VarStack, ExecutionContext) {
        (Host::new("localhost"), VarStack::new(), ExecutionContext::default())
    }

    #[test]
    fn test_module_backend_runs_builtin() {
        let backend = ModuleBackend::with_builtins();
        let (host, scope, ctx) = fixture();
        let task = Task::new("hello", "debug", json!({"msg": "hi"}));

        let raw = backend.execute(&host, &task, &scope, &ctx).unwrap();
        assert!(!raw.flag("failed"));
        assert_eq!(raw["msg"], json!("hi"));
        assert_eq!(raw["invocation"]["module_args"]["msg"], json!("hi"));
    }

    #[test]
    fn test_module_backend_unknown_module() {
        let backend = ModuleBackend::with_builtins();
        let (host, scope, ctx) = fixture();
        let task = Task::new("bogus", "no_such_module", json!({}));

        let err = backend.execute(&host, &task, &scope, &ctx).unwrap_err();
        assert!(matches!(err, BackendError::ModuleNotFound(_)));
        assert!(err.to_string().contains("no_such_module"));
    }

    #[test]
    fn test_module_backend_invalid_params_is_error() {
        let backend = ModuleBackend::with_builtins();
        let (host, scope, ctx) = fixture();
        // debug requires msg or var
        let task = Task::new("empty debug", "debug", json!({}));

        let err = backend.execute(&host, &task, &scope, &ctx).unwrap_err();
        assert!(matches!(err, BackendError::Module(_)));
    }

    #[test]
    fn test_module_backend_fail_module_is_in_band() {
        let backend = ModuleBackend::with_builtins();
        let (host, scope, ctx) = fixture();
        let task = Task::new("stop here", "fail", json!({"msg": "nope"}));

        // A failing module is a failed *result*, not a backend error.
        let raw = backend.execute(&host, &task, &scope, &ctx).unwrap();
        assert!(raw.flag("failed"));
        assert_eq!(raw["msg"], json!("nope"));
    }

    #[test]
    fn test_module_backend_sees_flattened_scope() {
        let backend = ModuleBackend::with_builtins();
        let host = Host::new("localhost");
        let mut base = IndexMap::new();
        base.insert("who".to_string(), json!("base"));
        let scope = VarStack::from_map(base).push_child(
            [("who".to_string(), json!("layered"))].into_iter().collect(),
        );
        let ctx = ExecutionContext::default();
        let task = Task::new("show who", "debug", json!({"var": "who"}));

        let raw = backend.execute(&host, &task, &scope, &ctx).unwrap();
        assert_eq!(raw["who"], json!("layered"));
    }
}
