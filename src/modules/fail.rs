//! Fail module - Fail unconditionally
//!
//! Stops a play at a chosen point with a custom message. Useful with
//! task-level variables to assert preconditions in playbooks and to
//! exercise fail-fast behavior in tests.

use super::{Module, ModuleContext, ModuleOutput, ModuleParams, ModuleResult, ParamExt};

const DEFAULT_MSG: &str = "Failed as requested from task";

/// Module that always fails
pub struct FailModule;

impl Module for FailModule {
    fn name(&self) -> &'static str {
        "fail"
    }

    fn description(&self) -> &'static str {
        "Fail with a custom message"
    }

    fn execute(
        &self,
        params: &ModuleParams,
        _context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let msg = params
            .get_string("msg")?
            .unwrap_or_else(|| DEFAULT_MSG.to_string());
        Ok(ModuleOutput::failed(msg))
    }
}
