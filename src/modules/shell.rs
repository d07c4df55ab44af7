//! Shell module - Execute commands through a shell
//!
//! Runs the given command line via `sh -c` (or another executable), so
//! pipes, redirects, and variable expansion work.

use super::{
    Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleResult, ParamExt,
};
use std::path::Path;
use std::process::Command;

const DEFAULT_SHELL: &str = "/bin/sh";

/// Module for executing commands through a shell
pub struct ShellModule;

impl Module for ShellModule {
    fn name(&self) -> &'static str {
        "shell"
    }

    fn description(&self) -> &'static str {
        "Execute a command line through a shell"
    }

    fn execute(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let cmd = params.get_string_required("cmd")?;

        if let Some(creates) = params.get_string("creates")? {
            if Path::new(&creates).exists() {
                return Ok(ModuleOutput::ok(format!("{} exists", creates))
                    .with_data("cmd", serde_json::json!(cmd)));
            }
        }

        if context.check_mode {
            return Ok(ModuleOutput::skipped("shell command skipped in check mode")
                .with_data("cmd", serde_json::Value::String(cmd)));
        }

        let shell = params
            .get_string("executable")?
            .unwrap_or_else(|| DEFAULT_SHELL.to_string());

        let mut command = Command::new(&shell);
        command.arg("-c").arg(&cmd);

        if let Some(chdir) = params.get_string("chdir")? {
            command.current_dir(chdir);
        } else if let Some(ref work_dir) = context.work_dir {
            command.current_dir(work_dir);
        }

        for (key, value) in &context.environment {
            command.env(key, value);
        }

        let output = command
            .output()
            .map_err(|e| ModuleError::ExecutionFailed(format!("{}: {}", shell, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout)
            .trim_end()
            .to_string();
        let stderr = String::from_utf8_lossy(&output.stderr)
            .trim_end()
            .to_string();
        let rc = output.status.code().unwrap_or(-1);

        let result = if output.status.success() {
            ModuleOutput::changed("")
        } else {
            ModuleOutput::failed(format!("non-zero return code ({})", rc))
        };

        Ok(result
            .with_data("cmd", serde_json::Value::String(cmd))
            .with_command_output(Some(stdout), Some(stderr), Some(rc)))
    }

    fn required_params(&self) -> &[&'static str] {
        &["cmd"]
    }
}
