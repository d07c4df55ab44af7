//! Command module - Execute arbitrary commands
//!
//! Executes commands directly without going through a shell. For shell
//! features (pipes, redirects, globbing), use the shell module.

use super::{
    Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleResult, ParamExt,
};
use std::path::Path;
use std::process::Command;

/// Module for executing commands directly
pub struct CommandModule;

impl CommandModule {
    fn build_command(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<(Command, String)> {
        let argv = match params.get_vec_string("argv")? {
            Some(argv) => {
                if argv.is_empty() {
                    return Err(ModuleError::InvalidParameter(
                        "argv cannot be empty".to_string(),
                    ));
                }
                argv
            }
            None => {
                let cmd = params.get_string_required("cmd")?;
                shell_words::split(&cmd).map_err(|e| {
                    ModuleError::InvalidParameter(format!("cmd is not parseable: {}", e))
                })?
            }
        };

        if argv.is_empty() {
            return Err(ModuleError::InvalidParameter(
                "cmd cannot be empty".to_string(),
            ));
        }

        let display = shell_words::join(&argv);
        let mut command = Command::new(&argv[0]);
        if argv.len() > 1 {
            command.args(&argv[1..]);
        }

        if let Some(chdir) = params.get_string("chdir")? {
            command.current_dir(chdir);
        } else if let Some(ref work_dir) = context.work_dir {
            command.current_dir(work_dir);
        }

        for (key, value) in &context.environment {
            command.env(key, value);
        }

        Ok((command, display))
    }
}

impl Module for CommandModule {
    fn name(&self) -> &'static str {
        "command"
    }

    fn description(&self) -> &'static str {
        "Execute a command without invoking a shell"
    }

    fn execute(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        // A satisfied creates guard short-circuits before anything runs.
        if let Some(creates) = params.get_string("creates")? {
            if Path::new(&creates).exists() {
                return Ok(ModuleOutput::ok(format!("{} exists", creates))
                    .with_data("cmd", serde_json::json!(creates)));
            }
        }

        let (mut command, display) = self.build_command(params, context)?;

        if context.check_mode {
            return Ok(ModuleOutput::skipped("command skipped in check mode")
                .with_data("cmd", serde_json::Value::String(display)));
        }

        let output = command
            .output()
            .map_err(|e| ModuleError::ExecutionFailed(format!("{}: {}", display, e)))?;

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
            .with_data("cmd", serde_json::Value::String(display))
            .with_command_output(Some(stdout), Some(stderr), Some(rc)))
    }

    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        if params.get("cmd").is_none() && params.get("argv").is_none() {
            return Err(ModuleError::MissingParameter(
                "cmd or argv is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::ModuleStatus;
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn params_with_cmd(cmd: &str) -> ModuleParams {
        let mut params: ModuleParams = HashMap::new();
        params.insert("cmd".to_string(), json!(cmd));
        params
    }

    #[test]
    fn test_command_success_is_changed() {
        let module = CommandModule;
        let result = module
            .execute(&params_with_cmd("echo hello"), &ModuleContext::new())
            .unwrap();

        assert!(result.changed);
        assert_eq!(result.rc, Some(0));
        assert_eq!(result.stdout.as_deref(), Some("hello"));
    }

    #[test]
    fn test_command_failure_reports_rc() {
        let module = CommandModule;
        let result = module
            .execute(&params_with_cmd("false"), &ModuleContext::new())
            .unwrap();

        assert_eq!(result.status, ModuleStatus::Failed);
        assert_eq!(result.rc, Some(1));
        assert!(result.msg.contains("non-zero"));
    }

    #[test]
    fn test_command_argv() {
        let module = CommandModule;
        let mut params: ModuleParams = HashMap::new();
        params.insert("argv".to_string(), json!(["echo", "a b"]));

        let result = module.execute(&params, &ModuleContext::new()).unwrap();
        assert_eq!(result.stdout.as_deref(), Some("a b"));
    }

    #[test]
    fn test_command_creates_short_circuits() {
        let module = CommandModule;
        let mut params = params_with_cmd("echo ran");
        params.insert("creates".to_string(), json!("/"));

        let result = module.execute(&params, &ModuleContext::new()).unwrap();
        assert!(!result.changed);
        assert_eq!(result.stdout, None);
    }

    #[test]
    fn test_command_check_mode_skips() {
        let module = CommandModule;
        let context = ModuleContext::new().with_check_mode(true);
        let result = module
            .execute(&params_with_cmd("echo x"), &context)
            .unwrap();

        assert_eq!(result.status, ModuleStatus::Skipped);
        assert!(!result.changed);
    }

    #[test]
    fn test_command_requires_cmd_or_argv() {
        let module = CommandModule;
        assert!(module.validate_params(&HashMap::new()).is_err());
    }
}
