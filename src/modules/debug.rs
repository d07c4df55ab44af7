//! Debug module - Print messages and variable values
//!
//! Runs entirely on the control side and never changes anything. `msg`
//! prints a literal message; `var` looks a variable up in the task's scope,
//! with dotted paths reaching into nested mappings.

use super::{Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleResult};
use serde_json::Value;

/// Module for printing debug messages and variable values
pub struct DebugModule;

impl DebugModule {
    fn format_value(&self, value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Null => "(undefined)".to_string(),
            _ => serde_json::to_string_pretty(value).unwrap_or_else(|_| format!("{:?}", value)),
        }
    }

    /// Resolves a variable from the context, following dotted paths.
    fn get_variable_value(&self, var_name: &str, context: &ModuleContext) -> Option<Value> {
        if let Some(value) = context.vars.get(var_name) {
            return Some(value.clone());
        }

        if var_name.contains('.') {
            let mut parts = var_name.split('.');
            let root = parts.next()?;
            let mut current = context.vars.get(root)?;
            for part in parts {
                current = current.as_object()?.get(part)?;
            }
            return Some(current.clone());
        }

        None
    }
}

impl Module for DebugModule {
    fn name(&self) -> &'static str {
        "debug"
    }

    fn description(&self) -> &'static str {
        "Print debug messages or variable values"
    }

    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        if params.get("msg").is_none() && params.get("var").is_none() {
            return Err(ModuleError::InvalidParameter(
                "Either 'msg' or 'var' must be provided".to_string(),
            ));
        }
        if params.get("msg").is_some() && params.get("var").is_some() {
            return Err(ModuleError::InvalidParameter(
                "Cannot specify both 'msg' and 'var' parameters".to_string(),
            ));
        }
        Ok(())
    }

    fn execute(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        if let Some(msg) = params.get("msg") {
            let message = match msg {
                Value::String(s) => s.clone(),
                other => self.format_value(other),
            };
            return Ok(ModuleOutput::ok(message.clone())
                .with_data("msg", Value::String(message)));
        }

        let var_name = match params.get("var") {
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(ModuleError::InvalidParameter(
                    "'var' parameter must be a string".to_string(),
                ))
            }
            // Unreachable after validate_params, kept as a guard.
            None => {
                return Err(ModuleError::InvalidParameter(
                    "Either 'msg' or 'var' must be provided".to_string(),
                ))
            }
        };

        match self.get_variable_value(&var_name, context) {
            Some(value) => {
                let message = format!("{}: {}", var_name, self.format_value(&value));
                Ok(ModuleOutput::ok(message).with_data(var_name, value))
            }
            None => {
                let message = format!("{}: VARIABLE IS NOT DEFINED!", var_name);
                Ok(ModuleOutput::ok(message).with_data(var_name, Value::Null))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_debug_with_msg() {
        let module = DebugModule;
        let mut params: ModuleParams = HashMap::new();
        params.insert("msg".to_string(), json!("Hello, World!"));

        let result = module.execute(&params, &ModuleContext::new()).unwrap();
        assert!(!result.changed);
        assert_eq!(result.msg, "Hello, World!");
    }

    #[test]
    fn test_debug_with_var() {
        let module = DebugModule;
        let mut params: ModuleParams = HashMap::new();
        params.insert("var".to_string(), json!("test_var"));

        let mut vars = IndexMap::new();
        vars.insert("test_var".to_string(), json!("test value"));
        let context = ModuleContext::new().with_vars(vars);

        let result = module.execute(&params, &context).unwrap();
        assert!(result.msg.contains("test_var"));
        assert!(result.msg.contains("test value"));
    }

    #[test]
    fn test_debug_with_nested_var() {
        let module = DebugModule;
        let mut params: ModuleParams = HashMap::new();
        params.insert("var".to_string(), json!("server.port"));

        let mut vars = IndexMap::new();
        vars.insert("server".to_string(), json!({"port": 8080}));
        let context = ModuleContext::new().with_vars(vars);

        let result = module.execute(&params, &context).unwrap();
        assert!(result.msg.contains("8080"));
    }

    #[test]
    fn test_debug_with_undefined_var() {
        let module = DebugModule;
        let mut params: ModuleParams = HashMap::new();
        params.insert("var".to_string(), json!("missing"));

        let result = module.execute(&params, &ModuleContext::new()).unwrap();
        assert!(result.msg.contains("VARIABLE IS NOT DEFINED"));
        assert_eq!(result.data.get("missing"), Some(&Value::Null));
    }

    #[test]
    fn test_debug_validation() {
        let module = DebugModule;
        assert!(module.validate_params(&HashMap::new()).is_err());

        let mut both: ModuleParams = HashMap::new();
        both.insert("msg".to_string(), json!("m"));
        both.insert("var".to_string(), json!("v"));
        assert!(module.validate_params(&both).is_err());
    }
}
