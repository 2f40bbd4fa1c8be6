//! CPI command implementation.
//!
//! Invokes one CPI method through the configured provider executable and
//! version adapter, then prints the (normalized) result as JSON.

use crate::error::CliError;
use crate::utils::{configured_logger, load_configuration, GlobalOptions};
use clap::Args;
use serde_json::Value;
use stratus::cpi::{CpiCall, CpiMethod};

/// Invoke one CPI method.
#[derive(Args)]
pub struct CpiCommand {
    /// CPI method name (e.g. `create_vm`, `has_vm`, `info`)
    #[arg(value_name = "METHOD")]
    pub method: String,

    /// Positional method arguments as JSON; arguments that are not valid
    /// JSON are sent as strings
    #[arg(value_name = "ARG_JSON", allow_hyphen_values = true)]
    pub arguments: Vec<String>,
}

impl CpiCommand {
    /// Execute the cpi command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        // 1. Build the typed call before touching configuration
        let method: CpiMethod = self.method.parse()?;
        let arguments = self.arguments.iter().map(|arg| parse_argument(arg)).collect();
        let call = CpiCall::from_arguments(method, arguments)?;

        // 2. Build the CPI stack from configuration
        let config = load_configuration(global)?;
        let logger = configured_logger(global, &config);
        let wrapper = config.response_wrapper(&logger)?;
        logger.info(&format!(
            "Calling '{method}' on '{}' with CPI API version {}",
            config.cpi.path.display(),
            wrapper.api_version()
        ));

        // 3. Invoke and print
        let result = wrapper.call(call)?;
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
        println!("{json}");

        Ok(())
    }
}

fn parse_argument(arg: &str) -> Value {
    serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_argument() {
        assert_eq!(parse_argument(r#"{"a": 1}"#), json!({"a": 1}));
        assert_eq!(parse_argument("1024"), json!(1024));
        assert_eq!(parse_argument(r#""vm-1""#), json!("vm-1"));
        assert_eq!(parse_argument("vm-1"), json!("vm-1"));
        assert_eq!(parse_argument("null"), Value::Null);
    }
}
