//! Calculator tool handler.
//!
//! Evaluates arithmetic through [`crate::expr`]; never executes code.

use async_trait::async_trait;
use serde_json::json;

use crate::args::ToolArgs;
use crate::error::ToolError;
use crate::expr;
use crate::handler::ToolHandler;
use crate::types::ToolKind;

/// Handler for `calculate`.
///
/// Evaluation failures are part of the normal result: the handler returns
/// `{"error": "Invalid expression"}` rather than an error.
pub struct CalculatorHandler;

#[async_trait]
impl ToolHandler for CalculatorHandler {
    fn kind(&self) -> ToolKind {
        ToolKind::Calculate
    }

    async fn execute(&self, args: &ToolArgs) -> Result<serde_json::Value, ToolError> {
        let ToolArgs::Calculate(args) = args else {
            return Err(ToolError::InvalidArguments {
                tool: ToolKind::Calculate.to_string(),
                reason: format!("expected calculate arguments, got {}", args.kind()),
            });
        };

        match expr::evaluate(&args.expression) {
            Ok(value) => {
                tracing::debug!(expression = %args.expression, result = value, "evaluated expression");
                Ok(json!({ "result": expr::to_json_number(value) }))
            }
            Err(e) => {
                tracing::debug!(expression = %args.expression, error = %e, "expression rejected");
                Ok(json!({ "error": "Invalid expression" }))
            }
        }
    }

    fn describe(&self, args: &ToolArgs) -> String {
        match args {
            ToolArgs::Calculate(a) => format!("Calculate: {}", a.expression),
            other => format!("Calculate: <{} arguments>", other.kind()),
        }
    }
}
