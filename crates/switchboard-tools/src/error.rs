//! Error types for tool dispatch and expression evaluation.

use switchboard_providers::ProviderError;

/// Errors from tool lookup, argument parsing, and handler execution.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("no handler registered for tool: {0}")]
    UnregisteredTool(String),
    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
    #[error("handler failed: {0}")]
    HandlerFailed(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Errors from the arithmetic evaluator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("empty expression")]
    Empty,
    #[error("expression too long: {len} characters (max {max})")]
    TooLong { len: usize, max: usize },
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unexpected token '{found}' at position {pos}")]
    UnexpectedToken { found: String, pos: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("expression nested too deeply (max {0})")]
    TooDeep(usize),
    #[error("result is not a finite number")]
    NonFinite,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_display() {
        let err = ToolError::UnregisteredTool("translate".to_string());
        assert_eq!(err.to_string(), "no handler registered for tool: translate");

        let err = ToolError::InvalidArguments {
            tool: "calculate".into(),
            reason: "missing field `expression`".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid arguments for calculate: missing field `expression`"
        );

        let err = ToolError::HandlerFailed("boom".to_string());
        assert_eq!(err.to_string(), "handler failed: boom");
    }

    #[test]
    fn test_tool_error_from_provider_is_transparent() {
        let err: ToolError = ProviderError::SearchFailed {
            reason: "HTTP 432: plan limit".into(),
        }
        .into();
        assert!(matches!(err, ToolError::Provider(_)));
        assert_eq!(err.to_string(), "search failed: HTTP 432: plan limit");
    }

    #[test]
    fn test_eval_error_display() {
        assert_eq!(EvalError::Empty.to_string(), "empty expression");
        assert_eq!(
            EvalError::UnexpectedChar { ch: 'x', pos: 2 }.to_string(),
            "unexpected character 'x' at position 2"
        );
        assert_eq!(
            EvalError::TooLong { len: 2000, max: 1024 }.to_string(),
            "expression too long: 2000 characters (max 1024)"
        );
        assert_eq!(
            EvalError::TooDeep(64).to_string(),
            "expression nested too deeply (max 64)"
        );
    }

    #[test]
    fn test_errors_implement_debug() {
        let dbg = format!("{:?}", ToolError::HandlerFailed("x".into()));
        assert!(dbg.contains("HandlerFailed"));
        let dbg = format!("{:?}", EvalError::NonFinite);
        assert!(dbg.contains("NonFinite"));
    }
}
