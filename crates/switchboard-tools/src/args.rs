//! Typed tool arguments.
//!
//! Raw argument text from the completion provider is parsed into a
//! per-tool struct before any handler runs, so malformed shapes surface as
//! [`ToolError::InvalidArguments`] instead of failing deep in a handler.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::types::ToolKind;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchArgs {
    pub query: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculateArgs {
    pub expression: String,
}

/// Parsed arguments, tagged by the tool they belong to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToolArgs {
    SearchWeb(SearchArgs),
    Calculate(CalculateArgs),
}

impl ToolArgs {
    /// Parse raw JSON argument text for `kind`.
    pub fn parse(kind: ToolKind, raw: &str) -> Result<Self, ToolError> {
        match kind {
            ToolKind::SearchWeb => {
                let args: SearchArgs = parse_object(kind, raw)?;
                if args.query.trim().is_empty() {
                    return Err(invalid(kind, "query must not be blank"));
                }
                Ok(ToolArgs::SearchWeb(args))
            }
            ToolKind::Calculate => Ok(ToolArgs::Calculate(parse_object(kind, raw)?)),
        }
    }

    /// Tool these arguments belong to.
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolArgs::SearchWeb(_) => ToolKind::SearchWeb,
            ToolArgs::Calculate(_) => ToolKind::Calculate,
        }
    }
}

fn invalid(kind: ToolKind, reason: impl Into<String>) -> ToolError {
    ToolError::InvalidArguments {
        tool: kind.to_string(),
        reason: reason.into(),
    }
}

fn parse_object<T: DeserializeOwned>(kind: ToolKind, raw: &str) -> Result<T, ToolError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| invalid(kind, format!("malformed JSON: {e}")))?;
    if !value.is_object() {
        return Err(invalid(kind, "arguments must be a JSON object"));
    }
    serde_json::from_value(value).map_err(|e| invalid(kind, e.to_string()))
}
