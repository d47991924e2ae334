//! Tool descriptors handed to the completion provider.

use std::sync::Arc;

use serde_json::json;
use switchboard_core::ToolDescriptor;

use crate::types::ToolKind;

/// Build the descriptor for one tool. Pure and deterministic.
pub fn build(kind: ToolKind) -> ToolDescriptor {
    let (description, param, param_description) = match kind {
        ToolKind::SearchWeb => (
            "Search the web for current information",
            "query",
            "The search query to look up",
        ),
        ToolKind::Calculate => (
            "Perform mathematical calculations",
            "expression",
            "The mathematical expression to evaluate",
        ),
    };

    ToolDescriptor {
        name: kind.name().to_string(),
        description: description.to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                param: {
                    "type": "string",
                    "description": param_description,
                }
            },
            "required": [param],
        }),
    }
}

/// Descriptors for `kinds`, in the given order, as a shareable set.
pub fn build_set(kinds: &[ToolKind]) -> Arc<[ToolDescriptor]> {
    kinds.iter().copied().map(build).collect()
}

/// Descriptors for every supported tool.
pub fn all() -> Arc<[ToolDescriptor]> {
    build_set(&ToolKind::ALL)
}
