use std::fmt;

use serde::{Deserialize, Serialize};

/// Tools the completion provider may call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    SearchWeb,
    Calculate,
}

impl ToolKind {
    /// Every supported tool, in descriptor order.
    pub const ALL: [ToolKind; 2] = [ToolKind::SearchWeb, ToolKind::Calculate];

    /// Wire name used in descriptors and tool-call records.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::SearchWeb => "search_web",
            ToolKind::Calculate => "calculate",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ToolKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search_web" => Ok(ToolKind::SearchWeb),
            "calculate" => Ok(ToolKind::Calculate),
            _ => Err(format!("Unknown tool: {}", s)),
        }
    }
}
