//! Tools the completion provider can call.
//!
//! Builds tool descriptors, parses raw tool-call arguments into typed
//! structs, and dispatches them to handlers through a registry.

pub mod args;
pub mod descriptor;
pub mod error;
pub mod expr;
pub mod handler;
pub mod types;

pub use args::{CalculateArgs, SearchArgs, ToolArgs};
pub use error::{EvalError, ToolError};
pub use handler::{CalculatorHandler, SearchWebHandler, ToolHandler, ToolRegistry};
pub use types::ToolKind;
