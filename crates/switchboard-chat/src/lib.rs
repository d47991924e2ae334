//! Tool-augmented conversational router.
//!
//! Classifies each query, answers it directly or through a function-calling
//! round trip, and keeps a bounded per-user conversation history.

mod call;
pub mod commands;
pub mod coordinator;
pub mod error;
pub mod orchestrator;
pub mod prompts;
pub mod responder;
pub mod router;
pub mod store;

pub use commands::{parse_command, Command, ParsedCommand};
pub use coordinator::{QueryCoordinator, QueryResult, APOLOGY};
pub use error::ChatError;
pub use orchestrator::{error_envelope, OrchestratorOutcome, Phase, ToolOrchestrator, NO_RESPONSE};
pub use responder::DirectResponder;
pub use router::{parse_route, IntentRouter};
pub use store::ConversationStore;
