//! Remote collaborators: chat completion and web search.
//!
//! Both are reached over HTTP through traits so the routing pipeline can be
//! exercised with the in-process doubles in [`mock`].

pub mod completion;
pub mod error;
pub mod groq;
pub mod mock;
pub mod search;
pub mod tavily;
pub mod wire;

pub use completion::{Completion, CompletionProvider, CompletionRequest, SamplingParams};
pub use error::ProviderError;
pub use groq::GroqClient;
pub use mock::{ScriptedCompletion, ScriptStep, StaticSearch};
pub use search::{SearchHit, SearchProvider, SearchResponse};
pub use tavily::{SearchOptions, TavilyClient};
pub use wire::parse_completion_response;
