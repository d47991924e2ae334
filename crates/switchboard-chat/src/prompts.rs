//! Prompt text sent to the completion provider.

/// System prompt for the direct (no-tool) path.
pub const GENERAL_SYSTEM_PROMPT: &str = "You are a helpful assistant chatting with a user \
over a messaging app. Answer clearly and concisely. Use the earlier conversation for context \
when it is relevant. If you do not know something, say so instead of guessing.";

/// System prompt for the tool-augmented path.
pub const TOOL_SYSTEM_PROMPT: &str = "You are a helpful assistant chatting with a user \
over a messaging app. You can call tools: `search_web` looks up current information on the \
web and `calculate` evaluates arithmetic expressions using numbers, + - * / ^ and parentheses. \
Call a tool whenever it helps you answer accurately, then answer the user in plain language \
based on the tool results. If a tool reports an error, tell the user what went wrong.";

/// Classification prompt embedding the raw user query.
pub fn routing_prompt(query: &str) -> String {
    format!(
        "Given the following user query, determine if any tools are needed to answer it.\n\
         If a calculation tool is needed, respond with 'TOOL: CALCULATE'.\n\
         If a web search tool is needed, respond with 'TOOL: SEARCH'.\n\
         If no tools are needed, respond with 'NO TOOL'.\n\
         \n\
         User query: {query}\n\
         \n\
         Response:"
    )
}
