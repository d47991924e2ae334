//! OpenAI-compatible chat completion wire format.
//!
//! Request types serialize exactly as the `/chat/completions` endpoint
//! expects; the response parser extracts text and native tool calls from
//! `choices[0].message`.

use serde::{Deserialize, Serialize};
use switchboard_core::{ConversationTurn, ToolCall, ToolDescriptor};
use uuid::Uuid;

use crate::completion::{Completion, CompletionRequest};
use crate::error::ProviderError;

// =============================================================================
// Request
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct WireRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<WireTool<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireMessage<'a> {
    pub role: String,
    /// Assistant turns that only carry tool calls are sent with `""`;
    /// some endpoints reject `null` content.
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireToolCall<'a> {
    pub id: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: WireFunctionCall<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireFunctionCall<'a> {
    pub name: &'a str,
    pub arguments: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireTool<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: &'a ToolDescriptor,
}

impl<'a> From<&'a ConversationTurn> for WireMessage<'a> {
    fn from(turn: &'a ConversationTurn) -> Self {
        let tool_calls = (!turn.tool_calls.is_empty()).then(|| {
            turn.tool_calls
                .iter()
                .map(|call| WireToolCall {
                    id: &call.id,
                    kind: "function",
                    function: WireFunctionCall {
                        name: &call.name,
                        arguments: &call.arguments,
                    },
                })
                .collect()
        });
        Self {
            role: turn.role.to_string(),
            content: turn.content_str(),
            tool_calls,
            tool_call_id: turn.tool_call_id.as_deref(),
        }
    }
}

impl<'a> WireRequest<'a> {
    /// Convert a provider-neutral request to the wire shape.
    pub(crate) fn from_request(request: &'a CompletionRequest) -> Self {
        let tools = request
            .tools
            .as_ref()
            .filter(|t| !t.is_empty())
            .map(|tools| {
                tools
                    .iter()
                    .map(|d| WireTool {
                        kind: "function",
                        function: d,
                    })
                    .collect::<Vec<_>>()
            });
        let tool_choice = tools
            .as_ref()
            .map(|_| request.tool_choice.unwrap_or_default().to_string());
        Self {
            model: &request.model,
            messages: request.messages.iter().map(WireMessage::from).collect(),
            tools,
            tool_choice,
            temperature: request.sampling.temperature,
            max_tokens: request.sampling.max_tokens,
            stream: false,
        }
    }
}

// =============================================================================
// Response
// =============================================================================

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireResponseToolCall>>,
}

#[derive(Deserialize)]
struct WireResponseToolCall {
    id: Option<String>,
    function: WireResponseFunction,
}

#[derive(Deserialize)]
struct WireResponseFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

/// Parse a non-streaming `/chat/completions` response body.
pub fn parse_completion_response(body: &str) -> Result<Completion, ProviderError> {
    let resp: WireResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::InvalidResponse {
            reason: format!("failed to parse completion response: {e}"),
        })?;

    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidResponse {
            reason: "empty choices array".into(),
        })?;

    let content = choice.message.content.filter(|c| !c.is_empty());
    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| ToolCall {
            id: tc
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("call_{}", Uuid::new_v4())),
            name: tc.function.name,
            arguments: tc.function.arguments,
        })
        .collect();

    Ok(Completion {
        content,
        tool_calls,
    })
}
