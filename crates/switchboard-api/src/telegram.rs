//! Telegram Bot API client and update types.
//!
//! Only the handful of methods the bot needs are wrapped: `sendMessage`,
//! `getUpdates`, `setWebhook` and `deleteWebhook`. Every Bot API response
//! shares the `{ok, result, description, error_code}` envelope, which
//! [`TelegramClient::call`] unwraps.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use switchboard_core::config::TelegramConfig;
use switchboard_core::InboundEvent;

use crate::error::TransportError;
use crate::polling::UpdateSource;
use crate::transport::ChatTransport;

/// Hard limit on the length of a single outgoing message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Reply sent for photos, voice notes and other non-text messages.
pub const UNSUPPORTED_REPLY: &str = "Sorry, I can only handle text messages for now.";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Update types
// =============================================================================

/// One entry from `getUpdates` or one webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// What an update asks the bot to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A text message to route through the coordinator.
    Text(InboundEvent),
    /// A non-text message; the chat gets [`UNSUPPORTED_REPLY`].
    Unsupported { chat_id: String, kind: &'static str },
    /// Nothing to answer (edits, channel posts, service messages).
    Ignored,
}

/// Classify an update. The chat id doubles as the conversation key.
pub fn classify_update(update: &Update, command_marker: &str) -> Inbound {
    let Some(message) = &update.message else {
        return Inbound::Ignored;
    };
    let chat_id = message.chat.id.to_string();

    if let Some(text) = &message.text {
        return Inbound::Text(InboundEvent::from_text(chat_id, text.clone(), command_marker));
    }

    let kind = if message.photo.is_some() {
        "photo"
    } else if message.voice.is_some() {
        "voice"
    } else if message.audio.is_some() {
        "audio"
    } else if message.document.is_some() {
        "document"
    } else {
        return Inbound::Ignored;
    };
    Inbound::Unsupported { chat_id, kind }
}

/// Split `text` into chunks of at most `max_chars` characters, preferring
/// to break after a newline.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let end = match rest.char_indices().nth(max_chars) {
            Some((idx, _)) => idx,
            None => {
                chunks.push(rest.to_string());
                break;
            }
        };
        let window = &rest[..end];
        let cut = match window.rfind('\n') {
            Some(nl) if nl > 0 => nl + 1,
            _ => end,
        };
        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }
    chunks
}

// =============================================================================
// Client
// =============================================================================

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<u16>,
}

#[derive(Debug, Serialize)]
struct SendMessageBody<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct GetUpdatesBody<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct SetWebhookBody<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_token: Option<&'a str>,
    allowed_updates: &'a [&'a str],
}

/// Client for the Telegram Bot API.
pub struct TelegramClient {
    http: HttpClient,
    api_base: String,
    token: String,
    parse_mode: Option<String>,
}

impl TelegramClient {
    /// Build a client from the `[telegram]` config section.
    ///
    /// The HTTP timeout is stretched past `poll_timeout_secs` so long polls
    /// are not cut short.
    pub fn from_config(config: &TelegramConfig) -> Result<Self, TransportError> {
        let token = config
            .bot_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                TransportError::Config("TELEGRAM_BOT_TOKEN environment variable not found".into())
            })?;
        let timeout = REQUEST_TIMEOUT.max(Duration::from_secs(config.poll_timeout_secs + 10));
        let parse_mode = Some(config.parse_mode.clone()).filter(|m| !m.is_empty());
        Self::new(&config.api_base, token, parse_mode, timeout)
    }

    /// Create a client for `api_base` with an explicit HTTP timeout.
    pub fn new(
        api_base: &str,
        token: impl Into<String>,
        parse_mode: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Connection(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.into(),
            parse_mode,
        })
    }

    /// Parse mode sent with each message, if any.
    pub fn parse_mode(&self) -> Option<&str> {
        self.parse_mode.as_deref()
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// POST a Bot API method and unwrap the response envelope.
    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned + Send,
    {
        let response = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                // The URL carries the bot token.
                let e = e.without_url();
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.without_url().to_string()))?;

        match serde_json::from_str::<Envelope<T>>(&text) {
            Ok(envelope) if envelope.ok => envelope.result.ok_or_else(|| {
                TransportError::InvalidResponse(format!("{method}: missing result"))
            }),
            Ok(envelope) => Err(TransportError::Api {
                code: envelope.error_code.unwrap_or(status.as_u16()),
                description: envelope.description.unwrap_or_default(),
            }),
            Err(_) if !status.is_success() => Err(TransportError::Http {
                status: status.as_u16(),
                body: text,
            }),
            Err(e) => Err(TransportError::InvalidResponse(format!("{method}: {e}"))),
        }
    }

    /// Send one message, with an explicit parse mode.
    pub async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        parse_mode: Option<&str>,
    ) -> Result<(), TransportError> {
        let body = SendMessageBody {
            chat_id,
            text,
            parse_mode,
        };
        let _: serde_json::Value = self.call("sendMessage", &body).await?;
        Ok(())
    }

    /// Fetch pending updates starting at `offset`, waiting up to
    /// `timeout_secs` for one to arrive.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        let body = GetUpdatesBody {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        self.call("getUpdates", &body).await
    }

    /// Register `url` as the webhook target.
    pub async fn set_webhook(&self, url: &str, secret: Option<&str>) -> Result<(), TransportError> {
        let body = SetWebhookBody {
            url,
            secret_token: secret,
            allowed_updates: &["message"],
        };
        let _: bool = self.call("setWebhook", &body).await?;
        tracing::info!(url = %url, with_secret = secret.is_some(), "webhook registered");
        Ok(())
    }

    /// Remove any webhook so `getUpdates` can be used.
    pub async fn delete_webhook(&self) -> Result<(), TransportError> {
        let _: bool = self
            .call("deleteWebhook", &serde_json::json!({}))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), TransportError> {
        for chunk in split_message(text, MAX_MESSAGE_CHARS) {
            match self.send_message(chat_id, &chunk, self.parse_mode()).await {
                Ok(()) => {}
                Err(e) if e.is_markup_rejected() && self.parse_mode.is_some() => {
                    tracing::debug!(chat_id = %chat_id, "markup rejected, resending as plain text");
                    self.send_message(chat_id, &chunk, None).await?;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        TelegramClient::get_updates(self, offset, timeout_secs).await
    }
}
