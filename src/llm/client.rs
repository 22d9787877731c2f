// Claude API streaming client using reqwest-eventsource.
//
// Sends one season-summary request to the Anthropic Messages API with
// `stream: true` and parses the Server-Sent Events into `LlmEvent` variants
// forwarded over an mpsc channel for the app orchestrator to consume.

use futures_util::StreamExt;
use reqwest_eventsource::{Event, RequestBuilderExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::Config;
use crate::protocol::{LlmEvent, NarrativeErrorKind};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// ClaudeClient
// ---------------------------------------------------------------------------

/// Low-level Claude API streaming client.
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl ClaudeClient {
    /// Create a new client with the given API key and model identifier.
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    /// Stream one season summary as `LlmEvent`s over `tx`.
    ///
    /// `ordinal` identifies the season panel the events belong to; the
    /// `generation` counter is threaded through every event so the receiving
    /// side can discard events from superseded selections.
    ///
    /// Returns when the stream completes, an error occurs, or the receiver
    /// is dropped.
    pub async fn stream_summary(
        &self,
        system: &str,
        user_content: &str,
        max_tokens: u32,
        tx: mpsc::Sender<LlmEvent>,
        ordinal: usize,
        generation: u64,
    ) -> anyhow::Result<()> {
        if self.api_key.is_empty() {
            let _ = tx
                .send(LlmEvent::Error {
                    ordinal,
                    kind: NarrativeErrorKind::Permanent,
                    message: "API key not configured".to_string(),
                    generation,
                })
                .await;
            return Ok(());
        }

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "stream": true,
            "system": system,
            "messages": [{ "role": "user", "content": user_content }]
        });

        let request = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body);

        let mut es = match request.eventsource() {
            Ok(es) => es,
            Err(e) => {
                let _ = tx
                    .send(LlmEvent::Error {
                        ordinal,
                        kind: NarrativeErrorKind::Permanent,
                        message: format!("Failed to create event source: {e}"),
                        generation,
                    })
                    .await;
                return Ok(());
            }
        };

        let mut saw_content = false;

        while let Some(event) = es.next().await {
            match event {
                Ok(Event::Open) => {
                    debug!(ordinal, "SSE connection opened");
                }
                Ok(Event::Message(msg)) => {
                    let event_type = msg.event.as_str();
                    let data = &msg.data;

                    match event_type {
                        "content_block_delta" => {
                            if let Some(text) = parse_delta_text(data) {
                                saw_content = true;
                                if tx
                                    .send(LlmEvent::Token {
                                        ordinal,
                                        text,
                                        generation,
                                    })
                                    .await
                                    .is_err()
                                {
                                    // Receiver dropped — abort stream.
                                    es.close();
                                    return Ok(());
                                }
                            }
                        }
                        "message_stop" => {
                            debug!(ordinal, "message_stop — streaming complete");
                            let _ = tx
                                .send(LlmEvent::Complete {
                                    ordinal,
                                    generation,
                                })
                                .await;
                            es.close();
                            return Ok(());
                        }
                        // Ignore ping, message_start, content_block_start, etc.
                        _ => {
                            debug!(event_type, "ignoring SSE event");
                        }
                    }
                }
                Err(err) => {
                    warn!(?err, ordinal, "SSE stream error");
                    let (kind, message) = classify_stream_error(&err);
                    let _ = tx
                        .send(LlmEvent::Error {
                            ordinal,
                            kind,
                            message,
                            generation,
                        })
                        .await;
                    es.close();
                    return Ok(());
                }
            }
        }

        // Stream ended without message_stop (shouldn't normally happen).
        if saw_content {
            let _ = tx
                .send(LlmEvent::Complete {
                    ordinal,
                    generation,
                })
                .await;
        } else {
            let _ = tx
                .send(LlmEvent::Error {
                    ordinal,
                    kind: NarrativeErrorKind::Transient,
                    message: "Stream ended unexpectedly without any content".to_string(),
                    generation,
                })
                .await;
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LlmClient wrapper
// ---------------------------------------------------------------------------

/// High-level wrapper that can be either an active Claude client or disabled.
pub enum LlmClient {
    /// Claude API is configured and ready.
    Active(ClaudeClient),
    /// Narrative summaries are disabled (no API key configured).
    Disabled,
}

impl LlmClient {
    /// Build an `LlmClient` from the application config.
    ///
    /// Returns `Active` if an API key is present in credentials, otherwise
    /// returns `Disabled`.
    pub fn from_config(config: &Config) -> Self {
        match &config.credentials.anthropic_api_key {
            Some(key) if !key.is_empty() => {
                let model = config.llm.model.clone();
                LlmClient::Active(ClaudeClient::new(key.clone(), model))
            }
            _ => LlmClient::Disabled,
        }
    }

    /// Stream a season summary, delegating to the inner `ClaudeClient` or
    /// immediately sending a permanent error if disabled.
    pub async fn stream_summary(
        &self,
        system: &str,
        user_content: &str,
        max_tokens: u32,
        tx: mpsc::Sender<LlmEvent>,
        ordinal: usize,
        generation: u64,
    ) -> anyhow::Result<()> {
        match self {
            LlmClient::Active(client) => {
                client
                    .stream_summary(system, user_content, max_tokens, tx, ordinal, generation)
                    .await
            }
            LlmClient::Disabled => {
                let _ = tx
                    .send(LlmEvent::Error {
                        ordinal,
                        kind: NarrativeErrorKind::Permanent,
                        message: "Narrative summaries not configured".to_string(),
                        generation,
                    })
                    .await;
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SSE JSON parsing helpers
// ---------------------------------------------------------------------------

/// Extract `delta.text` from a `content_block_delta` event's JSON.
///
/// Expected shape: `{ "type": "content_block_delta", "delta": { "type": "text_delta", "text": "..." } }`
pub(crate) fn parse_delta_text(data: &str) -> Option<String> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("delta")?
        .get("text")?
        .as_str()
        .map(|s| s.to_string())
}

/// Classify an SSE error into a retryability kind plus a human-readable
/// message. Rate limits and upstream outages are transient; credential and
/// request errors are permanent.
fn classify_stream_error(err: &reqwest_eventsource::Error) -> (NarrativeErrorKind, String) {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, _response) => {
            let kind = if status.as_u16() == 429 || status.is_server_error() {
                NarrativeErrorKind::Transient
            } else {
                NarrativeErrorKind::Permanent
            };
            (kind, format!("API returned status {status}"))
        }
        reqwest_eventsource::Error::Transport(e) => {
            (NarrativeErrorKind::Transient, format!("Network error: {e}"))
        }
        other => (NarrativeErrorKind::Transient, format!("Stream error: {other}")),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
