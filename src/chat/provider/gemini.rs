//! Gemini provider for the chat REPL
//!
//! Uses Gemini's generateContent API, and streamGenerateContent with
//! `alt=sse` for streamed replies.

use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use super::{ChatRequest, ChatResponse, MessageRole, Provider, StreamEvent, Usage};
use crate::config::{DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_URL};

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Gemini provider for chat interface
pub struct GeminiChatProvider {
    client: HttpClient,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiChatProvider {
    /// Create a new Gemini Chat provider
    pub fn new(api_key: String) -> Self {
        Self {
            client: HttpClient::new(),
            api_key,
            base_url: DEFAULT_GEMINI_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, method: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{}",
            self.base_url.trim_end_matches('/'),
            self.model,
            method
        )
    }

    /// Build Gemini contents from chat request
    fn build_contents(request: &ChatRequest) -> Vec<GeminiContent> {
        let mut contents: Vec<GeminiContent> = request
            .messages
            .iter()
            .map(|msg| GeminiContent {
                role: match msg.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "model",
                }
                .to_string(),
                parts: vec![GeminiTextPart { text: msg.content.clone() }],
            })
            .collect();

        // Add current user input
        contents.push(GeminiContent {
            role: "user".to_string(),
            parts: vec![GeminiTextPart { text: request.input.clone() }],
        });

        contents
    }

    fn build_request(request: &ChatRequest) -> GeminiRequest {
        GeminiRequest {
            contents: Self::build_contents(request),
            system_instruction: request.system.clone().map(|s| GeminiSystemInstruction {
                parts: vec![GeminiTextPart { text: s }],
            }),
        }
    }

    /// Parse response into ChatResponse
    fn parse_response(response: GeminiResponse) -> ChatResponse {
        ChatResponse {
            text: response.text(),
            usage: response.usage_metadata.map(Usage::from),
        }
    }
}

#[async_trait]
impl Provider for GeminiChatProvider {
    fn name(&self) -> &str {
        &self.model
    }

    async fn create(&self, request: ChatRequest) -> Result<ChatResponse> {
        let api_request = Self::build_request(&request);

        let response = self
            .client
            .post(self.url("generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&api_request)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error: {} - {}", status, body);
        }

        let api_response: GeminiResponse = response.json().await?;

        if let Some(error) = &api_response.error {
            anyhow::bail!("Gemini error: {}", error.message);
        }

        Ok(Self::parse_response(api_response))
    }

    async fn create_stream(&self, request: ChatRequest) -> Result<mpsc::Receiver<StreamEvent>> {
        let (tx, rx) = mpsc::channel(100);

        let api_request = Self::build_request(&request);
        let url = format!("{}?alt=sse", self.url("streamGenerateContent"));
        let client = self.client.clone();
        let api_key = self.api_key.clone();

        tokio::spawn(async move {
            let response = match client
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(&api_request)
                .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                    return;
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                let _ = tx
                    .send(StreamEvent::Error(format!("Gemini API error: {} - {}", status, body)))
                    .await;
                return;
            }

            let mut stream = response.bytes_stream();
            let mut decoder = SseDecoder::default();

            while let Some(chunk) = stream.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                        return;
                    }
                };

                for event in decoder.push(&bytes) {
                    if tx.send(event).await.is_err() {
                        debug!("Stream receiver dropped");
                        return;
                    }
                }
            }

            let _ = tx.send(StreamEvent::Done).await;
        });

        Ok(rx)
    }
}

// ============================================================================
// SSE decoding
// ============================================================================

/// Incremental `data:` line decoder for Gemini's SSE stream
#[derive(Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Feed raw bytes; returns the events completed by this chunk
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        // Lines are split on bytes so multi-byte characters survive chunk boundaries
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(line_end) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=line_end).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end();

            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            match serde_json::from_str::<GeminiResponse>(data.trim_start()) {
                Ok(response) => {
                    if let Some(error) = &response.error {
                        events.push(StreamEvent::Error(format!("Gemini error: {}", error.message)));
                        continue;
                    }
                    let text = response.text();
                    if !text.is_empty() {
                        events.push(StreamEvent::TextDelta(text));
                    }
                    if let Some(usage) = response.usage_metadata {
                        events.push(StreamEvent::Usage(Usage::from(usage)));
                    }
                }
                Err(e) => debug!("Skipping unparseable SSE line: {}", e),
            }
        }
        events
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
}

#[derive(Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiTextPart>,
}

#[derive(Serialize, Clone)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiTextPart>,
}

#[derive(Serialize, Clone)]
struct GeminiTextPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsage>,
    error: Option<GeminiError>,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate
    fn text(&self) -> String {
        self.candidates
            .iter()
            .flatten()
            .next()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiUsage {
    #[serde(rename = "promptTokenCount")]
    prompt_token_count: Option<u32>,
    #[serde(rename = "candidatesTokenCount")]
    candidates_token_count: Option<u32>,
}

impl From<GeminiUsage> for Usage {
    fn from(u: GeminiUsage) -> Self {
        Usage {
            input_tokens: u.prompt_token_count.unwrap_or(0),
            output_tokens: u.candidates_token_count.unwrap_or(0),
        }
    }
}

#[derive(Deserialize)]
struct GeminiError {
    message: String,
}
