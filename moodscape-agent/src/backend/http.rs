//! HTTP support-service backend.
//!
//! Speaks the MoodScape server API:
//! - `POST {base}/predict` with `{"text": ...}` → `{"emotion": "<Mood>"}`
//! - `POST {base}/chat` with the turn payload → `{"reply", "action"}`

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::debug;

use catalog::Mood;

use super::traits::*;
use crate::message::ChatMessage;

/// HTTP backend for the remote inference and reflection services.
pub struct HttpBackend {
    client: Client,
    base_url: String,
    id: String,
}

impl HttpBackend {
    /// Create a backend for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to create HTTP client");

        let base_url = base_url.into();
        Self {
            id: format!("moodscape@{base_url}"),
            client,
            base_url,
        }
    }

    /// Create a backend pointing to a local development server.
    pub fn local(port: u16) -> Self {
        Self::new(format!("http://localhost:{port}"))
    }

    fn predict_url(&self) -> String {
        format!("{}/predict", self.base_url)
    }

    fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }

    async fn post_json<B, R>(&self, url: String, body: &B) -> Result<R, BackendError>
    where
        B: Serialize,
        R: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::RequestFailed(format!("HTTP {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(e.to_string()))
    }
}

/// Mood inference request body.
#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    text: &'a str,
}

/// Mood inference response body.
#[derive(Debug, Deserialize)]
struct PredictResponse {
    emotion: String,
}

/// Reflection exchange request body.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    text: &'a str,
    mood: &'a str,
    history: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    user_email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    emergency_email: Option<&'a str>,
}

/// Reflection exchange response body.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    reply: String,
    action: Option<SafetyAction>,
}

#[async_trait]
impl SupportBackend for HttpBackend {
    fn id(&self) -> &str {
        &self.id
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(&self.base_url)
            .send()
            .await
            .is_ok()
    }

    async fn infer_mood(&self, text: &str) -> Result<Mood, BackendError> {
        let response: PredictResponse = self
            .post_json(self.predict_url(), &PredictRequest { text })
            .await?;

        debug!(emotion = %response.emotion, "Mood inference response");

        response
            .emotion
            .parse()
            .map_err(|_| BackendError::UnknownMood(response.emotion))
    }

    async fn exchange(&self, request: ExchangeRequest) -> Result<ExchangeResponse, BackendError> {
        let body = ChatRequest {
            text: &request.text,
            mood: request.mood.as_str(),
            history: &request.history,
            user_email: request.user_email.as_deref(),
            emergency_email: request.emergency_email.as_deref(),
        };

        let response: ChatResponse = self.post_json(self.chat_url(), &body).await?;

        debug!(
            action = ?response.action,
            history_len = request.history.len(),
            "Reflection exchange response"
        );

        Ok(ExchangeResponse {
            reply: response.reply,
            action: response.action,
        })
    }
}
