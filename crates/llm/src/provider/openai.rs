mod input;
mod output;

use std::time::Duration;

use async_trait::async_trait;
use config::LlmConfig;
use eventsource_stream::Eventsource;
use futures::{StreamExt, future};
use reqwest::{Client, RequestBuilder, Response, header::AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use self::{
    input::{OpenAIChatRequest, OpenAIImageRequest},
    output::{OpenAIImageResponse, OpenAIResponse, OpenAIStreamChunk},
};

use crate::{
    client::{FragmentStream, ModelClient},
    error::LlmError,
    image::ImageRequest,
    messages::ChatMessage,
};

const DONE_MARKER: &str = "[DONE]";

/// Model client talking to an OpenAI-compatible HTTP API.
///
/// The configured timeout bounds connecting and every wait for response bytes.
/// Complete replies are additionally bounded as a whole; streaming replies are
/// not, so a long answer is never cut off while the provider keeps sending.
pub struct OpenAIClient {
    client: Client,
    timeout: Duration,
    base_url: String,
    api_key: Option<SecretString>,
    chat_model: String,
    image_model: Option<String>,
}

impl OpenAIClient {
    pub fn new(config: &LlmConfig) -> crate::Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .read_timeout(config.timeout)
            .build()
            .map_err(|e| {
                log::error!("Failed to create HTTP client for the model provider: {e}");
                LlmError::InternalError(None)
            })?;

        Ok(Self {
            client,
            timeout: config.timeout,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            chat_model: config.chat_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    fn post(&self, endpoint: &str) -> RequestBuilder {
        let request = self.client.post(format!("{}{endpoint}", self.base_url));

        match &self.api_key {
            Some(key) => request.header(AUTHORIZATION, format!("Bearer {}", key.expose_secret())),
            None => request,
        }
    }

    /// Sends the request and turns non-success statuses into errors.
    async fn send(&self, request: RequestBuilder, operation: &str) -> crate::Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| LlmError::ConnectionError(format!("Failed to send {operation} request to provider: {e}")))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Provider {operation} error ({status}): {error_text}");

            return Err(LlmError::from_provider_status(status.as_u16(), error_text));
        }

        Ok(response)
    }

    async fn parse<T: DeserializeOwned>(response: Response, operation: &str) -> crate::Result<T> {
        // read as text first so the body can be logged if parsing fails
        let response_text = response.text().await.map_err(|e| {
            log::error!("Failed to read provider {operation} response body: {e}");
            LlmError::InternalError(None)
        })?;

        sonic_rs::from_str(&response_text).map_err(|e| {
            log::error!("Failed to parse provider {operation} response: {e}");
            log::error!("Raw response that failed to parse: {response_text}");
            LlmError::InternalError(None)
        })
    }
}

#[async_trait]
impl ModelClient for OpenAIClient {
    async fn multi_chat(&self, messages: &[ChatMessage]) -> crate::Result<String> {
        let body = OpenAIChatRequest {
            model: &self.chat_model,
            messages,
            stream: false,
        };

        let response = self
            .send(self.post("/chat/completions").timeout(self.timeout).json(&body), "chat")
            .await?;
        let response: OpenAIResponse = Self::parse(response, "chat").await?;

        response.into_reply().ok_or_else(|| {
            log::error!("Provider chat response contained no choices");
            LlmError::InternalError(Some("Provider returned an empty reply".to_string()))
        })
    }

    async fn chat_stream(&self, messages: &[ChatMessage]) -> crate::Result<FragmentStream> {
        let body = OpenAIChatRequest {
            model: &self.chat_model,
            messages,
            stream: true,
        };

        let response = self
            .send(self.post("/chat/completions").json(&body), "streaming chat")
            .await?;

        let fragments = response
            .bytes_stream()
            .eventsource()
            .take_while(|event| future::ready(!matches!(event, Ok(event) if event.data == DONE_MARKER)))
            .filter_map(|event| async move {
                let event = match event {
                    Ok(event) => event,
                    Err(e) => {
                        return Some(Err(LlmError::ConnectionError(format!(
                            "Provider stream interrupted: {e}"
                        ))));
                    }
                };

                match sonic_rs::from_str::<OpenAIStreamChunk>(&event.data) {
                    Ok(chunk) => chunk.into_fragment().map(Ok),
                    Err(e) => {
                        log::warn!("Failed to parse provider streaming chunk: {e}");
                        None
                    }
                }
            });

        Ok(Box::pin(fragments))
    }

    async fn generate_images(&self, request: &ImageRequest) -> crate::Result<Vec<String>> {
        let body = OpenAIImageRequest {
            model: self.image_model.as_deref(),
            prompt: &request.prompt,
            n: request.count,
            size: request.size.dimensions(),
            response_format: request.format.response_format(),
        };

        let response = self
            .send(self.post("/images/generations").timeout(self.timeout).json(&body), "image")
            .await?;
        let response: OpenAIImageResponse = Self::parse(response, "image").await?;

        Ok(response.into_references(request.format))
    }
}
