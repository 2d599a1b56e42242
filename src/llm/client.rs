//! OpenAI-compatible HTTP client for completion and embedding calls.
//!
//! One client serves both traits because every OpenAI-compatible backend
//! exposes chat completions and embeddings under the same base URL with the
//! same auth header. The client carries its own request timeout; retry policy
//! lives with the caller.

use crate::error::QaError;
use crate::llm::{CompletionClient, Embedder};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Chat message for completion requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Client for OpenAI-compatible completion and embedding endpoints.
pub struct OpenAiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    embedding_model: String,
}

impl OpenAiClient {
    /// Create a client against `base_url` with an optional bearer token.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, QaError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            embedding_model: std::env::var("PDFQA_EMBEDDING_MODEL")
                .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string()),
        })
    }

    /// Resolve a client from the environment.
    ///
    /// Resolution order, most-specific first:
    /// 1. explicit `base_url`/`model` overrides passed by the caller
    /// 2. `PDFQA_BASE_URL` / `PDFQA_MODEL`
    /// 3. `https://api.openai.com` + `gpt-4o`, requiring `OPENAI_API_KEY`
    ///
    /// A non-default base URL (a local vLLM or LM Studio endpoint) does not
    /// require an API key; the default OpenAI endpoint does.
    pub fn from_env(
        base_url: Option<&str>,
        model: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, QaError> {
        let base_url = base_url
            .map(str::to_string)
            .or_else(|| std::env::var("PDFQA_BASE_URL").ok().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let model = model
            .map(str::to_string)
            .or_else(|| std::env::var("PDFQA_MODEL").ok().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|s| !s.is_empty());

        if api_key.is_none() && base_url == DEFAULT_BASE_URL {
            return Err(QaError::BackendNotConfigured {
                hint: "Set OPENAI_API_KEY, or point PDFQA_BASE_URL at an \
                       OpenAI-compatible endpoint that needs no key."
                    .to_string(),
            });
        }

        Self::new(base_url, api_key, model, timeout_secs)
    }

    /// Model name used for completion requests.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Model name used for embedding requests.
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("Authorization", format!("Bearer {}", key)),
            None => req,
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, QaError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(QaError::Backend { status, body })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, QaError> {
        #[derive(Serialize)]
        struct ChatRequest {
            model: String,
            messages: Vec<ChatMessage>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatMessage,
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature,
            max_tokens,
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        tracing::debug!("POST {} (model {})", url, self.model);

        let response = self
            .authed(self.http_client.post(&url).json(&request))
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let chat_response: ChatResponse = response.json().await?;
        let content = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| QaError::BadReply("completion reply had no choices".to_string()))?
            .message
            .content;

        Ok(content)
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, QaError> {
        #[derive(Serialize)]
        struct EmbedRequest<'a> {
            model: &'a str,
            input: &'a [String],
        }

        #[derive(Deserialize)]
        struct EmbedResponse {
            data: Vec<EmbedData>,
        }

        #[derive(Deserialize)]
        struct EmbedData {
            embedding: Vec<f32>,
        }

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbedRequest {
            model: &self.embedding_model,
            input: texts,
        };

        let url = format!("{}/v1/embeddings", self.base_url);
        tracing::debug!("POST {} ({} texts)", url, texts.len());

        let response = self
            .authed(self.http_client.post(&url).json(&request))
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let embed_response: EmbedResponse = response.json().await?;
        if embed_response.data.len() != texts.len() {
            return Err(QaError::BadReply(format!(
                "embedding reply had {} vectors for {} inputs",
                embed_response.data.len(),
                texts.len()
            )));
        }

        Ok(embed_response.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client =
            OpenAiClient::new("http://localhost:8000/", None, "test-model", 10).unwrap();
        assert_eq!(client.base_url, "http://localhost:8000");
        assert_eq!(client.model(), "test-model");
    }

    #[test]
    fn chat_message_constructors() {
        let sys = ChatMessage::system("rules");
        let user = ChatMessage::user("payload");
        assert_eq!(sys.role, "system");
        assert_eq!(user.role, "user");
        assert_eq!(user.content, "payload");
    }
}
