use std::env;

use async_trait::async_trait;
use reqwest::Client;
use scholar_core::model::ChatTurn;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CompletionError;

/// Something that turns a conversation into the next assistant message.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns `Ok(None)` when the service answered without any text.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError` when the service is unavailable or rejects
    /// the request.
    async fn complete(&self, messages: &[ChatTurn]) -> Result<Option<String>, CompletionError>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompletionConfig {
    pub base_url: Url,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &'static str = "gpt-3.5-turbo";
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
    pub const DEFAULT_MAX_TOKENS: u32 = 500;

    /// # Errors
    ///
    /// Returns `CompletionError::InvalidBaseUrl` if `base_url` does not parse
    /// and `CompletionError::UnsupportedScheme` unless it is http(s).
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, CompletionError> {
        let base_url = Url::parse(base_url.trim())?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(CompletionError::UnsupportedScheme(
                base_url.scheme().to_string(),
            ));
        }
        Ok(Self {
            base_url,
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.into(),
            temperature: Self::DEFAULT_TEMPERATURE,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
        })
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Read settings from `SCHOLAR_AI_*` variables. A missing or blank API key
    /// leaves the tutor disabled.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError` if `SCHOLAR_AI_BASE_URL` is not a usable URL.
    pub fn from_env() -> Result<Option<Self>, CompletionError> {
        let Ok(api_key) = env::var("SCHOLAR_AI_API_KEY") else {
            return Ok(None);
        };
        if api_key.trim().is_empty() {
            return Ok(None);
        }
        let base_url =
            env::var("SCHOLAR_AI_BASE_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.into());
        let mut config = Self::new(&base_url, api_key)?;
        if let Some(model) = env::var("SCHOLAR_AI_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
        {
            config.model = model;
        }
        if let Some(temperature) = env::var("SCHOLAR_AI_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
        {
            config.temperature = temperature;
        }
        if let Some(max_tokens) = env::var("SCHOLAR_AI_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            config.max_tokens = max_tokens;
        }
        Ok(Some(config))
    }

    fn endpoint(&self) -> Result<Url, CompletionError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/chat/completions"))?)
    }
}

/// OpenAI-compatible `/chat/completions` client.
#[derive(Clone)]
pub struct OpenAiCompletionClient {
    client: Client,
    config: Option<CompletionConfig>,
}

impl OpenAiCompletionClient {
    /// # Errors
    ///
    /// Returns `CompletionError` if the environment carries an invalid base URL.
    pub fn from_env() -> Result<Self, CompletionError> {
        Ok(Self::new(CompletionConfig::from_env()?))
    }

    #[must_use]
    pub fn new(config: Option<CompletionConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, messages: &[ChatTurn]) -> Result<Option<String>, CompletionError> {
        let config = self.config.as_ref().ok_or(CompletionError::Disabled)?;

        let payload = ChatRequest::new(config, messages);
        let response = self
            .client
            .post(config.endpoint()?)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CompletionError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        Ok(body.into_reply())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

impl<'a> ChatRequest<'a> {
    fn new(config: &'a CompletionConfig, turns: &'a [ChatTurn]) -> Self {
        Self {
            model: &config.model,
            messages: turns
                .iter()
                .map(|turn| ChatMessage {
                    role: turn.role.as_str(),
                    content: &turn.content,
                })
                .collect(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

impl ChatResponse {
    fn into_reply(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholar_core::model::ChatRole;

    #[test]
    fn config_defaults_match_tutor_settings() {
        let config = CompletionConfig::new("https://api.openai.com/v1", "key").unwrap();
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.max_tokens, 500);
        assert_eq!(
            config.endpoint().unwrap().as_str(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn trailing_slash_does_not_double_up() {
        let config = CompletionConfig::new("http://localhost:8080/v1/", "key").unwrap();
        assert_eq!(
            config.endpoint().unwrap().as_str(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(
            CompletionConfig::new("not a url", "key"),
            Err(CompletionError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            CompletionConfig::new("ftp://example.com", "key"),
            Err(CompletionError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn request_carries_roles_and_parameters() {
        let config = CompletionConfig::new("https://example.com/v1", "key")
            .unwrap()
            .with_model("tiny");
        let turns = vec![
            ChatTurn::new(ChatRole::System, "be nice"),
            ChatTurn::new(ChatRole::User, "hi"),
            ChatTurn::new(ChatRole::Assistant, "hello"),
        ];
        let json = serde_json::to_value(ChatRequest::new(&config, &turns)).unwrap();
        assert_eq!(json["model"], "tiny");
        assert_eq!(json["max_tokens"], 500);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["messages"][2]["role"], "assistant");
    }

    #[test]
    fn reply_uses_first_choice() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"  first  "}},{"message":{"content":"second"}}]}"#,
        )
        .unwrap();
        assert_eq!(body.into_reply().as_deref(), Some("first"));
    }

    #[test]
    fn missing_content_yields_none() {
        let null: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(null.into_reply(), None);
        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(empty.into_reply(), None);
        let blank: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"  "}}]}"#).unwrap();
        assert_eq!(blank.into_reply(), None);
    }

    #[tokio::test]
    async fn disabled_client_refuses_requests() {
        let client = OpenAiCompletionClient::new(None);
        assert!(!client.enabled());
        let err = client.complete(&[]).await.unwrap_err();
        assert!(matches!(err, CompletionError::Disabled));
    }
}
