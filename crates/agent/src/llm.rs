use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use quartermaster_core::config::{LlmConfig, LlmProvider};

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Chat-completions client for OpenAI-compatible endpoints (OpenAI, Anthropic's
/// compatibility surface, Ollama). Retry and failover policy belongs to the
/// caller; this client makes exactly one attempt per `complete`.
pub struct HttpLlmClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<SecretString>,
}

impl HttpLlmClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("could not build llm http client")?;

        let base_url = match (&config.base_url, config.provider) {
            (Some(base_url), _) => base_url.clone(),
            (None, LlmProvider::OpenAi) => "https://api.openai.com".to_string(),
            (None, LlmProvider::Anthropic) => "https://api.anthropic.com".to_string(),
            (None, LlmProvider::Ollama) => "http://localhost:11434".to_string(),
        };

        Ok(Self {
            http,
            endpoint: chat_completions_endpoint(&base_url),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

fn chat_completions_endpoint(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let base = base.strip_suffix("/v1").unwrap_or(base);
    format!("{base}/v1/chat/completions")
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: 0.2,
        };

        let mut builder = self.http.post(&self.endpoint).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let response = builder.send().await.context("llm request failed")?;
        let status = response.status();
        if !status.is_success() {
            bail!("llm request returned status {status}");
        }

        let completion = response
            .json::<ChatCompletionResponse>()
            .await
            .context("llm response was not valid chat-completion JSON")?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .context("llm response contained no choices")?;
        Ok(choice.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::{chat_completions_endpoint, ChatCompletionResponse};

    #[test]
    fn endpoint_construction_normalizes_base_urls() {
        assert_eq!(
            chat_completions_endpoint("https://api.openai.com"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            chat_completions_endpoint("http://localhost:11434/"),
            "http://localhost:11434/v1/chat/completions"
        );
        assert_eq!(
            chat_completions_endpoint("https://gateway.example/v1"),
            "https://gateway.example/v1/chat/completions"
        );
    }

    #[test]
    fn parses_first_choice_content() {
        let raw = r#"{"choices":[{"message":{"content":"hello there"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).expect("wire shape");
        assert_eq!(parsed.choices[0].message.content, "hello there");
    }
}
