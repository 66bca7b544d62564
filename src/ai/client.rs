use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use super::models::{AiResponse, ChatOptions, TokenUsage};
use crate::config::AzureOpenAiConfig;
use crate::ui;

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 500;

/// Chat-completion client for a single Azure OpenAI deployment.
pub struct AzureOpenAIClient {
    http_client: reqwest::Client,
    chat_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: [ChatRequestMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<UsageCounts>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct UsageCounts {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl AzureOpenAIClient {
    pub fn new(config: &AzureOpenAiConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("m365-assistant/0.1")
            .build()
            .expect("Failed to build HTTP client");

        let chat_url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            config.endpoint.trim_end_matches('/'),
            urlencoding::encode(&config.deployment),
            config.api_version,
        );

        Self {
            http_client,
            chat_url,
            api_key: config.api_key.clone(),
        }
    }

    /// Send a two-message (system + user) chat completion request.
    ///
    /// Temperature defaults to 0.7 and the output cap to 500 tokens when
    /// the caller leaves them unset.
    pub async fn chat(
        &self,
        system_prompt: &str,
        user_message: &str,
        options: ChatOptions,
    ) -> Result<AiResponse> {
        let request = ChatRequest {
            messages: [
                ChatRequestMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatRequestMessage {
                    role: "user",
                    content: user_message,
                },
            ],
            temperature: options.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        };

        debug!("Sending chat completion request to {}", self.chat_url);

        let response = match self
            .http_client
            .post(&self.chat_url)
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                error!("Azure OpenAI request error: {err}");
                return Err(anyhow::Error::new(err).context("Azure OpenAI request failed"));
            }
        };

        let status = response.status();
        debug!("Chat completion status: {status}");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Azure OpenAI returned {status}: {body}");
            anyhow::bail!("Azure OpenAI request failed with status {}: {}", status, body);
        }

        let completion: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            error!("Chat completion carried no usable content");
            anyhow::bail!("No response content from AI");
        }

        let usage = completion.usage.unwrap_or_default();

        Ok(AiResponse {
            content,
            tokens_used: TokenUsage {
                prompt: usage.prompt_tokens,
                completion: usage.completion_tokens,
                total: usage.total_tokens,
            },
        })
    }

    /// Diagnostic connectivity check. Failures are logged and reported as
    /// `false`, never raised.
    pub async fn test_connection(&self) -> bool {
        println!("🔍 Testing Azure OpenAI connection...");

        let result = ui::with_spinner(
            "Contacting Azure OpenAI...",
            self.chat(
                "You are a helpful assistant.",
                "Say \"Hello! Connection successful.\" in exactly those words.",
                ChatOptions {
                    temperature: Some(0.0),
                    max_tokens: Some(50),
                },
            ),
        )
        .await;

        match result {
            Ok(response) => {
                println!("{}", "✅ Azure OpenAI connection successful!".green());
                println!("   Response: {}", response.content);
                println!("   Tokens used: {}\n", response.tokens_used.total);
                true
            }
            Err(err) => {
                error!("Azure OpenAI connectivity test failed: {err:#}");
                println!("{} {err:#}", "❌ Azure OpenAI connection failed:".red());
                false
            }
        }
    }
}
