//! Content Generation Services
//!
//! Problem statements and feedback are produced by a remote text-generation
//! service. This module defines the seam the rest of the system talks to and
//! the concrete backends behind it. No backend retries; a failed call is
//! reported to the caller as-is.

use anyhow::{Context, Result, bail};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Defines the contract for any service that can turn a prompt into markdown.
///
/// This abstraction lets the system swap between a hosted prompt endpoint, an
/// OpenAI-compatible model, or canned output without touching callers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentService: Send + Sync {
    /// Sends a fully rendered prompt and returns the generated markdown.
    async fn complete(&self, prompt: String) -> Result<String>;
}

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Request body accepted by the hosted prompt endpoint.
#[derive(Serialize)]
struct PromptBody<'a> {
    prompt: &'a str,
}

/// Reply shape of the hosted prompt endpoint: `{"bot": {"content": "..."}}`.
#[derive(Deserialize, Debug)]
struct EndpointReply {
    bot: Option<BotReply>,
}

#[derive(Deserialize, Debug)]
struct BotReply {
    content: Option<String>,
}

/// A `ContentService` backed by a plain HTTP prompt endpoint.
pub struct PromptEndpointClient {
    client: reqwest::Client,
    url: String,
}

impl PromptEndpointClient {
    /// Creates a client for the endpoint at `url`. Every request is bounded by `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ContentService for PromptEndpointClient {
    async fn complete(&self, prompt: String) -> Result<String> {
        debug!(url = %self.url, prompt_len = prompt.len(), "Posting prompt to endpoint");
        let response = self
            .client
            .post(&self.url)
            .json(&PromptBody { prompt: &prompt })
            .send()
            .await
            .context("Failed to reach prompt endpoint")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Prompt endpoint returned {}", status);
        }

        let reply: EndpointReply = response
            .json()
            .await
            .context("Prompt endpoint returned malformed JSON")?;
        extract_content(reply)
    }
}

fn extract_content(reply: EndpointReply) -> Result<String> {
    reply
        .bot
        .and_then(|bot| bot.content)
        .filter(|content| !content.trim().is_empty())
        .context("Prompt endpoint reply had no content")
}

/// A `ContentService` that uses an OpenAI-compatible chat completion API.
pub struct LLMContentService {
    client: Client<OpenAIConfig>,
    model: String,
}

impl LLMContentService {
    /// Creates a new LLM-backed content service.
    ///
    /// # Arguments
    ///
    /// * `config` - OpenAI API configuration (API key, base URL, etc.).
    /// * `model` - Model identifier to use for generation (e.g., "gpt-4o").
    /// * `timeout` - Upper bound for each completion request.
    pub fn new(config: OpenAIConfig, model: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::with_config(config).with_http_client(http_client(timeout)?),
            model,
        })
    }
}

#[async_trait]
impl ContentService for LLMContentService {
    async fn complete(&self, prompt: String) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content("You are an experienced technical interviewer and algorithms tutor.")
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into(),
            ])
            .build()?;

        let response = self.client.chat().create(request).await?;

        let answer = response
            .choices
            .first()
            .context("No response choice from LLM")?
            .message
            .content
            .clone()
            .context("No content in LLM response")?;

        info!(model = %self.model, len = answer.len(), "LLM content generated");
        Ok(answer)
    }
}

/// A `ContentService` that always answers with the same markdown.
///
/// Useful for local development and tests where no network is available.
pub struct StaticContentService {
    reply: String,
}

impl StaticContentService {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl Default for StaticContentService {
    fn default() -> Self {
        Self::new(
            "#### Reverse a List\n\
             Given an array of integers, reverse it in place and return it.\n\n\
             #### Example\n\
             Input: `[1, 2, 3]` Output: `[3, 2, 1]`\n\n\
             #### Constraints\n\
             `0 <= n <= 10^5`\n\n\
             #### Hint\n\
             Work inwards from both ends.",
        )
    }
}

#[async_trait]
impl ContentService for StaticContentService {
    async fn complete(&self, _prompt: String) -> Result<String> {
        Ok(self.reply.clone())
    }
}
