//! LLM provider dispatch for code generation.
//!
//! One HTTP client, two wire dialects: Anthropic's messages API and the
//! OpenAI-compatible chat-completions API (OpenAI, OpenRouter, Groq).
//! Requests are plain request/response; no streaming, no retries.

use std::time::Duration;

use reqwest::Client as HttpClient;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::Provider;

/// OpenAI API base URL.
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// OpenRouter API base URL.
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
/// Groq API base URL (OpenAI-compatible).
const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
/// Anthropic messages API URL.
const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Upper bound for generated output.
const MAX_OUTPUT_TOKENS: usize = 8192;

/// System prompt sent with every generation request.
const SYSTEM_PROMPT: &str = "You are CodeGenesis, an expert software architect. \
The user will describe an application; respond with one complete, standalone \
HTML file (inline CSS and JavaScript, Tailwind via CDN allowed) implementing \
it. When current code is provided, modify that code rather than starting \
over. Return only the HTML document, optionally inside a ```html code block.";

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Result of one generation call.
#[derive(Debug)]
pub struct GenerationOutcome {
    /// The extracted HTML document.
    pub code: String,
    /// Model that produced it.
    pub model: String,
    /// Total tokens reported by the provider, when available.
    pub tokens_used: Option<i64>,
}

// OpenAI-compatible wire types

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct ChatCompletionChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct TokenUsage {
    #[serde(default)]
    total_tokens: Option<i64>,
}

// Anthropic wire types

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: usize,
    system: String,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: Option<i64>,
    #[serde(default)]
    output_tokens: Option<i64>,
}

/// Dispatches generation requests to the chosen provider.
#[derive(Clone)]
pub struct LlmDispatcher {
    http_client: HttpClient,
}

impl std::fmt::Debug for LlmDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmDispatcher").finish()
    }
}

impl LlmDispatcher {
    /// Build the dispatcher with the configured request timeout.
    pub fn new(timeout_secs: u64) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Provider(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    /// Run one generation turn against the provider.
    pub async fn generate(
        &self,
        provider: Provider,
        api_key: &SecretString,
        model: &str,
        prompt: &str,
        current_code: Option<&str>,
    ) -> AppResult<GenerationOutcome> {
        let user_content = build_user_content(prompt, current_code);

        debug!("Dispatching generation to {} (model={})", provider, model);

        match provider {
            Provider::Anthropic => {
                self.generate_anthropic(api_key, model, user_content).await
            }
            Provider::OpenAi => {
                self.generate_openai_compatible(OPENAI_BASE_URL, api_key, model, user_content)
                    .await
            }
            Provider::OpenRouter => {
                self.generate_openai_compatible(OPENROUTER_BASE_URL, api_key, model, user_content)
                    .await
            }
            Provider::Groq => {
                self.generate_openai_compatible(GROQ_BASE_URL, api_key, model, user_content)
                    .await
            }
            Provider::Stability => Err(AppError::InvalidInput(
                "Provider 'stability' does not support code generation".to_string(),
            )),
        }
    }

    async fn generate_anthropic(
        &self,
        api_key: &SecretString,
        model: &str,
        user_content: String,
    ) -> AppResult<GenerationOutcome> {
        let request = AnthropicRequest {
            model: model.to_string(),
            max_tokens: MAX_OUTPUT_TOKENS,
            system: SYSTEM_PROMPT.to_string(),
            messages: vec![ChatMessage::user(user_content)],
        };

        let response = self
            .http_client
            .post(ANTHROPIC_MESSAGES_URL)
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "Anthropic API returned {}: {}",
                status, body
            )));
        }

        let parsed: AnthropicResponse = response.json().await?;

        let text = parsed
            .content
            .into_iter()
            .filter_map(|c| c.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(AppError::Provider(
                "Anthropic API returned no content".to_string(),
            ));
        }

        let tokens_used = parsed.usage.map(|u| {
            u.input_tokens.unwrap_or(0) + u.output_tokens.unwrap_or(0)
        });

        Ok(GenerationOutcome {
            code: extract_html(&text),
            model: model.to_string(),
            tokens_used,
        })
    }

    async fn generate_openai_compatible(
        &self,
        base_url: &str,
        api_key: &SecretString,
        model: &str,
        user_content: String,
    ) -> AppResult<GenerationOutcome> {
        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(user_content),
            ],
            max_tokens: MAX_OUTPUT_TOKENS,
        };

        let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "Chat completion API returned {}: {}",
                status, body
            )));
        }

        let parsed: ChatCompletionResponse = response.json().await?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::Provider("Chat completion returned no choices".to_string()))?;

        let tokens_used = parsed.usage.and_then(|u| u.total_tokens);

        Ok(GenerationOutcome {
            code: extract_html(&text),
            model: model.to_string(),
            tokens_used,
        })
    }
}

/// Assemble the user message: the prompt, plus the current code as context
/// when the editor has any.
fn build_user_content(prompt: &str, current_code: Option<&str>) -> String {
    match current_code {
        Some(code) if !code.trim().is_empty() => format!(
            "{}\n\nCurrent code:\n```html\n{}\n```",
            prompt, code
        ),
        _ => prompt.to_string(),
    }
}

/// Extract the HTML document from a model response.
///
/// Preference order: fenced ```html block, any fenced block, the raw text
/// from its first `<!DOCTYPE`/`<html` marker, then the trimmed text as-is.
pub fn extract_html(text: &str) -> String {
    if let Some(block) = extract_fenced_block(text, "```html") {
        return block;
    }
    if let Some(block) = extract_fenced_block(text, "```") {
        return block;
    }

    for marker in ["<!DOCTYPE", "<!doctype", "<html"] {
        if let Some(idx) = text.find(marker) {
            return text[idx..].trim().to_string();
        }
    }

    text.trim().to_string()
}

fn extract_fenced_block(text: &str, fence: &str) -> Option<String> {
    let start = text.find(fence)? + fence.len();
    let rest = &text[start..];
    // Skip the remainder of the fence line
    let body_start = rest.find('\n')? + 1;
    let body = &rest[body_start..];
    let end = body.find("```")?;
    let block = body[..end].trim();
    if block.is_empty() {
        None
    } else {
        Some(block.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_html_from_fenced_block() {
        let text = "Here you go:\n```html\n<!DOCTYPE html>\n<html></html>\n```\nEnjoy!";
        assert_eq!(extract_html(text), "<!DOCTYPE html>\n<html></html>");
    }

    #[test]
    fn test_extract_html_from_bare_document() {
        let text = "Sure thing.\n<!DOCTYPE html>\n<html><body>hi</body></html>";
        assert_eq!(
            extract_html(text),
            "<!DOCTYPE html>\n<html><body>hi</body></html>"
        );
    }

    #[test]
    fn test_extract_html_falls_back_to_trimmed_text() {
        let text = "  <div>fragment</div>  ";
        assert_eq!(extract_html(text), "<div>fragment</div>");
    }

    #[test]
    fn test_extract_html_prefers_html_fence_over_plain_fence() {
        let text = "```js\nconsole.log(1)\n```\n```html\n<html></html>\n```";
        assert_eq!(extract_html(text), "<html></html>");
    }

    #[test]
    fn test_user_content_includes_current_code() {
        let content = build_user_content("add a button", Some("<html></html>"));
        assert!(content.contains("add a button"));
        assert!(content.contains("<html></html>"));

        let bare = build_user_content("add a button", None);
        assert_eq!(bare, "add a button");

        // Whitespace-only code is treated as no context
        let blank = build_user_content("add a button", Some("   "));
        assert_eq!(blank, "add a button");
    }

    #[test]
    fn test_message_roles_serialize_lowercase() {
        let msg = ChatMessage::system("x");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "system");
    }
}
