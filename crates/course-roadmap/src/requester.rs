/// LLM content requests.
///
/// The pipeline treats the LLM as unreliable: every failure mode (timeout, transport,
/// upstream error, missing content) collapses to `None` after being logged.
use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use roadmap_common::openai::{ChatCompletionRequest, Message, OpenAiClient};

pub trait ContentRequester: Send + Sync {
    /// Send `prompt` to `model` and return the raw text reply, or `None` on any failure.
    fn request(&self, prompt: &str, model: &str) -> impl Future<Output = Option<String>> + Send;
}

#[derive(Clone)]
pub struct LlmRequester {
    openai: Arc<OpenAiClient>,
}

impl LlmRequester {
    pub fn new(openai: Arc<OpenAiClient>) -> Self {
        Self { openai }
    }
}

impl ContentRequester for LlmRequester {
    async fn request(&self, prompt: &str, model: &str) -> Option<String> {
        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![Message::user(prompt)],
        };

        let response = match self.openai.chat_completions(request, None).await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!(model, "LLM request timed out");
                return None;
            }
            Err(e) => {
                warn!(model, error = %e, "LLM request failed");
                return None;
            }
        };

        let text = response.first_content().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            warn!(model, "LLM returned no content");
            return None;
        }
        debug!(model, chars = text.len(), "LLM content received");
        Some(text.to_string())
    }
}
