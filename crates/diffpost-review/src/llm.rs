use diffpost_core::{DiffpostError, LlmProvider, LlmSettings};
use reqwest::Method;

use crate::http::{HttpClient, HttpRequest};

/// Single-shot text-generation client.
///
/// Speaks either the OpenAI-compatible `/v1/chat/completions` dialect
/// (OpenAI, Ollama, vLLM, LiteLLM) or Gemini's `generateContent`.
pub struct LlmClient {
    http: HttpClient,
    settings: LlmSettings,
}

impl LlmClient {
    /// Create a client for the backend described by `settings`.
    pub fn new(http: HttpClient, settings: &LlmSettings) -> Self {
        Self {
            http,
            settings: settings.clone(),
        }
    }

    /// Return the configured model identifier.
    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Send `prompt` as one user turn and return the generated text.
    ///
    /// # Errors
    ///
    /// Returns [`DiffpostError::Llm`] for transport failures, non-success
    /// statuses, unparseable bodies, and missing or blank text.
    pub async fn generate(&self, prompt: &str) -> Result<String, DiffpostError> {
        let request = match self.settings.provider {
            LlmProvider::OpenAi => self.openai_request(prompt)?,
            LlmProvider::Gemini => self.gemini_request(prompt)?,
        };

        let body: serde_json::Value = self
            .http
            .send_json(request)
            .await
            .map_err(|e| DiffpostError::Llm(e.to_string()))?;

        let text = extract_text(self.settings.provider, &body).ok_or_else(|| {
            DiffpostError::Llm(format!("unexpected response structure: {body}"))
        })?;
        if text.trim().is_empty() {
            return Err(DiffpostError::Llm("model returned an empty response".into()));
        }
        Ok(text)
    }

    fn openai_request(&self, prompt: &str) -> Result<HttpRequest, DiffpostError> {
        let url = format!("{}/v1/chat/completions", self.settings.base_url);
        HttpRequest::new(Method::POST, url)
            .header(
                "Authorization",
                format!("Bearer {}", self.settings.api_key.expose()),
            )
            .json(&serde_json::json!({
                "model": self.settings.model,
                "messages": [{ "role": "user", "content": prompt }],
                "temperature": 0.1,
            }))
    }

    fn gemini_request(&self, prompt: &str) -> Result<HttpRequest, DiffpostError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url, self.settings.model
        );
        HttpRequest::new(Method::POST, url)
            .header("x-goog-api-key", self.settings.api_key.expose())
            .json(&serde_json::json!({
                "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            }))
    }
}

fn extract_text(provider: LlmProvider, body: &serde_json::Value) -> Option<String> {
    match provider {
        LlmProvider::OpenAi => body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(str::to_string),
        LlmProvider::Gemini => {
            let parts = body
                .get("candidates")
                .and_then(|c| c.get(0))
                .and_then(|c| c.get("content"))
                .and_then(|c| c.get("parts"))
                .and_then(|p| p.as_array())?;
            let texts: Vec<&str> = parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect();
            if texts.is_empty() {
                None
            } else {
                Some(texts.concat())
            }
        }
    }
}
