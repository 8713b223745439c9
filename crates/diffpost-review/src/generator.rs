use diffpost_core::{PromptTemplate, ReviewOutcome};

use crate::llm::LlmClient;

/// Turns an aggregated diff into a [`ReviewOutcome`].
///
/// This is the only place where an error is intentionally converted into
/// data: whatever goes wrong while talking to the backend ends up as
/// [`ReviewOutcome::Failure`] so the comment still gets published.
pub struct ReviewGenerator {
    llm: LlmClient,
}

impl ReviewGenerator {
    /// Wrap an LLM client.
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    /// Model identifier reported in the published comment.
    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Render the prompt from `template` and `diff`, then ask the backend.
    pub async fn generate(&self, template: &PromptTemplate, diff: &str) -> ReviewOutcome {
        let prompt = template.render(diff);
        tracing::info!(
            model = self.llm.model(),
            prompt_bytes = prompt.len(),
            "requesting review"
        );

        match self.llm.generate(&prompt).await {
            Ok(text) => {
                tracing::info!(review_bytes = text.len(), "review generated");
                ReviewOutcome::Success { text }
            }
            Err(e) => {
                tracing::warn!(error = %e, "review generation failed");
                ReviewOutcome::Failure {
                    error_message: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use diffpost_core::{LlmProvider, LlmSettings, Secret};
    use mockito::{Matcher, Server};

    use super::*;
    use crate::http::{HttpClient, ReqwestTransport};

    fn generator(base_url: String) -> ReviewGenerator {
        let http = HttpClient::new(Arc::new(ReqwestTransport::new().unwrap()));
        ReviewGenerator::new(LlmClient::new(
            http,
            &LlmSettings {
                provider: LlmProvider::OpenAi,
                model: "gpt-test".into(),
                api_key: Secret::new("k"),
                base_url,
            },
        ))
    }

    #[tokio::test]
    async fn substitutes_diff_into_prompt() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "messages": [{ "content": "before\n+added\nafter +added" }],
            })))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"Nice change."}}]}"#)
            .create_async()
            .await;

        let template = PromptTemplate::parse("before\n{{DIFF}}\nafter {{DIFF}}").unwrap();
        let outcome = generator(server.url()).generate(&template, "+added").await;

        assert_eq!(
            outcome,
            ReviewOutcome::Success {
                text: "Nice change.".into()
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn backend_failure_is_contained() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let template = PromptTemplate::parse("{{DIFF}}").unwrap();
        let outcome = generator(server.url()).generate(&template, "+x").await;

        match outcome {
            ReviewOutcome::Failure { error_message } => {
                assert!(error_message.contains("429"));
                assert!(error_message.contains("rate limited"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_backend_is_contained() {
        let template = PromptTemplate::parse("{{DIFF}}").unwrap();
        let outcome = generator("http://127.0.0.1:1".into())
            .generate(&template, "+x")
            .await;
        assert!(!outcome.is_success());
    }
}
