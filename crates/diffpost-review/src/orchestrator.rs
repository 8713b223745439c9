use std::fmt;
use std::sync::Arc;

use diffpost_core::{ActionConfig, DiffpostError, ReviewOutcome};

use crate::comment::{render_envelope, upsert_review_comment, UpsertAction};
use crate::diff::aggregate_patches;
use crate::event::read_event;
use crate::generator::ReviewGenerator;
use crate::github::GitHubClient;
use crate::http::{HttpClient, Transport};
use crate::llm::LlmClient;

/// Review text published when the pull request has nothing diffable.
pub const EMPTY_DIFF_NOTICE: &str =
    "No reviewable changes found: the pull request diff is empty or contains only binary files.";

/// How the review section of the published comment was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStage {
    /// Nothing to review; the backend was not called.
    EmptyDiff,
    /// The backend returned review text.
    Generated,
    /// The backend failed; its error is in the comment.
    Failed,
}

/// Terminal state of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The triggering event carries no pull request.
    NotApplicable,
    /// The marker comment was created or updated.
    Published {
        /// Create or update, with the comment id.
        action: UpsertAction,
        /// Where the review text came from.
        stage: ReviewStage,
    },
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotApplicable => write!(f, "not a pull request event, nothing to do"),
            Self::Published { action, stage } => {
                let verb = match action {
                    UpsertAction::Created { .. } => "created",
                    UpsertAction::Updated { .. } => "updated",
                };
                let what = match stage {
                    ReviewStage::EmptyDiff => "empty-diff notice",
                    ReviewStage::Generated => "review",
                    ReviewStage::Failed => "review failure report",
                };
                write!(f, "{verb} comment {} with {what}", action.comment_id())
            }
        }
    }
}

/// Drives one run: event, diff, review, comment.
///
/// Every network call is awaited in turn: file pages, the generation
/// call, comment pages, then the create or update. Comment lookup happens
/// after generation so the create-vs-update decision reflects the thread
/// at publish time.
pub struct Orchestrator {
    config: ActionConfig,
    github: GitHubClient,
    generator: ReviewGenerator,
}

impl Orchestrator {
    /// Wire the GitHub client and review generator onto `transport`.
    pub fn new(config: &ActionConfig, transport: Arc<dyn Transport>) -> Self {
        let http = HttpClient::new(transport);
        let github = GitHubClient::new(http.clone(), &config.github);
        let generator = ReviewGenerator::new(LlmClient::new(http, &config.llm));
        Self {
            config: config.clone(),
            github,
            generator,
        }
    }

    /// Perform the run.
    ///
    /// # Errors
    ///
    /// Event-file, listing, and publishing failures abort the run. A
    /// failing review backend does not: its error is published instead.
    pub async fn run(&self) -> Result<RunOutcome, DiffpostError> {
        let Some(pr) = read_event(
            &self.config.event_path,
            &self.config.github.owner,
            &self.config.github.repo,
        )?
        else {
            tracing::info!("event has no pull_request, skipping");
            return Ok(RunOutcome::NotApplicable);
        };
        tracing::info!(
            pr = %pr,
            base = %pr.base_sha,
            head = %pr.head_sha,
            "reviewing pull request"
        );

        let files = self.github.list_pull_files(&pr).await?;
        let diff = aggregate_patches(&files);
        tracing::debug!(diff_bytes = diff.len(), "aggregated diff");

        let (stage, review_text) = if diff.is_empty() {
            tracing::info!("diff is empty, skipping review generation");
            (ReviewStage::EmptyDiff, EMPTY_DIFF_NOTICE.to_string())
        } else {
            let outcome = self
                .generator
                .generate(&self.config.prompt_template, &diff)
                .await;
            let stage = match outcome {
                ReviewOutcome::Success { .. } => ReviewStage::Generated,
                ReviewOutcome::Failure { .. } => ReviewStage::Failed,
            };
            (stage, outcome.comment_text())
        };

        let body = render_envelope(self.generator.model(), &review_text);
        let action = upsert_review_comment(&self.github, &pr, &body).await?;

        Ok(RunOutcome::Published { action, stage })
    }
}
