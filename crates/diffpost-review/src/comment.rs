use diffpost_core::{DiffpostError, ExistingComment, PullRequestRef};

use crate::github::GitHubClient;

/// Hidden token identifying the comment this tool owns.
pub const COMMENT_MARKER: &str = "<!-- diffpost-review -->";

/// Heading placed above the review text.
pub const SECTION_LABEL: &str = "### Review";

/// Fixed footer of every published comment.
pub const TRAILING_NOTE: &str =
    "_Generated by diffpost. This comment is updated in place on every push._";

/// Render the comment body for `model` and `review_text`.
///
/// The output depends on nothing but the two arguments, and the marker is
/// always the very first thing in the body.
///
/// # Examples
///
/// ```
/// use diffpost_review::comment::{render_envelope, COMMENT_MARKER};
///
/// let body = render_envelope("gpt-4o", "Looks good.");
/// assert!(body.starts_with(COMMENT_MARKER));
/// assert!(body.contains("AI Code Review (model: gpt-4o)"));
/// ```
pub fn render_envelope(model: &str, review_text: &str) -> String {
    format!(
        "{COMMENT_MARKER}\nAI Code Review (model: {model})\n{SECTION_LABEL}\n{review_text}\n{TRAILING_NOTE}"
    )
}

/// First comment, in listing order, whose body contains [`COMMENT_MARKER`].
pub fn find_marker_comment(comments: &[ExistingComment]) -> Option<&ExistingComment> {
    comments.iter().find(|c| c.body.contains(COMMENT_MARKER))
}

/// What [`upsert_review_comment`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    /// No marker comment existed; a new one was posted.
    Created {
        /// Identifier of the new comment.
        id: u64,
    },
    /// The first marker comment was rewritten in place.
    Updated {
        /// Identifier of the rewritten comment.
        id: u64,
    },
}

impl UpsertAction {
    /// Identifier of the comment that now carries the review.
    pub fn comment_id(&self) -> u64 {
        match self {
            Self::Created { id } | Self::Updated { id } => *id,
        }
    }
}

/// Create or replace the marker comment on `pr` with `body`.
///
/// The thread is listed fresh on every call; nothing is cached between
/// runs. When several marker comments already exist only the first one is
/// updated and the rest are left alone. Two runs racing each other can both
/// see no marker and both create one.
///
/// # Errors
///
/// Returns the listing error if the thread cannot be fully enumerated, or
/// the create/update error. No write happens after a failed listing.
pub async fn upsert_review_comment(
    github: &GitHubClient,
    pr: &PullRequestRef,
    body: &str,
) -> Result<UpsertAction, DiffpostError> {
    let comments = github.list_issue_comments(pr).await?;

    match find_marker_comment(&comments) {
        Some(existing) => {
            let duplicates = comments
                .iter()
                .filter(|c| c.body.contains(COMMENT_MARKER))
                .count()
                - 1;
            if duplicates > 0 {
                tracing::warn!(
                    comment_id = existing.id,
                    duplicates,
                    "multiple review comments found, updating the first"
                );
            }
            let updated = github.update_comment(pr, existing.id, body).await?;
            tracing::info!(comment_id = updated.id, pr = %pr, "updated review comment");
            Ok(UpsertAction::Updated { id: updated.id })
        }
        None => {
            let created = github.create_comment(pr, body).await?;
            tracing::info!(comment_id = created.id, pr = %pr, "created review comment");
            Ok(UpsertAction::Created { id: created.id })
        }
    }
}
