use std::fmt;

use serde::{Deserialize, Deserializer};

/// The pull request every call in a run is aimed at.
///
/// Derived once from the triggering event and never mutated afterwards.
///
/// # Examples
///
/// ```
/// use diffpost_core::PullRequestRef;
///
/// let pr = PullRequestRef {
///     owner: "octocat".into(),
///     repo: "hello-world".into(),
///     number: 42,
///     base_sha: "aaa111".into(),
///     head_sha: "bbb222".into(),
/// };
/// assert_eq!(pr.to_string(), "octocat/hello-world#42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    /// Repository owner (user or organisation).
    pub owner: String,
    /// Repository name without the owner.
    pub repo: String,
    /// Pull request number.
    pub number: u64,
    /// Base revision SHA.
    pub base_sha: String,
    /// Head revision SHA.
    pub head_sha: String,
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// One changed file as reported by the pull request file listing.
///
/// `patch` is absent when the platform omits it (binary or oversized files).
///
/// # Examples
///
/// ```
/// use diffpost_core::FilePatch;
///
/// let file: FilePatch =
///     serde_json::from_str(r#"{"filename":"logo.png","status":"added"}"#).unwrap();
/// assert_eq!(file.path, "logo.png");
/// assert!(file.patch.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilePatch {
    /// Path of the file relative to the repository root.
    #[serde(rename = "filename")]
    pub path: String,
    /// Unified diff fragment, if the platform supplied one.
    #[serde(default)]
    pub patch: Option<String>,
}

/// A comment on the pull request discussion thread.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExistingComment {
    /// Platform identifier used to update the comment in place.
    pub id: u64,
    /// Comment body; `null` bodies are read as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Terminal outcome of the review step.
///
/// Generation failures are carried as data so that publishing still happens.
///
/// # Examples
///
/// ```
/// use diffpost_core::ReviewOutcome;
///
/// let ok = ReviewOutcome::Success { text: "Looks good.".into() };
/// assert_eq!(ok.comment_text(), "Looks good.");
///
/// let failed = ReviewOutcome::Failure { error_message: "HTTP 500".into() };
/// assert!(failed.comment_text().ends_with("HTTP 500"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The backend produced review text.
    Success {
        /// Review text as returned by the model.
        text: String,
    },
    /// The backend could not be called or its answer was unusable.
    Failure {
        /// Human-readable diagnostic.
        error_message: String,
    },
}

impl ReviewOutcome {
    /// Text placed in the review section of the published comment.
    pub fn comment_text(&self) -> String {
        match self {
            Self::Success { text } => text.clone(),
            Self::Failure { error_message } => {
                format!("Review generation failed: {error_message}")
            }
        }
    }

    /// Whether the review step succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
