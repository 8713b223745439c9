use std::path::Path;

use diffpost_core::{DiffpostError, PullRequestRef};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    number: u64,
    base: Revision,
    head: Revision,
}

#[derive(Debug, Deserialize)]
struct Revision {
    sha: String,
}

/// Extract the pull request from a webhook event payload.
///
/// Returns `Ok(None)` when the payload has no `pull_request` object (the
/// run was triggered by something else and has nothing to do).
///
/// # Errors
///
/// Returns [`DiffpostError::Event`] if the payload is not JSON or the
/// `pull_request` object lacks its number or revisions.
///
/// # Examples
///
/// ```
/// use diffpost_review::event::parse_event;
///
/// let payload = r#"{"pull_request":{"number":3,"base":{"sha":"aaa"},"head":{"sha":"bbb"}}}"#;
/// let pr = parse_event(payload, "octocat", "hello-world").unwrap().unwrap();
/// assert_eq!(pr.number, 3);
///
/// assert!(parse_event(r#"{"ref":"refs/heads/main"}"#, "o", "r").unwrap().is_none());
/// ```
pub fn parse_event(
    payload: &str,
    owner: &str,
    repo: &str,
) -> Result<Option<PullRequestRef>, DiffpostError> {
    let event: EventPayload = serde_json::from_str(payload)
        .map_err(|e| DiffpostError::Event(format!("payload is not valid JSON: {e}")))?;

    let Some(raw) = event.pull_request.filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let pr: PullRequest = serde_json::from_value(raw)
        .map_err(|e| DiffpostError::Event(format!("malformed pull_request object: {e}")))?;

    Ok(Some(PullRequestRef {
        owner: owner.to_string(),
        repo: repo.to_string(),
        number: pr.number,
        base_sha: pr.base.sha,
        head_sha: pr.head.sha,
    }))
}

/// Read the payload at `path` and hand it to [`parse_event`].
///
/// # Errors
///
/// Returns [`DiffpostError::Io`] if the file cannot be read, otherwise
/// whatever [`parse_event`] returns.
pub fn read_event(
    path: &Path,
    owner: &str,
    repo: &str,
) -> Result<Option<PullRequestRef>, DiffpostError> {
    let payload = std::fs::read_to_string(path)?;
    parse_event(&payload, owner, repo)
}
