use diffpost_core::{
    DiffpostError, ExistingComment, FilePatch, GitHubSettings, PullRequestRef, Secret,
};
use reqwest::Method;

use crate::http::{HttpClient, HttpRequest};
use crate::paginate::{collect_pages, paged_url};

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// GitHub REST client for the calls a review run makes.
///
/// Every request goes through the shared [`HttpClient`], so tests can swap
/// the transport for an in-memory fake.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use diffpost_core::{GitHubSettings, Secret};
/// use diffpost_review::github::GitHubClient;
/// use diffpost_review::http::{HttpClient, ReqwestTransport};
///
/// let http = HttpClient::new(Arc::new(ReqwestTransport::new().unwrap()));
/// let settings = GitHubSettings {
///     token: Secret::new("ghs_xxxx"),
///     api_url: "https://api.github.com".into(),
///     owner: "octocat".into(),
///     repo: "hello-world".into(),
/// };
/// let client = GitHubClient::new(http, &settings);
/// ```
pub struct GitHubClient {
    http: HttpClient,
    api_base: String,
    token: Secret,
}

impl GitHubClient {
    /// Create a client for the API described by `settings`.
    pub fn new(http: HttpClient, settings: &GitHubSettings) -> Self {
        Self {
            http,
            api_base: settings.api_url.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
        }
    }

    /// List every changed file of a pull request, across all pages.
    ///
    /// # Errors
    ///
    /// Returns the first transport, status or decoding error encountered.
    pub async fn list_pull_files(
        &self,
        pr: &PullRequestRef,
    ) -> Result<Vec<FilePatch>, DiffpostError> {
        let url = self.repo_url(pr, &format!("pulls/{}/files", pr.number));
        let files: Vec<FilePatch> = self.list_all(&url).await?;
        tracing::info!(pr = %pr, files = files.len(), "listed pull request files");
        Ok(files)
    }

    /// List every comment on the pull request's discussion thread.
    ///
    /// # Errors
    ///
    /// Returns the first transport, status or decoding error encountered.
    pub async fn list_issue_comments(
        &self,
        pr: &PullRequestRef,
    ) -> Result<Vec<ExistingComment>, DiffpostError> {
        let url = self.repo_url(pr, &format!("issues/{}/comments", pr.number));
        let comments: Vec<ExistingComment> = self.list_all(&url).await?;
        tracing::debug!(pr = %pr, comments = comments.len(), "listed issue comments");
        Ok(comments)
    }

    /// Post a new comment on the pull request.
    ///
    /// # Errors
    ///
    /// Returns [`DiffpostError::Http`] on API errors.
    pub async fn create_comment(
        &self,
        pr: &PullRequestRef,
        body: &str,
    ) -> Result<ExistingComment, DiffpostError> {
        let url = self.repo_url(pr, &format!("issues/{}/comments", pr.number));
        let request = self
            .request(Method::POST, url)
            .json(&serde_json::json!({ "body": body }))?;
        self.http.send_json(request).await
    }

    /// Replace the body of an existing comment.
    ///
    /// # Errors
    ///
    /// Returns [`DiffpostError::Http`] on API errors.
    pub async fn update_comment(
        &self,
        pr: &PullRequestRef,
        comment_id: u64,
        body: &str,
    ) -> Result<ExistingComment, DiffpostError> {
        let url = self.repo_url(pr, &format!("issues/comments/{comment_id}"));
        let request = self
            .request(Method::PATCH, url)
            .json(&serde_json::json!({ "body": body }))?;
        self.http.send_json(request).await
    }

    async fn list_all<T>(&self, url: &str) -> Result<Vec<T>, DiffpostError>
    where
        T: serde::de::DeserializeOwned,
    {
        let http = &self.http;
        collect_pages(|page| {
            let request = self.request(Method::GET, paged_url(url, page));
            async move { http.send_json::<Vec<T>>(request).await }
        })
        .await
    }

    fn repo_url(&self, pr: &PullRequestRef, tail: &str) -> String {
        format!("{}/repos/{}/{}/{tail}", self.api_base, pr.owner, pr.repo)
    }

    fn request(&self, method: Method, url: String) -> HttpRequest {
        HttpRequest::new(method, url)
            .header("Authorization", format!("Bearer {}", self.token.expose()))
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }
}
