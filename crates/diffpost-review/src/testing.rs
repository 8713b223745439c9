//! In-memory stand-in for the GitHub and LLM endpoints used by unit tests.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use diffpost_core::{
    ActionConfig, DiffpostError, ExistingComment, GitHubSettings, LlmProvider, LlmSettings,
    PromptTemplate, Secret,
};
use reqwest::{Method, Url};

use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::paginate::PER_PAGE;

pub(crate) const GITHUB_BASE: &str = "https://github.test";
pub(crate) const LLM_BASE: &str = "https://llm.test";

#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub method: Method,
    pub path: String,
    pub page: Option<usize>,
    pub body: Option<serde_json::Value>,
}

#[derive(Default)]
struct State {
    files: Vec<serde_json::Value>,
    comments: Vec<ExistingComment>,
    next_id: u64,
    llm_reply: Option<HttpResponse>,
    fail_comment_listing: bool,
    requests: Vec<Recorded>,
}

/// Emulates pagination and comment storage of the hosting API, plus a
/// scripted text-generation endpoint. Every request is recorded.
pub(crate) struct FakeTransport {
    state: Mutex<State>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1000,
                ..State::default()
            }),
        }
    }

    /// Add `count` files, each with patch `+line {i}`.
    pub fn with_patched_files(self, count: usize) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let start = state.files.len();
            for i in start..start + count {
                state.files.push(serde_json::json!({
                    "filename": format!("src/file_{i}.rs"),
                    "patch": format!("+line {i}"),
                }));
            }
        }
        self
    }

    /// Add a file the platform reports without a patch.
    pub fn with_binary_file(self, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .files
            .push(serde_json::json!({ "filename": name }));
        self
    }

    pub fn with_comment(self, id: u64, body: &str) -> Self {
        self.state.lock().unwrap().comments.push(ExistingComment {
            id,
            body: body.to_string(),
        });
        self
    }

    /// Add `count` unrelated comments.
    pub fn with_noise_comments(self, count: usize) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for i in 0..count {
                let id = 1 + state.comments.len() as u64;
                state.comments.push(ExistingComment {
                    id,
                    body: format!("comment {i}"),
                });
            }
        }
        self
    }

    pub fn with_llm_reply(self, status: u16, body: &str) -> Self {
        self.state.lock().unwrap().llm_reply = Some(HttpResponse {
            status,
            body: body.to_string(),
        });
        self
    }

    pub fn with_openai_text(self, text: &str) -> Self {
        self.set_openai_text(text);
        self
    }

    pub fn set_openai_text(&self, text: &str) {
        let body = serde_json::json!({ "choices": [{ "message": { "content": text } }] });
        self.state.lock().unwrap().llm_reply = Some(HttpResponse {
            status: 200,
            body: body.to_string(),
        });
    }

    pub fn failing_comment_listing(self) -> Self {
        self.state.lock().unwrap().fail_comment_listing = true;
        self
    }

    pub fn comments(&self) -> Vec<ExistingComment> {
        self.state.lock().unwrap().comments.clone()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn count(&self, method: Method, path_suffix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path.ends_with(path_suffix))
            .count()
    }

    pub fn llm_calls(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.path.contains("/v1/chat/completions"))
            .count()
    }
}

fn json_response(status: u16, value: &impl serde::Serialize) -> HttpResponse {
    HttpResponse {
        status,
        body: serde_json::to_string(value).unwrap(),
    }
}

fn comment_json(comment: &ExistingComment) -> serde_json::Value {
    serde_json::json!({ "id": comment.id, "body": comment.body })
}

fn page_slice<T: Clone>(items: &[T], page: usize) -> Vec<T> {
    let start = (page - 1) * PER_PAGE;
    if start >= items.len() {
        return Vec::new();
    }
    items[start..(start + PER_PAGE).min(items.len())].to_vec()
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, DiffpostError> {
        let url = Url::parse(&request.url).map_err(|e| DiffpostError::Transport {
            url: request.url.clone(),
            message: e.to_string(),
        })?;
        let path = url.path().to_string();
        let page = url
            .query_pairs()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse::<usize>().ok());

        let mut state = self.state.lock().unwrap();
        state.requests.push(Recorded {
            method: request.method.clone(),
            path: path.clone(),
            page,
            body: request.body.clone(),
        });

        let body_text = || {
            request
                .body
                .as_ref()
                .and_then(|b| b.get("body"))
                .and_then(|b| b.as_str())
                .unwrap_or_default()
                .to_string()
        };

        let method = &request.method;
        let response = if *method == Method::GET && path.ends_with("/files") {
            json_response(200, &page_slice(&state.files, page.unwrap_or(1)))
        } else if *method == Method::GET && path.ends_with("/comments") {
            if state.fail_comment_listing {
                HttpResponse {
                    status: 500,
                    body: "comment listing unavailable".into(),
                }
            } else {
                let listed: Vec<_> = page_slice(&state.comments, page.unwrap_or(1))
                    .iter()
                    .map(comment_json)
                    .collect();
                json_response(200, &listed)
            }
        } else if *method == Method::POST && path.ends_with("/comments") {
            state.next_id += 1;
            let comment = ExistingComment {
                id: state.next_id,
                body: body_text(),
            };
            state.comments.push(comment.clone());
            json_response(201, &comment_json(&comment))
        } else if *method == Method::PATCH && path.contains("/issues/comments/") {
            let id: u64 = path.rsplit('/').next().unwrap().parse().unwrap();
            let new_body = body_text();
            match state.comments.iter_mut().find(|c| c.id == id) {
                Some(comment) => {
                    comment.body = new_body;
                    json_response(200, &comment_json(comment))
                }
                None => HttpResponse {
                    status: 404,
                    body: "not found".into(),
                },
            }
        } else if *method == Method::POST && path.contains("/v1/chat/completions") {
            state.llm_reply.clone().unwrap_or(HttpResponse {
                status: 500,
                body: "no reply scripted".into(),
            })
        } else {
            HttpResponse {
                status: 404,
                body: format!("no route for {method} {path}"),
            }
        };
        Ok(response)
    }
}

/// Config pointing both endpoints at [`FakeTransport`].
pub(crate) fn test_config(event_path: &Path) -> ActionConfig {
    ActionConfig {
        llm: LlmSettings {
            provider: LlmProvider::OpenAi,
            model: "gpt-test".into(),
            api_key: Secret::new("sk-test"),
            base_url: LLM_BASE.into(),
        },
        github: GitHubSettings {
            token: Secret::new("ghs-test"),
            api_url: GITHUB_BASE.into(),
            owner: "octocat".into(),
            repo: "hello-world".into(),
        },
        event_path: event_path.to_path_buf(),
        prompt_template: PromptTemplate::parse("Review:\n{{DIFF}}").unwrap(),
    }
}
