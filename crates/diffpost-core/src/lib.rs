//! Core types, configuration, and error handling for diffpost.
//!
//! This crate provides the shared foundation used by the review crate and
//! the binary:
//! - [`DiffpostError`] — unified error type using `thiserror`
//! - [`ActionConfig`] — run configuration resolved from the environment and
//!   an optional `.diffpost.toml`
//! - [`PromptTemplate`] — a template validated to contain `{{DIFF}}`
//! - Shared types: [`PullRequestRef`], [`FilePatch`], [`ExistingComment`],
//!   [`ReviewOutcome`]

mod config;
mod error;
mod template;
mod types;

pub use config::{
    parse_repository, ActionConfig, FileConfig, GitHubFileConfig, GitHubSettings, LlmFileConfig,
    LlmProvider, LlmSettings, ReviewFileConfig, Secret, DEFAULT_GITHUB_API_URL,
    ENV_GITHUB_API_URL, ENV_GITHUB_EVENT_PATH, ENV_GITHUB_REPOSITORY, ENV_GITHUB_TOKEN,
    ENV_LLM_API_KEY, ENV_LLM_BASE_URL, ENV_LLM_MODEL, ENV_LLM_PROVIDER, ENV_PROMPT_TEMPLATE,
};
pub use error::DiffpostError;
pub use template::{PromptTemplate, DIFF_PLACEHOLDER};
pub use types::{ExistingComment, FilePatch, PullRequestRef, ReviewOutcome};

/// A convenience `Result` type for diffpost operations.
pub type Result<T> = std::result::Result<T, DiffpostError>;
