//! Review orchestration: fetch a pull request's diff, obtain a review from
//! a text-generation backend, and keep a single marker comment up to date.
//!
//! Provides the HTTP adapter and its [`http::Transport`] seam, the
//! paginated GitHub client, diff aggregation, the LLM client and review
//! generator, the comment upsert engine, and the [`orchestrator`] that
//! sequences them.

pub mod comment;
pub mod diff;
pub mod event;
pub mod generator;
pub mod github;
pub mod http;
pub mod llm;
pub mod orchestrator;
pub mod paginate;

#[cfg(test)]
mod testing;
