/// Errors that can occur while producing and publishing a review.
///
/// Library crates return this type directly; the binary renders it through
/// `miette` at the boundary. Only [`DiffpostError::Llm`] is ever recovered
/// from: the review generator folds it into a failed review outcome.
///
/// # Examples
///
/// ```
/// use diffpost_core::DiffpostError;
///
/// let err = DiffpostError::Config("LLM_API_KEY is not set".into());
/// assert!(err.to_string().contains("LLM_API_KEY"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum DiffpostError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(
        code(diffpost::config),
        help("check the LLM_*, PROMPT_TEMPLATE and GITHUB_* environment variables")
    )]
    Config(String),

    /// The request never produced a response (DNS, connect, TLS, reset).
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Target URL.
        url: String,
        /// Underlying transport diagnostic.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}: {body}")]
    Http {
        /// Response status code.
        status: u16,
        /// Target URL.
        url: String,
        /// Response body, as returned.
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("failed to decode response from {url}: {message}")]
    Decode {
        /// Target URL.
        url: String,
        /// Decoder diagnostic.
        message: String,
    },

    /// The triggering event payload is malformed.
    #[error("event payload error: {0}")]
    Event(String),

    /// Text-generation API or response error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
