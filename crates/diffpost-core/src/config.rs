use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::DiffpostError;
use crate::template::PromptTemplate;

/// Environment variable holding the text-generation API key.
pub const ENV_LLM_API_KEY: &str = "LLM_API_KEY";
/// Environment variable holding the model identifier.
pub const ENV_LLM_MODEL: &str = "LLM_MODEL";
/// Environment variable selecting the text-generation wire dialect.
pub const ENV_LLM_PROVIDER: &str = "LLM_PROVIDER";
/// Environment variable overriding the text-generation endpoint.
pub const ENV_LLM_BASE_URL: &str = "LLM_BASE_URL";
/// Environment variable holding the prompt template.
pub const ENV_PROMPT_TEMPLATE: &str = "PROMPT_TEMPLATE";
/// Environment variable holding the hosting API token.
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
/// Environment variable pointing at the triggering event payload.
pub const ENV_GITHUB_EVENT_PATH: &str = "GITHUB_EVENT_PATH";
/// Environment variable holding `owner/name` of the repository.
pub const ENV_GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
/// Environment variable overriding the hosting API base URL.
pub const ENV_GITHUB_API_URL: &str = "GITHUB_API_URL";

/// Public GitHub REST endpoint.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Optional defaults loaded from `.diffpost.toml`.
///
/// Every field may be omitted; environment variables take precedence when
/// [`ActionConfig::resolve`] layers the two.
///
/// # Examples
///
/// ```
/// use diffpost_core::FileConfig;
///
/// let config = FileConfig::from_toml("[llm]\nmodel = \"gpt-4o-mini\"\n").unwrap();
/// assert_eq!(config.llm.model.as_deref(), Some("gpt-4o-mini"));
/// assert!(config.review.prompt_template.is_none());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    /// Text-generation backend defaults.
    #[serde(default)]
    pub llm: LlmFileConfig,
    /// Hosting platform defaults.
    #[serde(default)]
    pub github: GitHubFileConfig,
    /// Review prompt defaults.
    #[serde(default)]
    pub review: ReviewFileConfig,
}

impl FileConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DiffpostError::Io`] if the file cannot be read, or
    /// [`DiffpostError::Toml`] if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, DiffpostError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`DiffpostError::Toml`] if parsing fails.
    pub fn from_toml(content: &str) -> Result<Self, DiffpostError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// `[llm]` table of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Wire dialect (`"openai"` or `"gemini"`).
    pub provider: Option<LlmProvider>,
    /// Model identifier.
    pub model: Option<String>,
    /// Custom base URL for API requests.
    pub base_url: Option<String>,
}

/// `[github]` table of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubFileConfig {
    /// REST API base URL (GitHub Enterprise or a proxy).
    pub api_url: Option<String>,
}

/// `[review]` table of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewFileConfig {
    /// Prompt template containing `{{DIFF}}`.
    pub prompt_template: Option<String>,
}

/// Wire dialect spoken by the text-generation backend.
///
/// # Examples
///
/// ```
/// use diffpost_core::LlmProvider;
///
/// let provider: LlmProvider = "gemini".parse().unwrap();
/// assert_eq!(provider, LlmProvider::Gemini);
/// assert_eq!(LlmProvider::default().to_string(), "openai");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI-compatible `/v1/chat/completions` (OpenAI, Ollama, vLLM, LiteLLM).
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    /// Google Gemini `generateContent`.
    Gemini,
}

impl LlmProvider {
    /// Public endpoint used when no base URL is configured.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com",
            Self::Gemini => "https://generativelanguage.googleapis.com",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

impl FromStr for LlmProvider {
    type Err = DiffpostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            other => Err(DiffpostError::Config(format!(
                "unknown LLM provider '{other}', expected 'openai' or 'gemini'"
            ))),
        }
    }
}

/// A credential whose value never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a credential value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw credential, for building request headers.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Resolved text-generation settings.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Wire dialect.
    pub provider: LlmProvider,
    /// Model identifier, also shown in the published comment.
    pub model: String,
    /// API key.
    pub api_key: Secret,
    /// Base URL without trailing slash.
    pub base_url: String,
}

/// Resolved hosting platform settings.
#[derive(Debug, Clone)]
pub struct GitHubSettings {
    /// API token.
    pub token: Secret,
    /// REST API base URL without trailing slash.
    pub api_url: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

/// Everything a run needs, validated once at process start.
///
/// No component reads process state on its own; this value is passed in.
#[derive(Debug, Clone)]
pub struct ActionConfig {
    /// Text-generation backend.
    pub llm: LlmSettings,
    /// Hosting platform.
    pub github: GitHubSettings,
    /// Path of the triggering event payload.
    pub event_path: PathBuf,
    /// Prompt template, guaranteed to contain the diff placeholder.
    pub prompt_template: PromptTemplate,
}

impl ActionConfig {
    /// Layer `env` over `file` and validate the result.
    ///
    /// `env` is called with variable names such as [`ENV_LLM_API_KEY`]; blank
    /// values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`DiffpostError::Config`] naming the first missing or invalid
    /// input. Nothing has touched the network when this fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use diffpost_core::{ActionConfig, FileConfig};
    ///
    /// let env: HashMap<&str, &str> = HashMap::from([
    ///     ("LLM_API_KEY", "sk-test"),
    ///     ("LLM_MODEL", "gpt-4o"),
    ///     ("PROMPT_TEMPLATE", "Review:\n{{DIFF}}"),
    ///     ("GITHUB_TOKEN", "ghs_test"),
    ///     ("GITHUB_EVENT_PATH", "/tmp/event.json"),
    ///     ("GITHUB_REPOSITORY", "octocat/hello-world"),
    /// ]);
    /// let config = ActionConfig::resolve(&FileConfig::default(), |k| {
    ///     env.get(k).map(|v| v.to_string())
    /// })
    /// .unwrap();
    /// assert_eq!(config.github.owner, "octocat");
    /// assert_eq!(config.github.api_url, "https://api.github.com");
    /// ```
    pub fn resolve<F>(file: &FileConfig, env: F) -> Result<Self, DiffpostError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let api_key = lookup(ENV_LLM_API_KEY).ok_or_else(|| missing(ENV_LLM_API_KEY))?;
        let model = lookup(ENV_LLM_MODEL)
            .or_else(|| non_blank(file.llm.model.as_deref()))
            .ok_or_else(|| missing(ENV_LLM_MODEL))?;
        let provider = match lookup(ENV_LLM_PROVIDER) {
            Some(raw) => raw.parse()?,
            None => file.llm.provider.unwrap_or_default(),
        };
        let base_url = lookup(ENV_LLM_BASE_URL)
            .or_else(|| non_blank(file.llm.base_url.as_deref()))
            .unwrap_or_else(|| provider.default_base_url().to_string());

        let raw_template = lookup(ENV_PROMPT_TEMPLATE)
            .or_else(|| non_blank(file.review.prompt_template.as_deref()))
            .ok_or_else(|| missing(ENV_PROMPT_TEMPLATE))?;
        let prompt_template = PromptTemplate::parse(&raw_template)?;

        let token = lookup(ENV_GITHUB_TOKEN).ok_or_else(|| missing(ENV_GITHUB_TOKEN))?;
        let event_path = lookup(ENV_GITHUB_EVENT_PATH)
            .map(PathBuf::from)
            .ok_or_else(|| missing(ENV_GITHUB_EVENT_PATH))?;
        let full_name =
            lookup(ENV_GITHUB_REPOSITORY).ok_or_else(|| missing(ENV_GITHUB_REPOSITORY))?;
        let (owner, repo) = parse_repository(&full_name)?;
        let api_url = lookup(ENV_GITHUB_API_URL)
            .or_else(|| non_blank(file.github.api_url.as_deref()))
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string());

        Ok(Self {
            llm: LlmSettings {
                provider,
                model: model.trim().to_string(),
                api_key: Secret::new(api_key),
                base_url: base_url.trim_end_matches('/').to_string(),
            },
            github: GitHubSettings {
                token: Secret::new(token),
                api_url: api_url.trim_end_matches('/').to_string(),
                owner,
                repo,
            },
            event_path,
            prompt_template,
        })
    }
}

fn missing(var: &str) -> DiffpostError {
    DiffpostError::Config(format!("{var} is not set"))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

/// Split a repository full name (`owner/name`) into its components.
///
/// # Errors
///
/// Returns [`DiffpostError::Config`] if the format is invalid.
///
/// # Examples
///
/// ```
/// use diffpost_core::parse_repository;
///
/// let (owner, repo) = parse_repository("octocat/hello-world").unwrap();
/// assert_eq!(owner, "octocat");
/// assert_eq!(repo, "hello-world");
/// assert!(parse_repository("hello-world").is_err());
/// ```
pub fn parse_repository(full_name: &str) -> Result<(String, String), DiffpostError> {
    let invalid = || {
        DiffpostError::Config(format!(
            "invalid {ENV_GITHUB_REPOSITORY} '{full_name}', expected owner/name"
        ))
    };
    let (owner, repo) = full_name.trim().split_once('/').ok_or_else(invalid)?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(invalid());
    }
    Ok((owner.to_string(), repo.to_string()))
}
