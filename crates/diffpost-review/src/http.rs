use std::sync::Arc;

use async_trait::async_trait;
use diffpost_core::DiffpostError;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("diffpost/", env!("CARGO_PKG_VERSION"));

/// A transport-agnostic HTTP request.
///
/// # Examples
///
/// ```
/// use diffpost_review::http::HttpRequest;
/// use reqwest::Method;
///
/// let req = HttpRequest::new(Method::GET, "https://api.github.com/zen")
///     .header("Accept", "text/plain");
/// assert_eq!(req.headers.len(), 1);
/// assert!(req.body.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL including any query string.
    pub url: String,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    /// Start a request without headers or body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`DiffpostError::Serialization`] if `body` cannot be encoded.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, DiffpostError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

/// Status and raw body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Body text.
    pub body: String,
}

impl HttpResponse {
    /// `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes a single request.
///
/// Implementations report only failures to obtain a response; status
/// handling belongs to [`HttpClient`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform `request` and return whatever the server answered.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, DiffpostError>;
}

/// Production transport backed by `reqwest`.
///
/// No timeout is configured; the platform's connection defaults apply.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build the underlying HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`DiffpostError::Config`] if the TLS backend cannot be set up.
    pub fn new() -> Result<Self, DiffpostError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DiffpostError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, DiffpostError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method, &url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| DiffpostError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| DiffpostError::Transport {
            url: url.clone(),
            message: format!("failed to read response body: {e}"),
        })?;

        Ok(HttpResponse { status, body })
    }
}

/// Request executor with uniform status and decoding errors.
///
/// Cheap to clone; all clones share one transport.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
}

impl HttpClient {
    /// Wrap a transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Send `request`, failing on any non-2xx status.
    ///
    /// # Errors
    ///
    /// Returns [`DiffpostError::Transport`] if no response arrived, or
    /// [`DiffpostError::Http`] carrying status and body otherwise.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, DiffpostError> {
        let url = request.url.clone();
        tracing::debug!(method = %request.method, %url, "sending request");

        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(DiffpostError::Http {
                status: response.status,
                url,
                body: response.body,
            });
        }
        Ok(response)
    }

    /// Send `request` and decode a JSON body.
    ///
    /// # Errors
    ///
    /// Everything [`HttpClient::send`] returns, plus
    /// [`DiffpostError::Decode`] when the body has the wrong shape.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> Result<T, DiffpostError> {
        let url = request.url.clone();
        let response = self.send(request).await?;
        serde_json::from_str(&response.body).map_err(|e| DiffpostError::Decode {
            url,
            message: e.to_string(),
        })
    }
}
