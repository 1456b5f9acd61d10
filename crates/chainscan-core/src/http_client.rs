use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Minimal HTTP method set needed by provider adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Authentication strategy applied to outgoing HTTP requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpAuth {
    None,
    Header { name: String, value: String },
}

impl HttpAuth {
    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Header {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn apply(&self, headers: &mut BTreeMap<String, String>) {
        match self {
            Self::None => {}
            Self::Header { name, value } => {
                headers.insert(name.to_ascii_lowercase(), value.clone());
            }
        }
    }
}

/// Encoded request body produced for POST requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Json(String),
    Form(String),
}

impl RequestBody {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Json(body) | Self::Form(body) => body,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Json(body) | Self::Form(body) => body,
        }
    }
}

/// Provider-agnostic request description.
///
/// Parameters stay structured until dispatch: GET requests carry them as a
/// URL-encoded query string, POST requests as a JSON body when a header
/// declares JSON and as a form body otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub params: BTreeMap<String, Value>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            params: BTreeMap::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self = self.with_header(name, value);
        }
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_auth(mut self, auth: &HttpAuth) -> Self {
        auth.apply(&mut self.headers);
        self
    }

    /// True when `accept` or `content-type` declares a JSON media type.
    pub fn is_json(&self) -> bool {
        ["accept", "content-type"].iter().any(|name| {
            self.headers
                .get(*name)
                .is_some_and(|value| value.to_ascii_lowercase().contains("json"))
        })
    }

    /// Target URL, with parameters appended as a query string for GET requests.
    pub fn target_url(&self) -> String {
        if self.method != HttpMethod::Get || self.params.is_empty() {
            return self.url.clone();
        }

        let separator = if !self.url.contains('?') {
            "?"
        } else if self.url.ends_with('?') || self.url.ends_with('&') {
            ""
        } else {
            "&"
        };
        format!("{}{}{}", self.url, separator, self.form_encoded())
    }

    /// Body for POST requests; GET requests never carry one.
    pub fn body(&self) -> Result<Option<RequestBody>, HttpError> {
        if self.method != HttpMethod::Post {
            return Ok(None);
        }

        if self.is_json() {
            let body = serde_json::to_string(&self.params).map_err(|error| {
                HttpError::new(format!("failed to encode json body: {error}"))
            })?;
            return Ok(Some(RequestBody::Json(body)));
        }

        Ok(Some(RequestBody::Form(self.form_encoded())))
    }

    /// Content type to add at dispatch; `None` for GET or when the caller set one.
    pub fn implied_content_type(&self) -> Option<&'static str> {
        if self.method != HttpMethod::Post || self.headers.contains_key("content-type") {
            return None;
        }
        Some(if self.is_json() {
            "application/json"
        } else {
            FORM_CONTENT_TYPE
        })
    }

    fn form_encoded(&self) -> String {
        self.params
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(name),
                    urlencoding::encode(&param_text(value))
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn param_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Raw HTTP response handed back to the calling adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Adapter transport contract.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;
}

/// Default no-op transport for deterministic offline tests.
#[derive(Debug, Default)]
pub struct NoopHttpClient;

impl HttpClient for NoopHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let _ = request;
        Box::pin(async move { Ok(HttpResponse::ok_json("{}")) })
    }
}

/// Production HTTP client using reqwest.
///
/// No retries and no timeout beyond reqwest's defaults.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent(concat!("chainscan/", env!("CARGO_PKG_VERSION")))
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let body = request.body()?;
            let url = request.target_url();

            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(&url),
                HttpMethod::Post => self.client.post(&url),
            };

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            if let Some(content_type) = request.implied_content_type() {
                builder = builder.header("content-type", content_type);
            }
            if let Some(body) = body {
                builder = builder.body(body.into_string());
            }

            tracing::debug!(method = ?request.method, url = %request.url, "dispatching request");

            let response = builder
                .send()
                .await
                .map_err(|e| HttpError::new(format!("request failed: {e}")))?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| HttpError::new(format!("failed to read response body: {e}")))?;

            Ok(HttpResponse { status, body })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn custom_header_auth_lowercases_name() {
        let request = HttpRequest::get("https://example.test/info")
            .with_auth(&HttpAuth::header("X-CMC_PRO_API_KEY", "demo"));

        assert_eq!(
            request.headers.get("x-cmc_pro_api_key").map(String::as_str),
            Some("demo")
        );
    }

    #[test]
    fn get_appends_encoded_query() {
        let request = HttpRequest::get("https://api.etherscan.io/api")
            .with_param("module", "token")
            .with_param("address", "0xabc");

        assert_eq!(
            request.target_url(),
            "https://api.etherscan.io/api?address=0xabc&module=token"
        );
        assert_eq!(request.body().expect("encodes"), None);
    }

    #[test]
    fn get_respects_existing_query_separator() {
        let trailing = HttpRequest::get("https://api.bscscan.com/api?").with_param("a", "1");
        assert_eq!(trailing.target_url(), "https://api.bscscan.com/api?a=1");

        let partial = HttpRequest::get("https://host/api?chainid=1").with_param("a", "x y");
        assert_eq!(partial.target_url(), "https://host/api?chainid=1&a=x%20y");
    }

    #[test]
    fn post_with_json_header_encodes_json_body() {
        let request = HttpRequest::post("https://graphql.example/")
            .with_header("Content-Type", "application/json")
            .with_param("query", "{ ping }")
            .with_param("variables", json!({ "network": "bsc" }));

        assert!(request.is_json());
        let body = request.body().expect("encodes").expect("post has body");
        let decoded: Value = serde_json::from_str(body.as_str()).expect("valid json");
        assert_eq!(decoded["variables"]["network"], "bsc");
        assert_eq!(request.target_url(), "https://graphql.example/");
    }

    #[test]
    fn post_without_json_header_encodes_form_body() {
        let request = HttpRequest::post("https://example.test/submit")
            .with_header("Accept", "text/plain")
            .with_param("name", "a&b")
            .with_param("count", 2);

        assert!(!request.is_json());
        assert_eq!(
            request.body().expect("encodes"),
            Some(RequestBody::Form(String::from("count=2&name=a%26b")))
        );
        assert_eq!(request.implied_content_type(), Some(FORM_CONTENT_TYPE));
    }

    #[test]
    fn caller_content_type_is_never_duplicated() {
        let form = HttpRequest::post("https://example.test/upload")
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_param("name", "value");
        assert!(matches!(form.body().expect("encodes"), Some(RequestBody::Form(_))));
        assert_eq!(form.implied_content_type(), None);

        let json = HttpRequest::post("https://graphql.example/")
            .with_header("Accept", "application/json");
        assert_eq!(json.implied_content_type(), Some("application/json"));

        let get = HttpRequest::get("https://example.test/info");
        assert_eq!(get.implied_content_type(), None);
    }
}
