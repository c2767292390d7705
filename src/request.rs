use crate::codec;
use crate::error::{Error, Result};
use bytes::Bytes;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use url::Url;

/// HTTP verbs supported by the management API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Whether a request body may accompany this verb.
    pub fn allows_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Serialization format of a request/response pair
///
/// The management API is not uniformly content-negotiated, so every call
/// site declares the format it expects instead of sniffing response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Xml,
    Json,
}

impl ContentType {
    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::Xml => "application/xml",
            ContentType::Json => "application/json",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// A structured resource operation, ready to be dispatched
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    content_type: ContentType,
    params: BTreeMap<String, String>,
    body: Option<Bytes>,
    timeout: Option<Duration>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            method,
            path: path.into(),
            content_type,
            params: BTreeMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>, content_type: ContentType) -> Self {
        Self::new(Method::Get, path, content_type)
    }

    pub fn post(path: impl Into<String>, content_type: ContentType) -> Self {
        Self::new(Method::Post, path, content_type)
    }

    pub fn put(path: impl Into<String>, content_type: ContentType) -> Self {
        Self::new(Method::Put, path, content_type)
    }

    pub fn delete(path: impl Into<String>, content_type: ContentType) -> Self {
        Self::new(Method::Delete, path, content_type)
    }

    /// Add a query parameter. A repeated name replaces the earlier value.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Add a query parameter only when a value is present.
    pub fn param_opt<V: ToString>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.param(name, v.to_string()),
            None => self,
        }
    }

    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Serialize `value` with this request's codec and attach it as the body.
    pub fn with_body<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        if !self.method.allows_body() {
            return Err(Error::InvalidRequest(format!(
                "{} requests cannot carry a body",
                self.method
            )));
        }
        self.body = Some(codec::encode(value, self.content_type)?);
        Ok(self)
    }

    /// Bound this call (including a renewal retry) by `timeout` per exchange.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Raw status and body of one exchange
///
/// Lives only for the duration of a single call.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    pub status: StatusCode,
    pub body: Bytes,
}

impl ResponseEnvelope {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Join `path` onto `base` with exactly one separator and append `params`
/// as the query string.
pub fn join_url(base: &Url, path: &str, params: &BTreeMap<String, String>) -> Result<Url> {
    if path.contains(['?', '#']) {
        return Err(Error::InvalidRequest(format!(
            "path {path:?} must not carry a query or fragment; pass query parameters separately"
        )));
    }

    if let Some(segment) = path.split('/').find(|s| is_dot_segment(s)) {
        return Err(Error::InvalidRequest(format!(
            "path {path:?} contains the relative segment {segment:?}"
        )));
    }

    let mut joined = base.as_str().trim_end_matches('/').to_string();
    joined.push('/');
    joined.push_str(path.trim_start_matches('/'));

    let mut url = Url::parse(&joined)?;
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params.iter());
    }
    Ok(url)
}

/// Percent-encode one caller-supplied path segment.
///
/// Empty, `.` and `..` are rejected: URL resolution would drop or collapse
/// them and the request would reach a different resource.
pub fn path_segment(value: &str) -> Result<String> {
    if value.is_empty() || is_dot_segment(value) {
        return Err(Error::InvalidRequest(format!(
            "{value:?} is not a valid path segment"
        )));
    }
    Ok(urlencoding::encode(value).into_owned())
}

fn is_dot_segment(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        "." | ".." | "%2e" | "%2e%2e" | ".%2e" | "%2e."
    )
}
