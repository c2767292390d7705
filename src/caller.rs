//! The remote-call dispatcher.
//!
//! [`RemoteCaller`] is the one seam every resource client depends on. The
//! production implementation, [`HttpRemoteCaller`], resolves the URL,
//! attaches the session, performs the exchange, renews the session and
//! retries once on expiry, and maps every other non-2xx response to
//! [`Error::Api`].

use crate::auth::{
    Authenticator, Credential, ExpiryPredicate, NoAuth, PasswordLogin, SessionAuthenticator,
    StaticToken,
};
use crate::codec;
use crate::config::{ClientConfig, TlsVerification};
use crate::error::{Error, Result};
use crate::request::{join_url, ContentType, Request, ResponseEnvelope};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Dispatches a [`Request`] and returns the raw body of a 2xx response
#[async_trait]
pub trait RemoteCaller: Send + Sync {
    async fn execute(&self, request: Request) -> Result<Bytes>;
}

/// Typed decoding on top of any [`RemoteCaller`]
#[async_trait]
pub trait RemoteCallerExt: RemoteCaller {
    /// Dispatch and decode the response into `T`. An empty body is an error.
    async fn make_remote_call<T>(&self, request: Request) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let content_type = request.content_type();
        let body = self.execute(request).await?;
        codec::decode(&body, content_type)
    }

    /// Dispatch and decode, accepting an empty body as `T::default()`.
    async fn make_remote_call_or_default<T>(&self, request: Request) -> Result<T>
    where
        T: DeserializeOwned + Default + Send,
    {
        let content_type = request.content_type();
        let body = self.execute(request).await?;
        codec::decode_or_default(&body, content_type)
    }

    /// Dispatch an operation whose response body is ignored.
    async fn make_bodiless_call(&self, request: Request) -> Result<()> {
        self.execute(request).await.map(|_| ())
    }
}

impl<C: RemoteCaller + ?Sized> RemoteCallerExt for C {}

#[async_trait]
impl<C: RemoteCaller + ?Sized> RemoteCaller for Arc<C> {
    async fn execute(&self, request: Request) -> Result<Bytes> {
        (**self).execute(request).await
    }
}

/// reqwest-backed dispatcher for one management API instance
///
/// Cheap to clone; clones share the connection pool and the session.
#[derive(Clone)]
pub struct HttpRemoteCaller {
    endpoint: Url,
    http: Client,
    auth: Arc<dyn Authenticator>,
}

impl fmt::Debug for HttpRemoteCaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRemoteCaller")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpRemoteCaller {
    pub fn builder(endpoint: impl Into<String>) -> HttpRemoteCallerBuilder {
        HttpRemoteCallerBuilder::new(endpoint)
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = Self::builder(config.endpoint.clone()).tls(config.tls.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(lifetime) = config.session_lifetime() {
            builder = builder.session_lifetime(lifetime);
        }
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        if let Some(credentials) = &config.credentials {
            builder = builder.credentials(
                credentials.username.clone(),
                credentials.password.clone(),
            );
        }
        builder.build()
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.auth
    }

    /// Close the current session on the server
    pub async fn logout(&self) -> Result<()> {
        self.auth.logout().await
    }

    async fn exchange(
        &self,
        request: &Request,
        url: &Url,
        credential: &Credential,
    ) -> Result<ResponseEnvelope> {
        let content_type = request.content_type();
        let mut builder = self
            .http
            .request(request.method().into(), url.clone())
            .header(ACCEPT, content_type.mime());

        if let Some(body) = request.body() {
            builder = builder
                .header(CONTENT_TYPE, content_type.mime())
                .body(body.clone());
        }
        if let Some(timeout) = request.timeout() {
            builder = builder.timeout(timeout);
        }
        let builder = self.auth.apply_credentials(credential, builder);

        debug!(
            method = %request.method(),
            %url,
            generation = credential.generation(),
            "sending management API request"
        );
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(
            method = %request.method(),
            %url,
            status = status.as_u16(),
            bytes = body.len(),
            "received management API response"
        );

        Ok(ResponseEnvelope { status, body })
    }
}

#[async_trait]
impl RemoteCaller for HttpRemoteCaller {
    async fn execute(&self, request: Request) -> Result<Bytes> {
        let url = join_url(&self.endpoint, request.path(), request.query())?;
        let credential = self.auth.credential().await?;

        let mut response = self.exchange(&request, &url, &credential).await?;
        if self.auth.is_expired_response(&response) {
            warn!(
                method = %request.method(),
                %url,
                status = response.status.as_u16(),
                generation = credential.generation(),
                "session expired, renewing and retrying once"
            );
            let renewed = self.auth.renew(&credential).await?;
            response = self.exchange(&request, &url, &renewed).await?;
            if self.auth.is_expired_response(&response) {
                return Err(Error::Authentication(format!(
                    "session rejected again after renewal (HTTP {})",
                    response.status.as_u16()
                )));
            }
        }

        if response.status.is_success() {
            return Ok(response.body);
        }
        Err(api_error(&response, request.content_type()))
    }
}

/// Structured error payload, either `{"code":..,"message":..}` or the
/// ObjectScale `<error><code/><description/><details/></error>` form
#[derive(Debug, Default, Deserialize)]
#[serde(rename = "error")]
struct ErrorPayload {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

impl ErrorPayload {
    fn parse(body: &[u8], content_type: ContentType) -> Option<Self> {
        match content_type {
            ContentType::Xml => codec::decode(body, content_type).ok(),
            // JSON codes are numeric on some endpoints and strings on others.
            ContentType::Json => {
                let value: Value = codec::decode(body, content_type).ok()?;
                let text = |key: &str| match value.get(key)? {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                };
                Some(Self {
                    code: text("code"),
                    message: text("message"),
                    description: text("description"),
                    details: text("details"),
                })
            }
        }
    }

    fn message(&self) -> Option<String> {
        let primary = self.message.as_ref().or(self.description.as_ref());
        match (primary, &self.details) {
            (Some(p), Some(d)) if p != d && !d.is_empty() => Some(format!("{p}: {d}")),
            (Some(p), _) => Some(p.clone()),
            (None, Some(d)) => Some(d.clone()),
            (None, None) => None,
        }
    }
}

/// Map a non-2xx response to [`Error::Api`], keeping whatever the server said.
pub(crate) fn api_error(response: &ResponseEnvelope, content_type: ContentType) -> Error {
    let status = response.status.as_u16();
    let reason = response
        .status
        .canonical_reason()
        .unwrap_or("unexpected status");

    if let Some(payload) = ErrorPayload::parse(&response.body, content_type) {
        if payload.code.is_some() || payload.message().is_some() {
            return Error::Api {
                status,
                message: payload.message().unwrap_or_else(|| reason.to_string()),
                code: payload.code,
            };
        }
    }

    let text = response.body_text();
    let text = text.trim();
    Error::Api {
        status,
        code: None,
        message: if text.is_empty() {
            reason.to_string()
        } else {
            text.to_string()
        },
    }
}

enum AuthSetup {
    None,
    Password {
        username: String,
        password: String,
    },
    Token(String),
    Custom(Arc<dyn Authenticator>),
}

/// Builder for [`HttpRemoteCaller`]
pub struct HttpRemoteCallerBuilder {
    endpoint: String,
    tls: TlsVerification,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    session_lifetime: Option<Duration>,
    user_agent: String,
    expiry: Option<ExpiryPredicate>,
    auth: AuthSetup,
}

impl HttpRemoteCallerBuilder {
    fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            tls: TlsVerification::Enabled,
            timeout: None,
            connect_timeout: None,
            session_lifetime: None,
            user_agent: concat!("objectscale-client/", env!("CARGO_PKG_VERSION")).to_string(),
            expiry: None,
            auth: AuthSetup::None,
        }
    }

    pub fn tls(mut self, tls: TlsVerification) -> Self {
        self.tls = tls;
        self
    }

    /// Default bound on every exchange; a request's own timeout wins.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Log in with username/password through `GET /login`
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = AuthSetup::Password {
            username: username.into(),
            password: password.into(),
        };
        self
    }

    /// Renew password sessions proactively after `lifetime`
    pub fn session_lifetime(mut self, lifetime: Duration) -> Self {
        self.session_lifetime = Some(lifetime);
        self
    }

    /// Override how expiry is detected for `credentials(..)` or `token(..)` (default: HTTP 401)
    pub fn expiry_predicate(mut self, expiry: ExpiryPredicate) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// Use a fixed token instead of logging in
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.auth = AuthSetup::Token(token.into());
        self
    }

    pub fn authenticator(mut self, auth: Arc<dyn Authenticator>) -> Self {
        self.auth = AuthSetup::Custom(auth);
        self
    }

    pub fn build(self) -> Result<HttpRemoteCaller> {
        let endpoint = parse_endpoint(&self.endpoint)?;
        let http = self.http_client()?;

        let auth: Arc<dyn Authenticator> = match self.auth {
            AuthSetup::Password { username, password } => {
                let mut login = PasswordLogin::new(http.clone(), &endpoint, username, password)?;
                if let Some(lifetime) = self.session_lifetime {
                    login = login.with_session_lifetime(lifetime);
                }
                let mut auth = SessionAuthenticator::new(login);
                if let Some(expiry) = self.expiry {
                    auth = auth.with_expiry_predicate(expiry);
                }
                Arc::new(auth)
            }
            AuthSetup::Token(token) => {
                let mut auth = StaticToken::new(token);
                if let Some(expiry) = self.expiry {
                    auth = auth.with_expiry_predicate(expiry);
                }
                Arc::new(auth)
            }
            // A custom authenticator owns its expiry check; NoAuth has none.
            AuthSetup::None | AuthSetup::Custom(_) if self.expiry.is_some() => {
                return Err(Error::Configuration(
                    "expiry_predicate requires credentials(..) or token(..)".to_string(),
                ));
            }
            AuthSetup::None => Arc::new(NoAuth),
            AuthSetup::Custom(auth) => auth,
        };

        Ok(HttpRemoteCaller {
            endpoint,
            http,
            auth,
        })
    }

    fn http_client(&self) -> Result<Client> {
        let mut builder = Client::builder().user_agent(self.user_agent.clone());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        match &self.tls {
            TlsVerification::Enabled => {}
            TlsVerification::CustomRoot(pem) => {
                let cert = reqwest::Certificate::from_pem(pem.as_bytes())
                    .map_err(|e| Error::Configuration(format!("invalid CA certificate: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsVerification::Disabled => {
                warn!("TLS certificate verification is DISABLED; only use this against test deployments");
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let mut url = Url::parse(endpoint)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Configuration(format!(
            "endpoint {endpoint} must use http or https"
        )));
    }
    if url.cannot_be_a_base() {
        return Err(Error::Configuration(format!(
            "endpoint {endpoint} cannot be used as a base URL"
        )));
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
