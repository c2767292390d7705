//! Session handling for the management API.
//!
//! An [`Authenticator`] owns the session. The dispatcher only ever sees
//! [`Credential`] snapshots: it attaches one to an exchange and, when the
//! response says the session expired, hands the same snapshot back to
//! [`Authenticator::renew`]. Renewal is single-flight: the first caller with a
//! stale snapshot performs the login, every other caller holding the same
//! stale generation waits for it and reuses the fresh session.

use crate::error::{Error, Result};
use crate::request::{join_url, ResponseEnvelope};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use url::Url;

/// Header carrying the session token on ObjectScale management endpoints
pub const AUTH_TOKEN_HEADER: &str = "X-SDS-AUTH-TOKEN";

/// An established session with the management API
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// A session whose validity is unknown until the server rejects it
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
        }
    }

    pub fn with_expiry(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at: Some(expires_at),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Immutable snapshot of the session used for one exchange
#[derive(Debug, Clone, Default)]
pub struct Credential {
    generation: u64,
    session: Option<Arc<Session>>,
}

impl Credential {
    pub fn new(generation: u64, session: Option<Arc<Session>>) -> Self {
        Self {
            generation,
            session,
        }
    }

    /// A credential that attaches nothing
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Incremented every time the owning authenticator replaces its session
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_deref()
    }
}

/// Decides whether a response means "your session is no longer valid"
pub type ExpiryPredicate = Arc<dyn Fn(&ResponseEnvelope) -> bool + Send + Sync>;

/// Expiry signalled by `401 Unauthorized`
pub fn unauthorized_status() -> ExpiryPredicate {
    Arc::new(|response: &ResponseEnvelope| response.status == StatusCode::UNAUTHORIZED)
}

/// Expiry signalled by a marker string anywhere in the response body
pub fn body_marker(marker: impl Into<String>) -> ExpiryPredicate {
    let marker = marker.into();
    Arc::new(move |response: &ResponseEnvelope| {
        !response.status.is_success() && response.body_text().contains(&marker)
    })
}

/// Session lifecycle as seen by the dispatcher
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Current credential, establishing a session first if there is none
    /// or the cached one is known to have expired.
    async fn credential(&self) -> Result<Credential>;

    /// Attach `credential` to an outgoing call
    fn apply_credentials(&self, credential: &Credential, request: RequestBuilder)
        -> RequestBuilder;

    /// Replace the session that `stale` was taken from.
    ///
    /// If another caller already replaced it, the newer credential is
    /// returned without a second handshake. On failure the previous session
    /// is left in place and [`Error::Authentication`] is returned.
    async fn renew(&self, stale: &Credential) -> Result<Credential>;

    /// Pure predicate over one response
    fn is_expired_response(&self, response: &ResponseEnvelope) -> bool;

    /// End the session on the server, if there is one
    async fn logout(&self) -> Result<()> {
        Ok(())
    }
}

/// The handshake that produces a [`Session`]
#[async_trait]
pub trait Login: Send + Sync {
    async fn login(&self) -> Result<Session>;

    async fn logout(&self, _session: &Session) -> Result<()> {
        Ok(())
    }
}

/// Token-header authenticator with lazy login and coalesced renewal
pub struct SessionAuthenticator<L> {
    login: L,
    header: String,
    expiry: ExpiryPredicate,
    state: RwLock<Credential>,
    renewal: Mutex<()>,
}

impl<L: Login> SessionAuthenticator<L> {
    pub fn new(login: L) -> Self {
        Self {
            login,
            header: AUTH_TOKEN_HEADER.to_string(),
            expiry: unauthorized_status(),
            state: RwLock::new(Credential::anonymous()),
            renewal: Mutex::new(()),
        }
    }

    /// Start from an already established session instead of logging in on
    /// first use.
    pub fn with_session(mut self, session: Session) -> Self {
        self.state = RwLock::new(Credential::new(1, Some(Arc::new(session))));
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn with_expiry_predicate(mut self, expiry: ExpiryPredicate) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn login_handler(&self) -> &L {
        &self.login
    }

    /// Snapshot of the current state without triggering a login
    pub async fn current(&self) -> Credential {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl<L: Login> Authenticator for SessionAuthenticator<L> {
    async fn credential(&self) -> Result<Credential> {
        let current = self.current().await;
        if current.session().is_some_and(|s| !s.is_expired()) {
            return Ok(current);
        }
        self.renew(&current).await
    }

    fn apply_credentials(
        &self,
        credential: &Credential,
        request: RequestBuilder,
    ) -> RequestBuilder {
        match credential.session() {
            Some(session) => request.header(self.header.as_str(), session.token()),
            None => request,
        }
    }

    async fn renew(&self, stale: &Credential) -> Result<Credential> {
        let _guard = self.renewal.lock().await;

        {
            let current = self.state.read().await;
            if current.generation != stale.generation {
                if let Some(session) = current.session() {
                    if !session.is_expired() {
                        debug!(
                            generation = current.generation,
                            "session already renewed by a concurrent caller"
                        );
                        return Ok(current.clone());
                    }
                }
            }
        }

        // Nothing below touches shared state until the login has completed,
        // so a dropped future leaves the previous session in place.
        let session = self.login.login().await.map_err(|e| match e {
            Error::Authentication(_) => e,
            other => Error::Authentication(format!("login failed: {other}")),
        })?;

        let mut state = self.state.write().await;
        state.generation += 1;
        state.session = Some(Arc::new(session));
        info!(generation = state.generation, "established management API session");
        Ok(state.clone())
    }

    fn is_expired_response(&self, response: &ResponseEnvelope) -> bool {
        (self.expiry)(response)
    }

    async fn logout(&self) -> Result<()> {
        let _guard = self.renewal.lock().await;
        let current = self.current().await;
        if let Some(session) = current.session() {
            self.login.logout(session).await?;
        }

        let mut state = self.state.write().await;
        state.generation += 1;
        state.session = None;
        info!(generation = state.generation, "management API session closed");
        Ok(())
    }
}

/// ObjectScale login: `GET /login` with basic auth, token returned in the
/// `X-SDS-AUTH-TOKEN` response header
pub struct PasswordLogin {
    http: Client,
    login_url: Url,
    logout_url: Url,
    username: String,
    password: String,
    header: String,
    lifetime: Option<Duration>,
}

impl PasswordLogin {
    pub fn new(
        http: Client,
        endpoint: &Url,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            http,
            login_url: join_url(endpoint, "login", &BTreeMap::new())?,
            logout_url: join_url(endpoint, "logout", &BTreeMap::new())?,
            username: username.into(),
            password: password.into(),
            header: AUTH_TOKEN_HEADER.to_string(),
            lifetime: None,
        })
    }

    /// Treat sessions as expired `lifetime` after login, so they are renewed
    /// before the server starts rejecting them.
    pub fn with_session_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for PasswordLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordLogin")
            .field("login_url", &self.login_url.as_str())
            .field("username", &self.username)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Login for PasswordLogin {
    async fn login(&self) -> Result<Session> {
        debug!(url = %self.login_url, user = %self.username, "logging in to management API");

        let response = self
            .http
            .get(self.login_url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Authentication(format!(
                "login rejected with HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let token = response
            .headers()
            .get(self.header.as_str())
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(String::from)
            .ok_or_else(|| {
                Error::Authentication(format!("login response carried no {} header", self.header))
            })?;

        let expires_at = self
            .lifetime
            .and_then(|l| chrono::Duration::from_std(l).ok())
            .map(|l| Utc::now() + l);

        Ok(Session { token, expires_at })
    }

    async fn logout(&self, session: &Session) -> Result<()> {
        let response = self
            .http
            .get(self.logout_url.clone())
            .header(self.header.as_str(), session.token())
            .send()
            .await?;

        let status = response.status();
        // An already expired session has nothing left to close.
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            return Ok(());
        }

        Err(Error::Api {
            status: status.as_u16(),
            code: None,
            message: format!("logout failed: {}", response.text().await.unwrap_or_default().trim()),
        })
    }
}

/// A fixed token issued out of band. It cannot be renewed.
#[derive(Clone)]
pub struct StaticToken {
    credential: Credential,
    header: String,
    expiry: ExpiryPredicate,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            credential: Credential::new(1, Some(Arc::new(Session::new(token)))),
            header: AUTH_TOKEN_HEADER.to_string(),
            expiry: unauthorized_status(),
        }
    }

    /// Decide which responses mean the token was rejected; those surface as
    /// [`Error::Authentication`] since the token cannot be renewed.
    pub fn with_expiry_predicate(mut self, expiry: ExpiryPredicate) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticToken")
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Authenticator for StaticToken {
    async fn credential(&self) -> Result<Credential> {
        Ok(self.credential.clone())
    }

    fn apply_credentials(
        &self,
        credential: &Credential,
        request: RequestBuilder,
    ) -> RequestBuilder {
        match credential.session() {
            Some(session) => request.header(self.header.as_str(), session.token()),
            None => request,
        }
    }

    async fn renew(&self, _stale: &Credential) -> Result<Credential> {
        Err(Error::Authentication(
            "static token was rejected and cannot be renewed".to_string(),
        ))
    }

    fn is_expired_response(&self, response: &ResponseEnvelope) -> bool {
        (self.expiry)(response)
    }
}

/// No authentication at all; for unauthenticated or proxied endpoints
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

#[async_trait]
impl Authenticator for NoAuth {
    async fn credential(&self) -> Result<Credential> {
        Ok(Credential::anonymous())
    }

    fn apply_credentials(
        &self,
        _credential: &Credential,
        request: RequestBuilder,
    ) -> RequestBuilder {
        request
    }

    async fn renew(&self, _stale: &Credential) -> Result<Credential> {
        Err(Error::Authentication(
            "no authenticator configured".to_string(),
        ))
    }

    fn is_expired_response(&self, _response: &ResponseEnvelope) -> bool {
        false
    }
}
