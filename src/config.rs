use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default management endpoint of a local ObjectScale deployment
pub const DEFAULT_ENDPOINT: &str = "https://localhost:4443";

/// TLS trust policy for the management endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsVerification {
    /// Verify server certificates against the system roots
    #[default]
    Enabled,
    /// Additionally trust the given PEM certificate (on-prem self-signed CA)
    CustomRoot(String),
    /// Skip certificate verification (testing only - INSECURE)
    Disabled,
}

/// Username/password used for the login handshake
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Connection settings for one management API instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoint: String,
    pub tls: TlsVerification,
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub session_lifetime_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub credentials: Option<Credentials>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            tls: TlsVerification::Enabled,
            timeout_secs: Some(30),
            connect_timeout_secs: Some(10),
            session_lifetime_secs: None,
            user_agent: None,
            credentials: None,
        }
    }
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Read settings from `OBJECTSCALE_*` environment variables
    ///
    /// - `OBJECTSCALE_ENDPOINT`
    /// - `OBJECTSCALE_USERNAME` / `OBJECTSCALE_PASSWORD`
    /// - `OBJECTSCALE_INSECURE` (`true`/`1` disables certificate checks)
    /// - `OBJECTSCALE_CA_CERT` (path to a PEM file to trust)
    /// - `OBJECTSCALE_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ClientConfig::default();

        if let Some(endpoint) = lookup("OBJECTSCALE_ENDPOINT") {
            config.endpoint = endpoint;
        }

        match (lookup("OBJECTSCALE_USERNAME"), lookup("OBJECTSCALE_PASSWORD")) {
            (Some(username), Some(password)) => {
                config.credentials = Some(Credentials { username, password });
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(Error::Configuration(
                    "OBJECTSCALE_USERNAME and OBJECTSCALE_PASSWORD must be set together"
                        .to_string(),
                ));
            }
            (None, None) => {}
        }

        if let Some(path) = lookup("OBJECTSCALE_CA_CERT") {
            let pem = std::fs::read_to_string(&path)
                .map_err(|e| Error::Configuration(format!("cannot read CA certificate {path}: {e}")))?;
            config.tls = TlsVerification::CustomRoot(pem);
        }

        if let Some(insecure) = lookup("OBJECTSCALE_INSECURE") {
            if matches!(insecure.to_ascii_lowercase().as_str(), "1" | "true" | "yes") {
                config.tls = TlsVerification::Disabled;
            }
        }

        if let Some(timeout) = lookup("OBJECTSCALE_TIMEOUT_SECS") {
            let secs = timeout.parse::<u64>().map_err(|e| {
                Error::Configuration(format!("invalid OBJECTSCALE_TIMEOUT_SECS {timeout:?}: {e}"))
            })?;
            config.timeout_secs = Some(secs);
        }

        Ok(config)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    pub fn session_lifetime(&self) -> Option<Duration> {
        self.session_lifetime_secs.map(Duration::from_secs)
    }
}
