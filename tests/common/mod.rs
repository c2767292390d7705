//! Shared test doubles
#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use objectscale_client::auth::{Authenticator, Login, Session, SessionAuthenticator};
use objectscale_client::caller::{HttpRemoteCaller, RemoteCaller};
use objectscale_client::{Request, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Login that hands out the same token every time and counts how often it ran
pub struct TokenLogin {
    token: String,
    calls: AtomicUsize,
    delay: Duration,
}

impl TokenLogin {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            calls: AtomicUsize::new(0),
            delay: Duration::from_millis(20),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Login for TokenLogin {
    async fn login(&self) -> Result<Session> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(Session::new(self.token.clone()))
    }
}

/// Caller whose session starts as `stale` and renews to `fresh`
pub fn caller_with_stale_session(
    endpoint: &str,
) -> (HttpRemoteCaller, Arc<SessionAuthenticator<TokenLogin>>) {
    let auth = Arc::new(
        SessionAuthenticator::new(TokenLogin::new("fresh")).with_session(Session::new("stale")),
    );
    let caller = HttpRemoteCaller::builder(endpoint)
        .authenticator(auth.clone() as Arc<dyn Authenticator>)
        .build()
        .expect("caller");
    (caller, auth)
}

/// [`RemoteCaller`] that records requests and replays queued responses
#[derive(Default)]
pub struct ScriptedCaller {
    responses: Mutex<VecDeque<Result<Bytes>>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedCaller {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, body: &str) {
        self.push(Ok(Bytes::from(body.to_string())));
    }

    pub fn respond_empty(&self) {
        self.push(Ok(Bytes::new()));
    }

    pub fn push(&self, response: Result<Bytes>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Request {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was dispatched")
    }
}

#[async_trait]
impl RemoteCaller for ScriptedCaller {
    async fn execute(&self, request: Request) -> Result<Bytes> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Bytes::new()))
    }
}
