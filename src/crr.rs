use crate::caller::{RemoteCaller, RemoteCallerExt};
use crate::error::Result;
use crate::request::{path_segment, ContentType, Request};
use crate::types::{Crr, PauseParams, ThrottleParams};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Replication control verbs under `replication/control`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrrAction {
    Pause,
    Suspend,
    Resume,
    Throttle,
    Unthrottle,
}

impl CrrAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrrAction::Pause => "pause",
            CrrAction::Suspend => "suspend",
            CrrAction::Resume => "resume",
            CrrAction::Throttle => "throttle",
            CrrAction::Unthrottle => "unthrottle",
        }
    }
}

impl fmt::Display for CrrAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cross-region replication control between a source and a destination store
#[async_trait]
pub trait CrrApi: Send + Sync {
    async fn pause(&self, object_scale: &str, object_store: &str, params: &PauseParams) -> Result<()>;

    async fn suspend(&self, object_scale: &str, object_store: &str) -> Result<()>;

    async fn resume(&self, object_scale: &str, object_store: &str) -> Result<()>;

    async fn throttle(
        &self,
        object_scale: &str,
        object_store: &str,
        params: &ThrottleParams,
    ) -> Result<()>;

    async fn unthrottle(&self, object_scale: &str, object_store: &str) -> Result<()>;

    async fn get(&self, object_scale: &str, object_store: &str) -> Result<Crr>;
}

/// [`CrrApi`] over the shared dispatcher (XML)
#[derive(Clone)]
pub struct CrrClient {
    caller: Arc<dyn RemoteCaller>,
}

impl CrrClient {
    pub fn new(caller: Arc<dyn RemoteCaller>) -> Self {
        Self { caller }
    }

    fn control(&self, object_scale: &str, object_store: &str, action: CrrAction) -> Result<Request> {
        let path = format!(
            "replication/control/{}/{}/{action}",
            path_segment(object_scale)?,
            path_segment(object_store)?
        );
        Ok(Request::post(path, ContentType::Xml))
    }
}

#[async_trait]
impl CrrApi for CrrClient {
    async fn pause(&self, object_scale: &str, object_store: &str, params: &PauseParams) -> Result<()> {
        let request = self
            .control(object_scale, object_store, CrrAction::Pause)?
            .param_opt("pauseEndMills", params.pause_end_millis);
        self.caller.make_bodiless_call(request).await
    }

    async fn suspend(&self, object_scale: &str, object_store: &str) -> Result<()> {
        let request = self.control(object_scale, object_store, CrrAction::Suspend)?;
        self.caller.make_bodiless_call(request).await
    }

    async fn resume(&self, object_scale: &str, object_store: &str) -> Result<()> {
        let request = self.control(object_scale, object_store, CrrAction::Resume)?;
        self.caller.make_bodiless_call(request).await
    }

    async fn throttle(
        &self,
        object_scale: &str,
        object_store: &str,
        params: &ThrottleParams,
    ) -> Result<()> {
        let request = self
            .control(object_scale, object_store, CrrAction::Throttle)?
            .param_opt("throttleMBPerSecond", params.throttle_mb_per_second);
        self.caller.make_bodiless_call(request).await
    }

    async fn unthrottle(&self, object_scale: &str, object_store: &str) -> Result<()> {
        let request = self.control(object_scale, object_store, CrrAction::Unthrottle)?;
        self.caller.make_bodiless_call(request).await
    }

    async fn get(&self, object_scale: &str, object_store: &str) -> Result<Crr> {
        let request = Request::get("replication/info", ContentType::Xml)
            .param("destObjectScale", object_scale)
            .param("destObjectStore", object_store);
        self.caller.make_remote_call(request).await
    }
}
