use crate::caller::{RemoteCaller, RemoteCallerExt};
use crate::error::{Error, Result};
use crate::request::{ContentType, Request};
use crate::types::RebuildInfo;
use async_trait::async_trait;
use std::sync::Arc;

/// Rebuild and recovery status
#[async_trait]
pub trait StatusApi: Send + Sync {
    /// Rebuild progress of the storage-server device `{pod}.{store}-ss.{namespace}` at `level`
    async fn get_rebuild_status(
        &self,
        pod: &str,
        object_store: &str,
        namespace: &str,
        level: u32,
    ) -> Result<RebuildInfo>;
}

/// [`StatusApi`] over the shared dispatcher (JSON)
#[derive(Clone)]
pub struct StatusClient {
    caller: Arc<dyn RemoteCaller>,
}

impl StatusClient {
    pub fn new(caller: Arc<dyn RemoteCaller>) -> Self {
        Self { caller }
    }
}

fn device_path(pod: &str, object_store: &str, namespace: &str, level: u32) -> Result<String> {
    for (what, value) in [("pod", pod), ("object store", object_store), ("namespace", namespace)] {
        if value.is_empty() || value.contains(['/', '.']) {
            return Err(Error::InvalidRequest(format!(
                "{what} {value:?} is not a valid DNS label"
            )));
        }
    }
    Ok(format!(
        "vdc/recovery-status/devices/{pod}.{object_store}-ss.{namespace}.svc.cluster.local/levels/{level}"
    ))
}

#[async_trait]
impl StatusApi for StatusClient {
    async fn get_rebuild_status(
        &self,
        pod: &str,
        object_store: &str,
        namespace: &str,
        level: u32,
    ) -> Result<RebuildInfo> {
        let path = device_path(pod, object_store, namespace, level)?;
        self.caller
            .make_remote_call(Request::get(path, ContentType::Json))
            .await
    }
}
