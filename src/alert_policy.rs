use crate::caller::{RemoteCaller, RemoteCallerExt};
use crate::error::Result;
use crate::request::{path_segment, ContentType, Request};
use crate::types::{AlertPolicies, AlertPolicy};
use async_trait::async_trait;
use std::sync::Arc;

const BASE: &str = "vdc/alertpolicy";

/// Alert policy operations
#[async_trait]
pub trait AlertPolicyApi: Send + Sync {
    async fn get(&self, name: &str) -> Result<AlertPolicy>;

    async fn list(&self) -> Result<Vec<AlertPolicy>>;

    async fn create(&self, policy: &AlertPolicy) -> Result<AlertPolicy>;

    async fn update(&self, name: &str, policy: &AlertPolicy) -> Result<AlertPolicy>;

    async fn delete(&self, name: &str) -> Result<()>;
}

/// [`AlertPolicyApi`] over the shared dispatcher (XML)
#[derive(Clone)]
pub struct AlertPolicyClient {
    caller: Arc<dyn RemoteCaller>,
}

impl AlertPolicyClient {
    pub fn new(caller: Arc<dyn RemoteCaller>) -> Self {
        Self { caller }
    }
}

fn item_path(name: &str) -> Result<String> {
    Ok(format!("{BASE}/{}", path_segment(name)?))
}

#[async_trait]
impl AlertPolicyApi for AlertPolicyClient {
    async fn get(&self, name: &str) -> Result<AlertPolicy> {
        self.caller
            .make_remote_call(Request::get(item_path(name)?, ContentType::Xml))
            .await
    }

    async fn list(&self) -> Result<Vec<AlertPolicy>> {
        let policies: AlertPolicies = self
            .caller
            .make_remote_call_or_default(Request::get(format!("{BASE}/list"), ContentType::Xml))
            .await?;
        Ok(policies.items)
    }

    async fn create(&self, policy: &AlertPolicy) -> Result<AlertPolicy> {
        let request = Request::post(BASE, ContentType::Xml).with_body(policy)?;
        self.caller.make_remote_call(request).await
    }

    async fn update(&self, name: &str, policy: &AlertPolicy) -> Result<AlertPolicy> {
        let request = Request::put(item_path(name)?, ContentType::Xml).with_body(policy)?;
        self.caller.make_remote_call(request).await
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.caller
            .make_bodiless_call(Request::delete(item_path(name)?, ContentType::Xml))
            .await
    }
}
