use crate::alert_policy::AlertPolicyClient;
use crate::caller::{HttpRemoteCaller, RemoteCaller};
use crate::config::ClientConfig;
use crate::crr::CrrClient;
use crate::error::Result;
use crate::object_user::ObjectUserClient;
use crate::status::StatusClient;
use std::sync::Arc;

/// One handle per resource group, all sharing a single dispatcher
///
/// Every resource client holds the same `Arc<dyn RemoteCaller>`, so the
/// session and connection pool are shared across them.
#[derive(Clone)]
pub struct ClientSet {
    caller: Arc<dyn RemoteCaller>,
    alert_policies: AlertPolicyClient,
    object_users: ObjectUserClient,
    crr: CrrClient,
    status: StatusClient,
}

impl ClientSet {
    pub fn new(caller: Arc<dyn RemoteCaller>) -> Self {
        Self {
            alert_policies: AlertPolicyClient::new(caller.clone()),
            object_users: ObjectUserClient::new(caller.clone()),
            crr: CrrClient::new(caller.clone()),
            status: StatusClient::new(caller.clone()),
            caller,
        }
    }

    /// Build an [`HttpRemoteCaller`] from `config` and wrap it
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let caller = HttpRemoteCaller::from_config(config)?;
        Ok(Self::new(Arc::new(caller)))
    }

    pub fn caller(&self) -> &Arc<dyn RemoteCaller> {
        &self.caller
    }

    pub fn alert_policies(&self) -> &AlertPolicyClient {
        &self.alert_policies
    }

    pub fn object_users(&self) -> &ObjectUserClient {
        &self.object_users
    }

    pub fn crr(&self) -> &CrrClient {
        &self.crr
    }

    pub fn status(&self) -> &StatusClient {
        &self.status
    }
}

impl std::fmt::Debug for ClientSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSet").finish_non_exhaustive()
    }
}
