use crate::caller::{RemoteCaller, RemoteCallerExt};
use crate::error::Result;
use crate::request::{path_segment, ContentType, Request};
use crate::types::{
    CreateObjectUser, CreateSecretKey, CreatedSecretKey, DeactivateObjectUser, DeleteSecretKey,
    ListParams, ObjectUser, ObjectUserList, SecretKeys,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Object user and secret key operations
#[async_trait]
pub trait ObjectUserApi: Send + Sync {
    async fn list(&self, params: &ListParams) -> Result<ObjectUserList>;

    async fn get_info(&self, uid: &str) -> Result<ObjectUser>;

    async fn create(&self, user: &CreateObjectUser) -> Result<ObjectUser>;

    async fn delete(&self, uid: &str, namespace: Option<&str>) -> Result<()>;

    async fn get_secret_keys(&self, uid: &str) -> Result<SecretKeys>;

    async fn create_secret_key(&self, uid: &str, key: &CreateSecretKey) -> Result<CreatedSecretKey>;

    async fn delete_secret_key(&self, uid: &str, key: &DeleteSecretKey) -> Result<()>;
}

/// [`ObjectUserApi`] over the shared dispatcher (JSON)
#[derive(Clone)]
pub struct ObjectUserClient {
    caller: Arc<dyn RemoteCaller>,
}

impl ObjectUserClient {
    pub fn new(caller: Arc<dyn RemoteCaller>) -> Self {
        Self { caller }
    }

    /// Follow `NextMarker` until every page of users has been read
    pub async fn list_all(&self, namespace: Option<&str>) -> Result<Vec<ObjectUser>> {
        let mut users = Vec::new();
        let mut params = ListParams {
            namespace: namespace.map(String::from),
            ..Default::default()
        };
        loop {
            let page = self.list(&params).await?;
            users.extend(page.users);
            match page.next_marker {
                Some(marker) if !marker.is_empty() && params.marker.as_ref() != Some(&marker) => {
                    params.marker = Some(marker);
                }
                _ => return Ok(users),
            }
        }
    }
}

fn secret_keys_path(uid: &str) -> Result<String> {
    Ok(format!("object/user-secret-keys/{}", path_segment(uid)?))
}

#[async_trait]
impl ObjectUserApi for ObjectUserClient {
    async fn list(&self, params: &ListParams) -> Result<ObjectUserList> {
        let request = Request::get("object/users", ContentType::Json)
            .param_opt("namespace", params.namespace.as_deref())
            .param_opt("marker", params.marker.as_deref())
            .param_opt("limit", params.limit);
        self.caller.make_remote_call_or_default(request).await
    }

    async fn get_info(&self, uid: &str) -> Result<ObjectUser> {
        let path = format!("object/users/{}/info", path_segment(uid)?);
        self.caller
            .make_remote_call(Request::get(path, ContentType::Json))
            .await
    }

    async fn create(&self, user: &CreateObjectUser) -> Result<ObjectUser> {
        let request = Request::post("object/users", ContentType::Json).with_body(user)?;
        self.caller.make_remote_call(request).await
    }

    async fn delete(&self, uid: &str, namespace: Option<&str>) -> Result<()> {
        let body = DeactivateObjectUser {
            user: uid.to_string(),
            namespace: namespace.map(String::from),
        };
        let request = Request::post("object/users/deactivate", ContentType::Json).with_body(&body)?;
        self.caller.make_bodiless_call(request).await
    }

    async fn get_secret_keys(&self, uid: &str) -> Result<SecretKeys> {
        self.caller
            .make_remote_call_or_default(Request::get(secret_keys_path(uid)?, ContentType::Json))
            .await
    }

    async fn create_secret_key(&self, uid: &str, key: &CreateSecretKey) -> Result<CreatedSecretKey> {
        let request = Request::post(secret_keys_path(uid)?, ContentType::Json).with_body(key)?;
        self.caller.make_remote_call(request).await
    }

    async fn delete_secret_key(&self, uid: &str, key: &DeleteSecretKey) -> Result<()> {
        let path = format!("{}/deactivate", secret_keys_path(uid)?);
        let request = Request::post(path, ContentType::Json).with_body(key)?;
        self.caller.make_bodiless_call(request).await
    }
}
