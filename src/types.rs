use serde::{Deserialize, Serialize};

/// Threshold condition attached to an alert policy
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyCondition {
    pub threshold_units: String,
    pub threshold_value: String,
    pub severity_type: String,
}

/// Alert policy on a metric (XML)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename = "alert_policy", rename_all = "camelCase")]
pub struct AlertPolicy {
    pub policy_name: String,
    pub metric_type: String,
    pub metric_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub is_enabled: bool,
    pub is_per_instance_metric: bool,
    pub period: i64,
    pub period_units: String,
    pub datapoints_to_consider: i64,
    pub datapoints_to_alert: i64,
    pub statistic: String,
    pub operator: String,
    #[serde(default, rename = "policyConditions")]
    pub conditions: Vec<PolicyCondition>,
}

/// Response of `vdc/alertpolicy/list`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename = "alert_policies")]
pub struct AlertPolicies {
    #[serde(default, rename = "alert_policy")]
    pub items: Vec<AlertPolicy>,
}

/// Key/value tag on an object user
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserTag {
    pub name: String,
    pub value: String,
}

/// Object user (JSON)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectUser {
    pub userid: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub tags: Vec<UserTag>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

/// One page of `object/users`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectUserList {
    #[serde(default, rename = "blobuser")]
    pub users: Vec<ObjectUser>,
    #[serde(default, rename = "NextMarker", skip_serializing_if = "Option::is_none")]
    pub next_marker: Option<String>,
    #[serde(default, rename = "MaxUsers", skip_serializing_if = "Option::is_none")]
    pub max_users: Option<u32>,
}

/// Query for listing object users
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub namespace: Option<String>,
    pub marker: Option<String>,
    pub limit: Option<u32>,
}

/// Payload of `POST object/users`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateObjectUser {
    pub user: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<UserTag>,
}

/// Payload of `POST object/users/deactivate`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeactivateObjectUser {
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Both secret key slots of an object user
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SecretKeys {
    #[serde(default)]
    pub secret_key_1: Option<String>,
    #[serde(default)]
    pub key_timestamp_1: Option<String>,
    #[serde(default)]
    pub key_expiry_timestamp_1: Option<String>,
    #[serde(default)]
    pub secret_key_2: Option<String>,
    #[serde(default)]
    pub key_timestamp_2: Option<String>,
    #[serde(default)]
    pub key_expiry_timestamp_2: Option<String>,
}

/// Payload of `POST object/user-secret-keys/{uid}`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateSecretKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_key_expiry_time_mins: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secretkey: Option<String>,
}

/// Key returned by a secret key creation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreatedSecretKey {
    pub secret_key: String,
    #[serde(default)]
    pub key_timestamp: Option<String>,
    #[serde(default)]
    pub key_expiry_timestamp: Option<String>,
}

/// Payload of `POST object/user-secret-keys/{uid}/deactivate`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeleteSecretKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Cross-region replication state between two object stores (XML)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename = "crr", rename_all = "camelCase")]
pub struct Crr {
    pub dest_object_scale: String,
    pub dest_object_store: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttle_bandwidth: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pause_start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pause_end_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspend_start_time: Option<i64>,
}

/// Options for pausing replication
#[derive(Debug, Clone, Default)]
pub struct PauseParams {
    /// Epoch milliseconds at which replication resumes by itself
    pub pause_end_millis: Option<i64>,
}

/// Options for throttling replication
#[derive(Debug, Clone, Default)]
pub struct ThrottleParams {
    pub throttle_mb_per_second: Option<u64>,
}

/// Rebuild progress of one storage-server device (JSON)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuildInfo {
    #[serde(default)]
    pub total_bytes: u64,
    #[serde(default)]
    pub remaining_bytes: u64,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
}

impl RebuildInfo {
    /// Fraction of the rebuild that is done, in `0.0..=1.0`
    pub fn progress(&self) -> f64 {
        if self.total_bytes == 0 {
            return 1.0;
        }
        let done = self.total_bytes.saturating_sub(self.remaining_bytes);
        done as f64 / self.total_bytes as f64
    }
}
