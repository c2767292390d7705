//! Resource clients over a scripted dispatcher: paths, verbs, formats and
//! payloads, without any HTTP.

mod common;

use common::ScriptedCaller;
use objectscale_client::request::Method;
use objectscale_client::types::{
    CreateObjectUser, CreateSecretKey, DeleteSecretKey, ListParams, PauseParams, ThrottleParams,
};
use objectscale_client::{
    AlertPolicyApi, ClientSet, ContentType, CrrApi, Error, ObjectUserApi, RemoteCaller, StatusApi,
};
use std::sync::Arc;

fn client_set(scripted: &Arc<ScriptedCaller>) -> ClientSet {
    ClientSet::new(scripted.clone() as Arc<dyn RemoteCaller>)
}

fn body_json(request: &objectscale_client::Request) -> serde_json::Value {
    serde_json::from_slice(request.body().expect("request body")).unwrap()
}

mod alert_policy_tests {
    use super::*;

    const POLICY_XML: &str = "<alert_policy><policyName>p1</policyName><metricType>Capacity</metricType>\
        <metricName>UsedCapacityPercent</metricName><isEnabled>true</isEnabled>\
        <isPerInstanceMetric>false</isPerInstanceMetric><period>5</period><periodUnits>MINUTES</periodUnits>\
        <datapointsToConsider>3</datapointsToConsider><datapointsToAlert>2</datapointsToAlert>\
        <statistic>Average</statistic><operator>GreaterThan</operator></alert_policy>";

    #[tokio::test]
    async fn test_get_policy() {
        let scripted = ScriptedCaller::new();
        scripted.respond(POLICY_XML);

        let policy = client_set(&scripted).alert_policies().get("p1").await.unwrap();

        assert_eq!(policy.policy_name, "p1");
        assert!(policy.is_enabled);
        assert!(policy.conditions.is_empty());
        let request = scripted.last_request();
        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.path(), "vdc/alertpolicy/p1");
        assert_eq!(request.content_type(), ContentType::Xml);
        assert!(request.body().is_none());
    }

    #[tokio::test]
    async fn test_list_policies() {
        let scripted = ScriptedCaller::new();
        scripted.respond(&format!("<alert_policies>{POLICY_XML}{}</alert_policies>", POLICY_XML.replace("p1", "p2")));

        let policies = client_set(&scripted).alert_policies().list().await.unwrap();

        let names: Vec<_> = policies.iter().map(|p| p.policy_name.as_str()).collect();
        assert_eq!(names, ["p1", "p2"]);
        assert_eq!(scripted.last_request().path(), "vdc/alertpolicy/list");
    }

    #[tokio::test]
    async fn test_list_empty_body_is_empty() {
        let scripted = ScriptedCaller::new();
        scripted.respond_empty();

        let policies = client_set(&scripted).alert_policies().list().await.unwrap();
        assert!(policies.is_empty());
    }

    #[tokio::test]
    async fn test_update_puts_xml_body() {
        let scripted = ScriptedCaller::new();
        scripted.respond(POLICY_XML);
        let clients = client_set(&scripted);
        let policy = clients.alert_policies().get("p1").await.unwrap();

        scripted.respond(POLICY_XML);
        clients.alert_policies().update("p1", &policy).await.unwrap();

        let request = scripted.last_request();
        assert_eq!(request.method(), Method::Put);
        assert_eq!(request.path(), "vdc/alertpolicy/p1");
        let body = std::str::from_utf8(request.body().unwrap()).unwrap();
        assert!(body.starts_with("<alert_policy>"));
        assert!(body.contains("<operator>GreaterThan</operator>"));
    }

    #[tokio::test]
    async fn test_delete_has_no_body() {
        let scripted = ScriptedCaller::new();
        client_set(&scripted).alert_policies().delete("cpu high").await.unwrap();

        let request = scripted.last_request();
        assert_eq!(request.method(), Method::Delete);
        assert_eq!(request.path(), "vdc/alertpolicy/cpu%20high");
        assert!(request.body().is_none());
    }

    #[tokio::test]
    async fn test_get_with_empty_body_is_decode_error() {
        let scripted = ScriptedCaller::new();
        scripted.respond_empty();

        let err = client_set(&scripted).alert_policies().get("p1").await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)), "got {err:?}");
    }
}

mod object_user_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_sends_query() {
        let scripted = ScriptedCaller::new();
        scripted.respond(r#"{"blobuser":[{"userid":"u1","namespace":"ns1"}],"NextMarker":"u1"}"#);

        let params = ListParams {
            namespace: Some("ns1".to_string()),
            marker: None,
            limit: Some(1),
        };
        let page = client_set(&scripted).object_users().list(&params).await.unwrap();

        assert_eq!(page.users[0].userid, "u1");
        let request = scripted.last_request();
        assert_eq!(request.path(), "object/users");
        assert_eq!(request.content_type(), ContentType::Json);
        assert_eq!(request.query().get("namespace").map(String::as_str), Some("ns1"));
        assert_eq!(request.query().get("limit").map(String::as_str), Some("1"));
        assert!(!request.query().contains_key("marker"));
    }

    #[tokio::test]
    async fn test_list_all_follows_markers() {
        let scripted = ScriptedCaller::new();
        scripted.respond(r#"{"blobuser":[{"userid":"u1","namespace":"ns1"}],"NextMarker":"u1"}"#);
        scripted.respond(r#"{"blobuser":[{"userid":"u2","namespace":"ns1"}]}"#);

        let clients = client_set(&scripted);
        let users = clients.object_users().list_all(Some("ns1")).await.unwrap();

        assert_eq!(users.len(), 2);
        let requests = scripted.requests();
        assert_eq!(requests.len(), 2);
        assert!(!requests[0].query().contains_key("marker"));
        assert_eq!(requests[1].query().get("marker").map(String::as_str), Some("u1"));
    }

    #[tokio::test]
    async fn test_create_posts_json() {
        let scripted = ScriptedCaller::new();
        scripted.respond(r#"{"userid":"u9","namespace":"ns1"}"#);

        let user = CreateObjectUser {
            user: "u9".to_string(),
            namespace: "ns1".to_string(),
            tags: vec![],
        };
        let created = client_set(&scripted).object_users().create(&user).await.unwrap();

        assert_eq!(created.userid, "u9");
        let request = scripted.last_request();
        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.path(), "object/users");
        assert_eq!(body_json(&request), serde_json::json!({"user": "u9", "namespace": "ns1"}));
    }

    #[tokio::test]
    async fn test_delete_deactivates() {
        let scripted = ScriptedCaller::new();
        client_set(&scripted)
            .object_users()
            .delete("u9", Some("ns1"))
            .await
            .unwrap();

        let request = scripted.last_request();
        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.path(), "object/users/deactivate");
        assert_eq!(body_json(&request), serde_json::json!({"user": "u9", "namespace": "ns1"}));
    }

    #[tokio::test]
    async fn test_secret_key_lifecycle() {
        let scripted = ScriptedCaller::new();
        scripted.respond(r#"{"secret_key":"abc","key_expiry_timestamp":""}"#);
        scripted.respond(r#"{"secret_key_1":"abc","secret_key_2":null}"#);

        let clients = client_set(&scripted);
        let users = clients.object_users();
        let created = users
            .create_secret_key("u9", &CreateSecretKey::default())
            .await
            .unwrap();
        assert_eq!(created.secret_key, "abc");

        let keys = users.get_secret_keys("u9").await.unwrap();
        assert_eq!(keys.secret_key_1.as_deref(), Some("abc"));
        assert_eq!(keys.secret_key_2, None);

        let delete = DeleteSecretKey {
            secret_key: Some("abc".to_string()),
            namespace: None,
        };
        users.delete_secret_key("u9", &delete).await.unwrap();

        let paths: Vec<_> = scripted
            .requests()
            .iter()
            .map(|r| format!("{} {}", r.method(), r.path()))
            .collect();
        assert_eq!(
            paths,
            [
                "POST object/user-secret-keys/u9",
                "GET object/user-secret-keys/u9",
                "POST object/user-secret-keys/u9/deactivate",
            ]
        );
        assert_eq!(
            body_json(&scripted.last_request()),
            serde_json::json!({"secret_key": "abc"})
        );
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let scripted = ScriptedCaller::new();
        scripted.push(Err(Error::Api {
            status: 404,
            code: Some("NOT_FOUND".to_string()),
            message: "no such user".to_string(),
        }));

        let err = client_set(&scripted).object_users().get_info("ghost").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(scripted.last_request().path(), "object/users/ghost/info");
    }
}

mod crr_tests {
    use super::*;

    #[tokio::test]
    async fn test_control_actions() {
        let scripted = ScriptedCaller::new();
        let clients = client_set(&scripted);
        let crr = clients.crr();

        crr.pause("os2", "store2", &PauseParams { pause_end_millis: Some(1700000000000) })
            .await
            .unwrap();
        crr.suspend("os2", "store2").await.unwrap();
        crr.resume("os2", "store2").await.unwrap();
        crr.throttle("os2", "store2", &ThrottleParams { throttle_mb_per_second: Some(50) })
            .await
            .unwrap();
        crr.unthrottle("os2", "store2").await.unwrap();

        let requests = scripted.requests();
        let paths: Vec<_> = requests.iter().map(|r| r.path().to_string()).collect();
        assert_eq!(
            paths,
            [
                "replication/control/os2/store2/pause",
                "replication/control/os2/store2/suspend",
                "replication/control/os2/store2/resume",
                "replication/control/os2/store2/throttle",
                "replication/control/os2/store2/unthrottle",
            ]
        );
        assert!(requests.iter().all(|r| r.method() == Method::Post && r.body().is_none()));
        assert_eq!(
            requests[0].query().get("pauseEndMills").map(String::as_str),
            Some("1700000000000")
        );
        assert_eq!(
            requests[3].query().get("throttleMBPerSecond").map(String::as_str),
            Some("50")
        );
        assert!(requests[1].query().is_empty());
    }

    #[tokio::test]
    async fn test_get_replication_info() {
        let scripted = ScriptedCaller::new();
        scripted.respond(
            "<crr><destObjectScale>os2</destObjectScale><destObjectStore>store2</destObjectStore>\
             <status>PAUSED</status><pauseEndTime>1700000000000</pauseEndTime></crr>",
        );

        let info = client_set(&scripted).crr().get("os2", "store2").await.unwrap();

        assert_eq!(info.status.as_deref(), Some("PAUSED"));
        assert_eq!(info.pause_end_time, Some(1700000000000));
        let request = scripted.last_request();
        assert_eq!(request.path(), "replication/info");
        assert_eq!(request.content_type(), ContentType::Xml);
        assert_eq!(request.query().get("destObjectScale").map(String::as_str), Some("os2"));
        assert_eq!(request.query().get("destObjectStore").map(String::as_str), Some("store2"));
    }
}

mod status_tests {
    use super::*;

    #[tokio::test]
    async fn test_rebuild_status() {
        let scripted = ScriptedCaller::new();
        scripted.respond(r#"{"totalBytes":1000,"remainingBytes":250,"level":1,"status":"IN_PROGRESS"}"#);

        let info = client_set(&scripted)
            .status()
            .get_rebuild_status("objectstore-ss-0", "store1", "ns1", 1)
            .await
            .unwrap();

        assert_eq!(info.remaining_bytes, 250);
        assert!((info.progress() - 0.75).abs() < f64::EPSILON);
        assert_eq!(
            scripted.last_request().path(),
            "vdc/recovery-status/devices/objectstore-ss-0.store1-ss.ns1.svc.cluster.local/levels/1"
        );
    }

    #[tokio::test]
    async fn test_invalid_device_is_rejected_before_dispatch() {
        let scripted = ScriptedCaller::new();
        let err = client_set(&scripted)
            .status()
            .get_rebuild_status("a.b", "store1", "ns1", 1)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(scripted.requests().is_empty());
    }
}

mod relative_segment_tests {
    use super::*;

    fn assert_rejected<T: std::fmt::Debug>(result: objectscale_client::Result<T>, what: &str) {
        match result {
            Err(Error::InvalidRequest(_)) => {}
            other => panic!("{what}: expected InvalidRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_alert_policy_names_cannot_escape() {
        let scripted = ScriptedCaller::new();
        let clients = client_set(&scripted);
        let policies = clients.alert_policies();
        let policy = objectscale_client::types::AlertPolicy::default();

        for name in ["..", ".", ""] {
            assert_rejected(policies.get(name).await, "get");
            assert_rejected(policies.update(name, &policy).await, "update");
            assert_rejected(policies.delete(name).await, "delete");
        }
        assert!(scripted.requests().is_empty());
    }

    #[tokio::test]
    async fn test_object_user_ids_cannot_escape() {
        let scripted = ScriptedCaller::new();
        let clients = client_set(&scripted);
        let users = clients.object_users();

        for uid in ["..", "."] {
            assert_rejected(users.get_info(uid).await, "get_info");
            assert_rejected(users.get_secret_keys(uid).await, "get_secret_keys");
            assert_rejected(
                users.create_secret_key(uid, &CreateSecretKey::default()).await,
                "create_secret_key",
            );
            assert_rejected(
                users.delete_secret_key(uid, &DeleteSecretKey::default()).await,
                "delete_secret_key",
            );
        }
        assert!(scripted.requests().is_empty());
    }

    #[tokio::test]
    async fn test_crr_stores_cannot_escape() {
        let scripted = ScriptedCaller::new();
        let clients = client_set(&scripted);
        let crr = clients.crr();

        for (scale, store) in [("..", "store2"), ("os2", ".."), (".", "store2"), ("os2", ".")] {
            assert_rejected(crr.pause(scale, store, &PauseParams::default()).await, "pause");
            assert_rejected(crr.suspend(scale, store).await, "suspend");
            assert_rejected(crr.resume(scale, store).await, "resume");
            assert_rejected(crr.throttle(scale, store, &ThrottleParams::default()).await, "throttle");
            assert_rejected(crr.unthrottle(scale, store).await, "unthrottle");
        }
        assert!(scripted.requests().is_empty());
    }

    #[tokio::test]
    async fn test_rebuild_status_labels_cannot_escape() {
        let scripted = ScriptedCaller::new();
        let clients = client_set(&scripted);

        for (pod, store, ns) in [("..", "s", "n"), ("p", ".", "n"), ("p", "s", "..")] {
            assert_rejected(
                clients.status().get_rebuild_status(pod, store, ns, 1).await,
                "get_rebuild_status",
            );
        }
        assert!(scripted.requests().is_empty());
    }

    #[tokio::test]
    async fn test_dots_inside_a_name_are_kept() {
        let scripted = ScriptedCaller::new();
        client_set(&scripted).alert_policies().delete("p.v2").await.unwrap();
        assert_eq!(scripted.last_request().path(), "vdc/alertpolicy/p.v2");
    }
}
