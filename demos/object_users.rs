use objectscale_client::types::{CreateObjectUser, CreateSecretKey, DeleteSecretKey};
use objectscale_client::{ClientConfig, ClientSet, ObjectUserApi};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("==> Object users");

    let namespace = env::var("OBJECTSCALE_NAMESPACE").unwrap_or_else(|_| "ns1".to_string());
    let client = ClientSet::from_config(&ClientConfig::from_env()?)?;
    let users = client.object_users();

    let all = users.list_all(Some(&namespace)).await?;
    println!("✓ {} users in namespace {}", all.len(), namespace);
    for user in &all {
        println!("  {} locked={}", user.userid, user.locked);
    }

    let uid = "demo-user";
    users
        .create(&CreateObjectUser {
            user: uid.to_string(),
            namespace: namespace.clone(),
            tags: vec![],
        })
        .await?;
    println!("✓ Created user {uid}");

    let key = users
        .create_secret_key(uid, &CreateSecretKey::default())
        .await?;
    println!("✓ Issued secret key (expires {:?})", key.key_expiry_timestamp);

    let keys = users.get_secret_keys(uid).await?;
    println!("  slot 1 set: {}", keys.secret_key_1.is_some());

    users
        .delete_secret_key(
            uid,
            &DeleteSecretKey {
                secret_key: Some(key.secret_key),
                namespace: Some(namespace.clone()),
            },
        )
        .await?;
    println!("✓ Revoked secret key");

    users.delete(uid, Some(&namespace)).await?;
    println!("✓ Deactivated user {uid}");

    Ok(())
}
