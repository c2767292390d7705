use objectscale_client::types::{AlertPolicy, PolicyCondition};
use objectscale_client::{AlertPolicyApi, ClientConfig, ClientSet};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("==> Alert policies");

    let config = ClientConfig::from_env()?;
    let client = ClientSet::from_config(&config)?;
    println!("✓ Connecting to {}", config.endpoint);

    let policies = client.alert_policies();
    for policy in policies.list().await? {
        println!(
            "  {} ({} {} {}) enabled={}",
            policy.policy_name, policy.metric_name, policy.operator, policy.statistic, policy.is_enabled
        );
    }

    let policy = AlertPolicy {
        policy_name: "demo-capacity".to_string(),
        metric_type: "Capacity".to_string(),
        metric_name: "UsedCapacityPercent".to_string(),
        is_enabled: true,
        period: 10,
        period_units: "MINUTES".to_string(),
        datapoints_to_consider: 3,
        datapoints_to_alert: 2,
        statistic: "Average".to_string(),
        operator: "GreaterThan".to_string(),
        conditions: vec![PolicyCondition {
            threshold_units: "PERCENT".to_string(),
            threshold_value: "85".to_string(),
            severity_type: "WARNING".to_string(),
        }],
        ..Default::default()
    };

    let created = policies.create(&policy).await?;
    println!("✓ Created policy {}", created.policy_name);

    let mut disabled = created;
    disabled.is_enabled = false;
    policies.update(&disabled.policy_name, &disabled).await?;
    println!("✓ Disabled policy {}", disabled.policy_name);

    policies.delete(&disabled.policy_name).await?;
    println!("✓ Deleted policy {}", disabled.policy_name);

    Ok(())
}
