use super::*;

fn env(vars: &[(&str, &str)]) -> Vec<(String, String)> {
    vars.iter()
        .map(|(key, value)| (format!("{ENV_PREFIX}{key}"), value.to_string()))
        .collect()
}

fn parse(vars: &[(&str, &str)]) -> Result<Config, envy::Error> {
    Config::from_vars(env(vars))
}

#[test]
fn config_deserializes_from_full_env() {
    let config = parse(&[
        ("PROJECT_ID", "acme"),
        ("CLUSTER", "prod"),
        ("NODE_POOLS", "default-pool,spot-pool"),
        ("LOCAL", "true"),
        ("ACCESS_TOKEN", "ya29.token"),
        ("STEP_TIMEOUT_SECONDS", "30"),
        ("INTERVAL_SECONDS", "600"),
    ])
    .unwrap();

    assert_eq!(config.project_id, "acme");
    assert_eq!(config.cluster, "prod");
    assert_eq!(config.node_pools, ["default-pool", "spot-pool"]);
    assert!(config.local);
    assert_eq!(config.static_token(), Some("ya29.token"));
    assert_eq!(config.step_timeout(), Duration::from_secs(30));
    assert_eq!(config.interval(), Some(Duration::from_secs(600)));
}

#[test]
fn config_defaults() {
    let config = parse(&[("PROJECT_ID", "acme"), ("CLUSTER", "prod")]).unwrap();

    assert!(config.node_pools.is_empty());
    assert!(!config.local);
    assert!(config.access_token.is_none());
    assert_eq!(config.step_timeout(), Duration::from_secs(120));
    assert_eq!(config.interval(), None);
}

#[test]
fn zero_interval_runs_once() {
    let config = parse(&[
        ("PROJECT_ID", "acme"),
        ("CLUSTER", "prod"),
        ("INTERVAL_SECONDS", "0"),
    ])
    .unwrap();

    assert_eq!(config.interval(), None);
}

#[test]
fn config_requires_cluster() {
    let err = parse(&[("PROJECT_ID", "acme")]).unwrap_err();
    assert!(err.to_string().contains("cluster"), "{err}");
}

#[test]
fn unprefixed_variables_are_ignored() {
    let vars = vec![
        ("PROJECT_ID".to_string(), "acme".to_string()),
        ("CLUSTER".to_string(), "prod".to_string()),
    ];
    assert!(envy::prefixed(ENV_PREFIX).from_iter::<_, Config>(vars).is_err());
}

#[test]
fn empty_pool_list_is_empty() {
    let config = parse(&[
        ("PROJECT_ID", "acme"),
        ("CLUSTER", "prod"),
        ("NODE_POOLS", ""),
    ])
    .unwrap();
    assert!(config.node_pools.is_empty());

    let config = parse(&[
        ("PROJECT_ID", "acme"),
        ("CLUSTER", "prod"),
        ("NODE_POOLS", "default-pool,,spot-pool,"),
    ])
    .unwrap();
    assert_eq!(config.node_pools, ["default-pool", "spot-pool"]);
}

#[test]
fn local_run_requires_access_token() {
    let err = parse(&[
        ("PROJECT_ID", "acme"),
        ("CLUSTER", "prod"),
        ("LOCAL", "true"),
    ])
    .unwrap_err();
    assert!(err.to_string().contains("ACCESS_TOKEN"), "{err}");

    let err = parse(&[
        ("PROJECT_ID", "acme"),
        ("CLUSTER", "prod"),
        ("LOCAL", "true"),
        ("ACCESS_TOKEN", ""),
    ])
    .unwrap_err();
    assert!(err.to_string().contains("ACCESS_TOKEN"), "{err}");
}

#[test]
fn in_cluster_run_ignores_access_token() {
    let config = parse(&[
        ("PROJECT_ID", "acme"),
        ("CLUSTER", "prod"),
        ("ACCESS_TOKEN", "ya29.token"),
    ])
    .unwrap();
    assert_eq!(config.static_token(), None);
}
