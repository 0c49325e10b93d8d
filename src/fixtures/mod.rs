//! Route tables built from configuration.
//!
//! # Data Flow
//! ```text
//! MockConfig
//!     → pending_seeds (resource seed files / inline records)
//!     → resource.rs (five CRUD routes per resource, in config order)
//!     → static_route.rs (fixed envelopes, in config order)
//!     → seed_store (MemoryStore, once the table has built)
//!     → RouteTable
//! ```

pub mod resource;
pub mod static_route;

use std::path::Path;

use crate::config::{LatencyConfig, MockConfig, ResourceConfig};
use crate::error::MockResult;
use crate::handler::Latency;
use crate::routing::RouteTable;
use crate::store::MemoryStore;

/// Latency for a route: its own override, else the configured default.
pub fn latency_for(defaults: &LatencyConfig, override_ms: Option<u64>) -> Latency {
    match override_ms {
        Some(ms) => Latency::from_millis(ms, 0),
        None => Latency::from_millis(defaults.default_ms, defaults.jitter_ms),
    }
}

/// Seed records declared by a resource: the seed file when given, else the
/// inline records.
pub fn seed_records(resource: &ResourceConfig) -> MockResult<Vec<serde_json::Value>> {
    match &resource.seed_file {
        Some(path) => MemoryStore::load_seed_file(Path::new(path)),
        None => Ok(resource.records.clone()),
    }
}

/// Seed records for every resource collection not in the store yet.
///
/// Nothing is written here; a missing or malformed seed file fails the whole
/// batch.
pub fn pending_seeds(
    config: &MockConfig,
    store: &MemoryStore,
) -> MockResult<Vec<(String, Vec<serde_json::Value>)>> {
    config
        .resources
        .iter()
        .filter(|resource| !store.contains(&resource.name))
        .map(|resource| Ok((resource.name.clone(), seed_records(resource)?)))
        .collect()
}

/// Write seeds from [`pending_seeds`] into the store.
pub fn seed_store(store: &MemoryStore, seeds: Vec<(String, Vec<serde_json::Value>)>) {
    for (name, records) in seeds {
        let count = records.len();
        if store.seed_if_absent(&name, records) {
            tracing::info!(collection = %name, records = count, "Collection seeded");
        }
    }
}

/// Build the route table for `config` and seed `store` for it.
///
/// Resources are registered before static routes, each group in config order.
/// The store is only touched once every seed file has loaded and the table
/// has built, so a failed build leaves it as it was.
pub fn build_route_table(config: &MockConfig, store: &MemoryStore) -> MockResult<RouteTable> {
    let seeds = pending_seeds(config, store)?;

    let mut table = RouteTable::with_policy(config.dispatch.duplicate_policy);
    for resource in &config.resources {
        let latency = latency_for(&config.latency, resource.latency_ms);
        resource::mount(&mut table, resource, store.clone(), latency)?;
    }
    for route in &config.routes {
        let latency = latency_for(&config.latency, route.latency_ms);
        static_route::mount(&mut table, route, latency)?;
    }
    seed_store(store, seeds);

    tracing::info!(
        routes = table.len(),
        conflicts = table.conflicts().len(),
        "Route table built"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::error::MockError;
    use crate::routing::Dispatcher;
    use serde_json::{json, Value};
    use std::time::Duration;

    const CONFIG: &str = r#"
        [latency]
        default_ms = 0

        [[resources]]
        name = "users"
        base_path = "/api/user"
        records = [{ id = 1, username = "alice" }, { id = 3, username = "carol" }]

        [[routes]]
        method = "POST"
        path = "/api/user/login"
        message = "login ok"
        data = { token = "mock-token" }

        [[routes]]
        method = "GET"
        path = "/api/user/:id"
        data = "never reached"
    "#;

    #[test]
    fn test_latency_for() {
        let defaults = LatencyConfig {
            default_ms: 200,
            jitter_ms: 50,
        };
        assert_eq!(latency_for(&defaults, None), Latency::from_millis(200, 50));
        assert_eq!(latency_for(&defaults, Some(0)), Latency::NONE);
        assert_eq!(latency_for(&defaults, Some(10)).base, Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_build_from_config() {
        let config = parse_config(CONFIG).unwrap();
        let store = MemoryStore::new();
        let table = build_route_table(&config, &store).unwrap();

        assert_eq!(table.len(), 7);
        assert_eq!(table.conflicts().len(), 1);
        assert_eq!(store.len("users"), 2);

        let dispatcher = Dispatcher::new(table);
        let env = dispatcher.dispatch("GET", "/api/user/3", Value::Null).await.unwrap();
        assert_eq!(env.data()["username"], "carol");

        let env = dispatcher
            .dispatch("POST", "/api/user/login", json!({"username": "alice"}))
            .await
            .unwrap();
        assert_eq!(env.message(), "login ok");
        assert_eq!(env.data()["token"], "mock-token");
    }

    #[test]
    fn test_reject_policy_fails_build() {
        let mut config = parse_config(CONFIG).unwrap();
        config.dispatch.duplicate_policy = crate::routing::DuplicatePolicy::Reject;
        let err = build_route_table(&config, &MemoryStore::new()).unwrap_err();
        assert!(matches!(err, MockError::DuplicateRoute { .. }));
    }

    #[test]
    fn test_reseed_keeps_existing_collection() {
        let config = parse_config(CONFIG).unwrap();
        let store = MemoryStore::new();
        store.seed("users", vec![json!({"id": 9})]);
        build_route_table(&config, &store).unwrap();
        assert_eq!(store.len("users"), 1);
    }

    #[test]
    fn test_missing_seed_file() {
        let mut config = parse_config(CONFIG).unwrap();
        config.resources[0].seed_file = Some("/definitely/missing.json".into());
        let err = build_route_table(&config, &MemoryStore::new()).unwrap_err();
        assert!(matches!(err, MockError::Seed { .. }));
    }

    #[test]
    fn test_failed_build_seeds_nothing() {
        let mut config = parse_config(CONFIG).unwrap();
        config.resources.push(ResourceConfig {
            name: "orders".into(),
            base_path: "/api/orders".into(),
            seed_file: Some("/definitely/missing.json".into()),
            records: Vec::new(),
            required_fields: Vec::new(),
            latency_ms: None,
        });
        let store = MemoryStore::new();

        let err = build_route_table(&config, &store).unwrap_err();
        assert!(matches!(err, MockError::Seed { .. }));
        assert!(!store.contains("users"));
        assert!(!store.contains("orders"));

        // A table that fails to build after the seeds load leaves them out too.
        config.resources.pop();
        config.dispatch.duplicate_policy = crate::routing::DuplicatePolicy::Reject;
        assert!(build_route_table(&config, &store).is_err());
        assert!(!store.contains("users"));

        config.dispatch.duplicate_policy = crate::routing::DuplicatePolicy::Warn;
        build_route_table(&config, &store).unwrap();
        assert_eq!(store.len("users"), 2);
    }
}
