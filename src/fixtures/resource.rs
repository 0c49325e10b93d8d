//! Generic CRUD handlers over one store collection.
//!
//! Mounted at a base path, a resource answers:
//!
//! | Route                  | Behavior                                         |
//! |------------------------|--------------------------------------------------|
//! | `GET base`             | filter by record fields, paginate (`page`, `pageSize`) |
//! | `GET base/:id`         | one record, 404 when absent                      |
//! | `POST base`            | create; 400 on non-object body or missing field  |
//! | `PUT base/:id`         | shallow merge; 404 when absent                   |
//! | `DELETE base/:id`      | remove; 404 when absent                          |

use std::future::ready;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::ResourceConfig;
use crate::envelope::Envelope;
use crate::error::MockResult;
use crate::handler::{with_latency, Latency};
use crate::routing::{Method, Params, RouteTable};
use crate::store::MemoryStore;

const DEFAULT_PAGE_SIZE: usize = 10;

/// Method and pattern of every route a resource registers, in order.
pub fn resource_routes(base_path: &str) -> [(Method, String); 5] {
    let base = base_path.to_string();
    let item = format!("{}/:id", base_path.trim_end_matches('/'));
    [
        (Method::Get, base.clone()),
        (Method::Get, item.clone()),
        (Method::Post, base),
        (Method::Put, item.clone()),
        (Method::Delete, item),
    ]
}

struct Resource {
    name: String,
    required_fields: Vec<String>,
    store: MemoryStore,
}

/// Register the five CRUD routes of `config` on `table`.
pub fn mount(
    table: &mut RouteTable,
    config: &ResourceConfig,
    store: MemoryStore,
    latency: Latency,
) -> MockResult<()> {
    let resource = Arc::new(Resource {
        name: config.name.clone(),
        required_fields: config.required_fields.clone(),
        store,
    });
    let [list, detail, create, update, delete] = resource_routes(&config.base_path);

    let r = resource.clone();
    table.register(
        list.0,
        &list.1,
        with_latency(move |params: Params, _body: Value| ready(r.list(&params)), latency),
    )?;
    let r = resource.clone();
    table.register(
        detail.0,
        &detail.1,
        with_latency(move |params: Params, _body: Value| ready(r.detail(&params)), latency),
    )?;
    let r = resource.clone();
    table.register(
        create.0,
        &create.1,
        with_latency(move |_params: Params, body: Value| ready(r.create(body)), latency),
    )?;
    let r = resource.clone();
    table.register(
        update.0,
        &update.1,
        with_latency(move |params: Params, body: Value| ready(r.update(&params, body)), latency),
    )?;
    let r = resource;
    table.register(
        delete.0,
        &delete.1,
        with_latency(move |params: Params, _body: Value| ready(r.delete(&params)), latency),
    )?;

    tracing::info!(
        collection = %config.name,
        base_path = %config.base_path,
        "Resource routes mounted"
    );
    Ok(())
}

impl Resource {
    fn list(&self, params: &Params) -> MockResult<Envelope> {
        let page = params.parse::<usize>("page").filter(|p| *p > 0).unwrap_or(1);
        let page_size = params
            .parse::<usize>("pageSize")
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let records = self.store.list(&self.name);

        // Keys no record carries (cache busters like `_t`) do not filter.
        let filters: Vec<(&str, &str)> = params
            .iter()
            .filter(|(key, value)| {
                !matches!(*key, "page" | "pageSize")
                    && !value.is_empty()
                    && *value != "all"
                    && records.iter().any(|record| record.get(*key).is_some())
            })
            .collect();

        let matching: Vec<Value> = records
            .into_iter()
            .filter(|record| {
                filters
                    .iter()
                    .all(|(field, expected)| field_string(record, field).as_deref() == Some(*expected))
            })
            .collect();

        let total = matching.len();
        let list: Vec<Value> = matching
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();

        Ok(Envelope::ok(json!({
            "list": list,
            "total": total,
            "page": page,
            "pageSize": page_size,
        })))
    }

    fn detail(&self, params: &Params) -> MockResult<Envelope> {
        let id = params.get("id").unwrap_or_default();
        Ok(match self.store.find(&self.name, id) {
            Some(record) => Envelope::ok(record),
            None => self.not_found(id),
        })
    }

    fn create(&self, body: Value) -> MockResult<Envelope> {
        let Value::Object(fields) = body else {
            return Ok(Envelope::fail(400, "request body must be a JSON object"));
        };

        let missing = self.required_fields.iter().find(|field| match fields.get(field.as_str()) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        });
        if let Some(field) = missing {
            return Ok(Envelope::fail(400, format!("{} is required", field)));
        }

        let record = self.store.insert(&self.name, fields)?;
        tracing::debug!(collection = %self.name, id = %record["id"], "Record created");
        Ok(Envelope::ok_with_message(record, "created"))
    }

    fn update(&self, params: &Params, body: Value) -> MockResult<Envelope> {
        let id = params.get("id").unwrap_or_default();
        let Value::Object(patch) = body else {
            return Ok(Envelope::fail(400, "request body must be a JSON object"));
        };
        Ok(match self.store.update(&self.name, id, &patch) {
            Some(record) => Envelope::ok_with_message(record, "updated"),
            None => self.not_found(id),
        })
    }

    fn delete(&self, params: &Params) -> MockResult<Envelope> {
        let id = params.get("id").unwrap_or_default();
        Ok(match self.store.remove(&self.name, id) {
            Some(record) => Envelope::ok_with_message(record, "deleted"),
            None => self.not_found(id),
        })
    }

    fn not_found(&self, id: &str) -> Envelope {
        Envelope::fail(404, format!("{} {} not found", self.name, id))
    }
}

fn field_string(record: &Value, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Dispatcher;

    fn config() -> ResourceConfig {
        ResourceConfig {
            name: "resources".into(),
            base_path: "/api/resources".into(),
            seed_file: None,
            records: Vec::new(),
            required_fields: vec!["company".into()],
            latency_ms: None,
        }
    }

    fn dispatcher() -> (Dispatcher, MemoryStore) {
        let store = MemoryStore::new();
        store.seed(
            "resources",
            (1..=25)
                .map(|i| {
                    let category = if i % 2 == 0 { "even" } else { "odd" };
                    json!({ "id": i, "company": format!("co-{}", i), "category": category })
                })
                .collect(),
        );
        let mut table = RouteTable::new();
        mount(&mut table, &config(), store.clone(), Latency::NONE).unwrap();
        (Dispatcher::new(table), store)
    }

    #[test]
    fn test_resource_routes() {
        let routes = resource_routes("/api/user/");
        assert_eq!(routes[0], (Method::Get, "/api/user/".to_string()));
        assert_eq!(routes[1], (Method::Get, "/api/user/:id".to_string()));
        assert_eq!(routes[4], (Method::Delete, "/api/user/:id".to_string()));
    }

    #[tokio::test]
    async fn test_list_paginates_and_filters() {
        let (dispatcher, _) = dispatcher();

        let env = dispatcher.dispatch("GET", "/api/resources", Value::Null).await.unwrap();
        assert_eq!(env.data()["total"], 25);
        assert_eq!(env.data()["page"], 1);
        assert_eq!(env.data()["pageSize"], 10);
        assert_eq!(env.data()["list"].as_array().unwrap().len(), 10);

        let env = dispatcher
            .dispatch("GET", "/api/resources?page=3&pageSize=10", Value::Null)
            .await
            .unwrap();
        assert_eq!(env.data()["list"].as_array().unwrap().len(), 5);
        assert_eq!(env.data()["list"][0]["id"], 21);

        let env = dispatcher
            .dispatch("GET", "/api/resources?category=even&pageSize=100", Value::Null)
            .await
            .unwrap();
        assert_eq!(env.data()["total"], 12);

        let env = dispatcher
            .dispatch("GET", "/api/resources?category=all&page=0", Value::Null)
            .await
            .unwrap();
        assert_eq!(env.data()["total"], 25);
        assert_eq!(env.data()["page"], 1);
    }

    #[tokio::test]
    async fn test_list_ignores_unknown_query_keys() {
        let (dispatcher, _) = dispatcher();

        let env = dispatcher
            .dispatch("GET", "/api/resources?_t=1712345678901&pageSize=100", Value::Null)
            .await
            .unwrap();
        assert_eq!(env.data()["total"], 25);

        let env = dispatcher
            .dispatch("GET", "/api/resources?_t=1&category=odd&pageSize=100", Value::Null)
            .await
            .unwrap();
        assert_eq!(env.data()["total"], 13);
    }

    #[tokio::test]
    async fn test_create_fails_when_ids_exhausted() {
        let store = MemoryStore::new();
        store.seed("resources", vec![json!({"id": i64::MAX, "company": "last"})]);
        let mut table = RouteTable::new();
        mount(&mut table, &config(), store.clone(), Latency::NONE).unwrap();
        let dispatcher = Dispatcher::new(table);

        let err = dispatcher
            .dispatch("POST", "/api/resources", json!({"company": "acme"}))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::MockError::Handler(_)));
        assert_eq!(store.len("resources"), 1);
    }

    #[tokio::test]
    async fn test_detail() {
        let (dispatcher, _) = dispatcher();
        let env = dispatcher.dispatch("GET", "/api/resources/7", Value::Null).await.unwrap();
        assert_eq!(env.data()["company"], "co-7");

        let env = dispatcher.dispatch("GET", "/api/resources/99", Value::Null).await.unwrap();
        assert_eq!(env, Envelope::fail(404, "resources 99 not found"));
    }

    #[tokio::test]
    async fn test_create_validates() {
        let (dispatcher, store) = dispatcher();

        let env = dispatcher
            .dispatch("POST", "/api/resources", json!({"company": "  "}))
            .await
            .unwrap();
        assert_eq!(env, Envelope::fail(400, "company is required"));

        let env = dispatcher.dispatch("POST", "/api/resources", json!([1])).await.unwrap();
        assert_eq!(env.code(), 400);

        let env = dispatcher
            .dispatch("POST", "/api/resources", json!({"company": "acme"}))
            .await
            .unwrap();
        assert_eq!(env.message(), "created");
        assert_eq!(env.data()["id"], 26);
        assert_eq!(store.len("resources"), 26);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (dispatcher, store) = dispatcher();

        let env = dispatcher
            .dispatch("PUT", "/api/resources/2", json!({"company": "renamed"}))
            .await
            .unwrap();
        assert_eq!(env.message(), "updated");
        assert_eq!(store.find("resources", "2").unwrap()["company"], "renamed");

        let env = dispatcher.dispatch("PUT", "/api/resources/404", json!({})).await.unwrap();
        assert_eq!(env.code(), 404);

        let env = dispatcher.dispatch("DELETE", "/api/resources/2", Value::Null).await.unwrap();
        assert_eq!(env.message(), "deleted");
        let env = dispatcher.dispatch("DELETE", "/api/resources/2", Value::Null).await.unwrap();
        assert_eq!(env.code(), 404);
    }
}
