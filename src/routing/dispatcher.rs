//! Mock request entry point.
//!
//! Resolves `method + url` against the current route table, merges query and
//! path parameters, and awaits the matched handler. The only condition handled
//! locally is "no route matched", which becomes a 404 envelope.

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::envelope::Envelope;
use crate::error::MockResult;
use crate::observability::metrics;
use crate::routing::matcher::path_portion;
use crate::routing::query::parse_query;
use crate::routing::router::RouteTable;
use crate::routing::Method;

/// Input accepted at the dispatcher boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchRequest {
    #[serde(default = "default_method")]
    pub method: String,
    pub url: String,
    #[serde(default = "empty_object")]
    pub data: Value,
}

fn default_method() -> String {
    Method::Get.to_string()
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Routes mock requests to handlers.
///
/// The table sits behind an [`ArcSwap`]: every dispatch scans one snapshot,
/// and a reload swaps in a complete new table without touching in-flight calls.
pub struct Dispatcher {
    table: ArcSwap<RouteTable>,
}

impl Dispatcher {
    pub fn new(table: RouteTable) -> Self {
        metrics::record_route_table_size(table.len());
        Self {
            table: ArcSwap::from_pointee(table),
        }
    }

    /// Current table snapshot.
    pub fn table(&self) -> Arc<RouteTable> {
        self.table.load_full()
    }

    /// Replace the whole table. Dispatches already scanning keep the old one.
    pub fn replace_table(&self, table: RouteTable) {
        tracing::info!(routes = table.len(), "Route table replaced");
        metrics::record_route_table_size(table.len());
        self.table.store(Arc::new(table));
    }

    /// Dispatch a boundary request.
    pub async fn handle(&self, request: DispatchRequest) -> MockResult<Envelope> {
        self.dispatch(&request.method, &request.url, request.data).await
    }

    /// Resolve and run one mock request.
    ///
    /// Resolves to an envelope for both matched and unmatched requests.
    /// `Err` is reserved for malformed input and handler defects.
    pub async fn dispatch(&self, method: &str, url: &str, body: Value) -> MockResult<Envelope> {
        let start = Instant::now();
        let method_name = method.to_uppercase();
        let query = parse_query(url)?;

        // Synchronous scan: nothing below suspends until the handler runs.
        let resolved = method_name.parse::<Method>().ok().and_then(|method| {
            let table = self.table.load();
            let found = table.find(method, path_portion(url)).map(|(entry, path_params)| {
                (
                    method,
                    entry.pattern().as_str().to_string(),
                    entry.handler().clone(),
                    query.merge(path_params),
                )
            });
            found
        });

        let Some((method, route, handler, params)) = resolved else {
            tracing::warn!(method = %method_name, url = %url, "No mock route matched");
            metrics::record_dispatch(&method_name, 404, false, start);
            return Ok(Envelope::route_not_found(&method_name, url));
        };

        let body = if method.is_get_class() { empty_object() } else { body };

        tracing::info!(method = %method, url = %url, route = %route, "Mock route matched");
        let envelope = handler.call(params, body).await?;

        tracing::debug!(
            method = %method,
            url = %url,
            code = envelope.code(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Mock response produced"
        );
        metrics::record_dispatch(method.as_str(), envelope.code(), true, start);
        Ok(envelope)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(RouteTable::new())
    }
}
