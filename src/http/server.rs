//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router: admin routes under the prefix, mocks as fallback
//! - Wire up middleware (timeout, body limit, request ID, tracing, CORS)
//! - Turn HTTP requests into dispatcher calls
//! - Apply configuration updates by swapping route tables
//! - Serve until the shutdown signal fires
//!
//! # Design Decisions
//! - Middleware settings are fixed at startup; a reload only replaces routes,
//!   resources and dispatch options
//! - The store outlives reloads, so records edited through the mock API stay

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, Uri},
    response::Response,
    Router,
};
use serde_json::{Map, Value};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::config::MockConfig;
use crate::envelope::Envelope;
use crate::error::MockResult;
use crate::fixtures;
use crate::http::request::{request_id, request_span, UuidRequestId};
use crate::http::response::{envelope_response, error_response};
use crate::routing::Dispatcher;
use crate::store::MemoryStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub store: MemoryStore,
    pub config: Arc<ArcSwap<MockConfig>>,
}

impl AppState {
    /// Rebuild the route table from `config` and swap it in.
    ///
    /// A config that fails to build leaves the current table in place.
    pub fn apply_config(&self, config: MockConfig) -> MockResult<()> {
        let table = fixtures::build_route_table(&config, &self.store)?;
        self.dispatcher.replace_table(table);
        self.config.store(Arc::new(config));
        Ok(())
    }
}

/// HTTP server for the mock API.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Build the store and route table from `config` and wrap them in a server.
    pub fn from_config(config: MockConfig) -> MockResult<Self> {
        let store = MemoryStore::new();
        let table = fixtures::build_route_table(&config, &store)?;
        Ok(Self::new(config, Arc::new(Dispatcher::new(table)), store))
    }

    /// Create a server around an existing dispatcher and store.
    pub fn new(config: MockConfig, dispatcher: Arc<Dispatcher>, store: MemoryStore) -> Self {
        let state = AppState {
            dispatcher,
            store,
            config: Arc::new(ArcSwap::from_pointee(config.clone())),
        };
        let router = Self::build_router(&config, state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &MockConfig, state: AppState) -> Router {
        let mut router = Router::new();
        if config.admin.enabled {
            router = router.nest(&config.admin.prefix, admin::router());
        }

        let mut router = router
            .fallback(mock_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.http.max_body_bytes))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(request_span::<Body>))
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId));

        if config.http.cors {
            router = router.layer(CorsLayer::permissive());
        }
        router
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The router with state and layers applied, for serving elsewhere.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configs arriving on `updates` are applied in the background. Returns
    /// once `shutdown` fires and in-flight requests have finished.
    pub async fn run(
        self,
        listener: TcpListener,
        updates: Option<mpsc::UnboundedReceiver<MockConfig>>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.state.dispatcher.table().len(),
            "HTTP server starting"
        );

        let reloader = updates.map(|mut updates| {
            let state = self.state.clone();
            tokio::spawn(async move {
                while let Some(config) = updates.recv().await {
                    match state.apply_config(config) {
                        Ok(()) => tracing::info!("Configuration update applied"),
                        Err(e) => tracing::error!(
                            error = %e,
                            "Failed to apply configuration update, keeping current routes"
                        ),
                    }
                }
            })
        });

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        if let Some(reloader) = reloader {
            reloader.abort();
        }
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Every request the admin routes do not claim is a mock request.
async fn mock_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let url = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let mirror_status = state.config.load().dispatch.mirror_status;

    let data = match parse_body(&body) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(
                request_id = %request_id(&headers),
                method = %method,
                url = %url,
                error = %e,
                "Rejected request with invalid JSON body"
            );
            let envelope = Envelope::fail(400, format!("invalid JSON body: {}", e));
            return envelope_response(envelope, mirror_status);
        }
    };

    match state.dispatcher.dispatch(method.as_str(), url, data).await {
        Ok(envelope) => envelope_response(envelope, mirror_status),
        Err(e) => {
            tracing::error!(
                request_id = %request_id(&headers),
                method = %method,
                url = %url,
                error = %e,
                "Mock dispatch failed"
            );
            error_response(&e)
        }
    }
}

/// An empty or blank body is `{}`.
fn parse_body(body: &[u8]) -> Result<Value, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    async fn call(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, serde_json::from_slice(&bytes).unwrap())
    }

    fn ping_config() -> MockConfig {
        let mut config = MockConfig::default();
        config.routes.push(crate::config::RouteConfig {
            method: "GET".into(),
            path: "/api/ping".into(),
            code: 200,
            message: "pong".into(),
            data: Value::Null,
            latency_ms: Some(0),
        });
        config
    }

    #[tokio::test]
    async fn test_router_dispatches_and_sets_request_id() {
        let server = HttpServer::from_config(ping_config()).unwrap();

        let request = Request::get("/api/ping?a=1").body(Body::empty()).unwrap();
        let (status, headers, body) = call(server.router(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"code": 200, "message": "pong", "data": null}));
        assert!(headers.contains_key("x-request-id"));

        let request = Request::get("/api/ping")
            .header("x-request-id", "client-id")
            .body(Body::empty())
            .unwrap();
        let (_, headers, _) = call(server.router(), request).await;
        assert_eq!(headers["x-request-id"], "client-id");
    }

    #[tokio::test]
    async fn test_router_admin_prefix() {
        let mut config = ping_config();
        config.admin.prefix = "/_admin".into();
        let server = HttpServer::from_config(config.clone()).unwrap();

        let request = Request::get("/_admin/status").body(Body::empty()).unwrap();
        let (status, _, body) = call(server.router(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["routes"], 1);

        // With admin disabled the prefix is just another unmatched mock path.
        config.admin.enabled = false;
        let server = HttpServer::from_config(config).unwrap();
        let request = Request::get("/_admin/status").body(Body::empty()).unwrap();
        let (_, _, body) = call(server.router(), request).await;
        assert_eq!(body["code"], 404);
    }

    #[tokio::test]
    async fn test_router_body_limit() {
        let mut config = ping_config();
        config.http.max_body_bytes = 16;
        let server = HttpServer::from_config(config).unwrap();

        let request = Request::post("/api/anything")
            .header("content-length", "64")
            .body(Body::from(vec![b' '; 64]))
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(b"").unwrap(), json!({}));
        assert_eq!(parse_body(b"  \n").unwrap(), json!({}));
        assert_eq!(parse_body(br#"{"a": 1}"#).unwrap(), json!({"a": 1}));
        assert_eq!(parse_body(b"[1,2]").unwrap(), json!([1, 2]));
        assert!(parse_body(b"{not json").is_err());
    }

    #[tokio::test]
    async fn test_apply_config_swaps_table() {
        let server = HttpServer::from_config(MockConfig::default()).unwrap();
        assert!(server.state().dispatcher.table().is_empty());

        let mut config = MockConfig::default();
        config.dispatch.mirror_status = true;
        config.routes.push(crate::config::RouteConfig {
            method: "GET".into(),
            path: "/api/ping".into(),
            code: 200,
            message: "pong".into(),
            data: Value::Null,
            latency_ms: Some(0),
        });
        server.state().apply_config(config).unwrap();

        assert_eq!(server.state().dispatcher.table().len(), 1);
        assert!(server.state().config.load().dispatch.mirror_status);
    }

    #[tokio::test]
    async fn test_apply_config_keeps_table_on_error() {
        let mut config = MockConfig::default();
        config.routes.push(crate::config::RouteConfig {
            method: "GET".into(),
            path: "/api/ping".into(),
            code: 200,
            message: "pong".into(),
            data: Value::Null,
            latency_ms: Some(0),
        });
        let server = HttpServer::from_config(config.clone()).unwrap();

        config.routes[0].path = "no-slash".into();
        assert!(server.state().apply_config(config).is_err());
        assert_eq!(server.state().dispatcher.table().len(), 1);
    }

    #[tokio::test]
    async fn test_apply_config_keeps_store_on_error() {
        let server = HttpServer::from_config(ping_config()).unwrap();

        let mut config = ping_config();
        for (name, seed_file) in [("users", None), ("orders", Some("/definitely/missing.json"))] {
            config.resources.push(crate::config::ResourceConfig {
                name: name.into(),
                base_path: format!("/api/{}", name),
                seed_file: seed_file.map(Into::into),
                records: vec![json!({"id": 1})],
                required_fields: Vec::new(),
                latency_ms: Some(0),
            });
        }

        assert!(server.state().apply_config(config).is_err());
        assert!(!server.state().store.contains("users"));
        assert_eq!(server.state().dispatcher.table().len(), 1);
    }
}
