//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use mock_router::config::{MockConfig, RouteConfig};
use mock_router::http::{AppState, HttpServer};
use mock_router::lifecycle::Shutdown;
use mock_router::routing::{Method, RouteTable};
use mock_router::{Envelope, MockResult, Params};

/// A mock server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    pub shutdown: Shutdown,
    pub updates: mpsc::UnboundedSender<MockConfig>,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server for `config` on 127.0.0.1:0.
pub async fn spawn_server(mut config: MockConfig) -> TestServer {
    config.listener.bind_address = "127.0.0.1:0".into();
    let server = HttpServer::from_config(config).unwrap();
    let state = server.state().clone();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let (updates, update_rx) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, Some(update_rx), server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();
    TestServer {
        addr,
        state,
        shutdown,
        updates,
        client,
    }
}

/// A config with no latency, so tests run at full speed.
pub fn instant_config() -> MockConfig {
    let mut config = MockConfig::default();
    config.latency.default_ms = 0;
    config
}

pub fn fixed_route(method: &str, path: &str, data: Value) -> RouteConfig {
    RouteConfig {
        method: method.into(),
        path: path.into(),
        code: 200,
        message: "success".into(),
        data,
        latency_ms: None,
    }
}

/// Seed users: alice (1), bob (2), carol (3).
pub fn users() -> Vec<Value> {
    vec![
        json!({"id": 1, "username": "alice", "role": "admin"}),
        json!({"id": 2, "username": "bob", "role": "user"}),
        json!({"id": 3, "username": "carol", "role": "user"}),
    ]
}

/// The user-center table a miniprogram front end mocks: login, profile,
/// detail, update.
pub fn user_center_table() -> RouteTable {
    let mut table = RouteTable::new();
    table
        .register(Method::Post, "/api/user/login", login)
        .unwrap()
        .register(Method::Get, "/api/user/profile", profile)
        .unwrap()
        .register(Method::Get, "/api/user/:id", user_detail)
        .unwrap()
        .register(Method::Put, "/api/user/:id", update_user)
        .unwrap();
    table
}

async fn login(_params: Params, body: Value) -> MockResult<Envelope> {
    let username = body["username"].as_str().unwrap_or_default();
    if username.is_empty() {
        return Ok(Envelope::fail(400, "username is required"));
    }
    Ok(Envelope::ok_with_message(
        json!({"token": format!("mock-token-{}", username)}),
        "login success",
    ))
}

async fn profile(_params: Params, _body: Value) -> MockResult<Envelope> {
    Ok(Envelope::ok(json!({"id": 1, "username": "alice"})))
}

async fn user_detail(params: Params, _body: Value) -> MockResult<Envelope> {
    let id: u64 = match params.parse("id") {
        Some(id) => id,
        None => return Ok(Envelope::fail(400, "id must be numeric")),
    };
    match users().into_iter().find(|u| u["id"] == json!(id)) {
        Some(user) => Ok(Envelope::ok(json!({"user": user, "params": params}))),
        None => Ok(Envelope::fail(404, "user not found")),
    }
}

async fn update_user(params: Params, body: Value) -> MockResult<Envelope> {
    Ok(Envelope::ok(json!({"id": params.get("id"), "changes": body})))
}
