use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::envelope::Envelope;
use crate::http::server::AppState;
use crate::routing::{DuplicatePolicy, RouteConflict};

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub routes: usize,
    pub conflicts: usize,
    pub collections: Vec<CollectionStatus>,
}

#[derive(Debug, Serialize)]
pub struct CollectionStatus {
    pub name: String,
    pub records: usize,
}

#[derive(Debug, Serialize)]
pub struct RouteStatus {
    pub index: usize,
    pub method: String,
    pub pattern: String,
    pub params: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RouteReport {
    pub policy: DuplicatePolicy,
    pub routes: Vec<RouteStatus>,
    pub conflicts: Vec<RouteConflict>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let table = state.dispatcher.table();
    let collections = state
        .store
        .collections()
        .into_iter()
        .map(|name| CollectionStatus {
            records: state.store.len(&name),
            name,
        })
        .collect();

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        routes: table.len(),
        conflicts: table.conflicts().len(),
        collections,
    })
}

pub async fn get_routes(State(state): State<AppState>) -> Json<RouteReport> {
    let table = state.dispatcher.table();
    let routes = table
        .entries()
        .iter()
        .enumerate()
        .map(|(index, entry)| RouteStatus {
            index,
            method: entry.method().to_string(),
            pattern: entry.pattern().as_str().to_string(),
            params: entry.pattern().param_names().map(str::to_string).collect(),
        })
        .collect();

    Json(RouteReport {
        policy: table.policy(),
        routes,
        conflicts: table.conflicts().to_vec(),
    })
}

pub async fn get_collection(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> (StatusCode, Json<Envelope>) {
    if !state.store.contains(&name) {
        return (
            StatusCode::NOT_FOUND,
            Json(Envelope::fail(404, format!("collection {} not found", name))),
        );
    }
    (StatusCode::OK, Json(Envelope::ok(state.store.list(&name))))
}
