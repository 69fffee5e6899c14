//! Health and service-info endpoints
//!
//! - `/health`, `/healthz` - liveness plus MongoDB connectivity
//! - `/version` - build identification for deployment verification
//! - `/api` - service index listing the available resources

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::server::AppState;

/// Health response for load balancers and the dashboard
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall health status (true if service is running)
    pub healthy: bool,
    /// Service version
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    /// Node identifier
    pub node_id: String,
    /// Database connectivity
    pub database: DatabaseHealth,
    /// Current timestamp
    pub timestamp: String,
}

/// Database connectivity details
#[derive(Serialize)]
pub struct DatabaseHealth {
    /// Whether MongoDB answered a ping
    pub connected: bool,
    /// Database name in use
    pub name: String,
}

#[derive(Serialize)]
struct VersionResponse {
    version: &'static str,
    commit: &'static str,
    build_time: &'static str,
    service: &'static str,
}

/// Handle liveness probe (/health, /healthz)
pub async fn health_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let connected = state.mongo.ping().await;

    let response = HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        node_id: state.args.node_id.to_string(),
        database: DatabaseHealth {
            connected,
            name: state.mongo.db_name().to_string(),
        },
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    let body = serde_json::to_string(&response)
        .unwrap_or_else(|_| r#"{"healthy":true}"#.to_string());

    // Liveness probe: always return 200 if service is running
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

/// Handle version info request (/version)
pub fn version_info() -> Response<Full<Bytes>> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: "parchment",
    };

    let body = serde_json::to_string(&response)
        .unwrap_or_else(|_| r#"{"version":"unknown"}"#.to_string());

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

/// Handle API index request (GET /api)
pub fn api_index() -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "success": true,
        "message": "Contract Management API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "blueprints": "/api/blueprints",
            "contracts": "/api/contracts",
        },
    });

    super::json_response(StatusCode::OK, &body)
}
