//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling, one task per
//! connection, and a plain `(Method, path)` match for routing.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::HeaderValue;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{body::Incoming, Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Args;
use crate::db::MongoClient;
use crate::routes;
use crate::types::ParchmentError;

type FullBody = Full<Bytes>;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub mongo: MongoClient,
    /// Server start time, reported as uptime by /health
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, mongo: MongoClient) -> Self {
        Self {
            args,
            mongo,
            started_at: Instant::now(),
        }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), ParchmentError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Parchment listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<FullBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let mut response = match (method, path.as_str()) {
        // Liveness probe
        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            routes::health_check(Arc::clone(&state)).await
        }

        // Version info for deployment verification
        (Method::GET, "/version") => routes::version_info(),

        // Service index
        (Method::GET, "/api") | (Method::GET, "/api/") => routes::api_index(),

        // CORS preflight
        (Method::OPTIONS, _) => preflight_response(&state.args.cors_origin),

        // Blueprint CRUD
        (_, p) if p.starts_with("/api/blueprints") => {
            routes::handle_blueprint_request(req, Arc::clone(&state), &path).await
        }

        // Contract CRUD + lifecycle
        (_, p) if p.starts_with("/api/contracts") => {
            routes::handle_contract_request(req, Arc::clone(&state), &path).await
        }

        // Not found
        _ => not_found_response(&path),
    };

    // Every response carries the CORS origin so the browser dashboard can
    // talk to the API directly.
    if let Ok(origin) = HeaderValue::from_str(&state.args.cors_origin) {
        response
            .headers_mut()
            .insert("Access-Control-Allow-Origin", origin);
    }

    Ok(response)
}

fn preflight_response(origin: &str) -> Response<FullBody> {
    let origin = HeaderValue::from_str(origin).unwrap_or(HeaderValue::from_static("*"));
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", origin)
        .header(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, PATCH, DELETE, OPTIONS",
        )
        .header("Access-Control-Allow-Headers", "Content-Type")
        .body(Full::new(Bytes::new()))
        .unwrap()
}

fn not_found_response(path: &str) -> Response<FullBody> {
    let body = serde_json::json!({
        "success": false,
        "message": "Route not found",
        "path": path,
    });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_shape() {
        let resp = not_found_response("/api/unknown");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_preflight_lists_patch() {
        let resp = preflight_response("*");
        let methods = resp
            .headers()
            .get("Access-Control-Allow-Methods")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(methods.contains("PATCH"));
    }
}
