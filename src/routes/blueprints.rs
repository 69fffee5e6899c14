//! Blueprint CRUD endpoints
//!
//! ## Endpoints
//!
//! - `GET /api/blueprints` - List blueprints, newest first
//! - `GET /api/blueprints/{id}` - Get a single blueprint
//! - `POST /api/blueprints` - Create a blueprint
//! - `PUT /api/blueprints/{id}` - Replace name and field definitions wholesale
//! - `DELETE /api/blueprints/{id}` - Delete a blueprint
//!
//! Deleting a blueprint that contracts still reference is allowed: contracts
//! own their copied fields and denormalized blueprint name, so nothing
//! dangles.

use bson::doc;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::db::schemas::{BlueprintDoc, FieldDef, BLUEPRINT_COLLECTION};
use crate::db::MongoCollection;
use crate::routes::{data_response, error_response, message_response};
use crate::server::AppState;
use crate::validate::{parse_object_id, validate_fields, validate_name};

type FullBody = Full<Bytes>;

#[derive(Debug, Deserialize)]
struct BlueprintPayload {
    name: String,
    fields: Vec<FieldDef>,
}

/// Dispatch `/api/blueprints*` requests
pub async fn handle_blueprint_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    path: &str,
) -> Response<FullBody> {
    let method = req.method().clone();
    let subpath = path.strip_prefix("/api/blueprints").unwrap_or("");

    match (method, subpath) {
        (Method::GET, "") | (Method::GET, "/") => handle_list(state).await,

        (Method::GET, p) => {
            let id = p.trim_start_matches('/');
            handle_get(state, id).await
        }

        (Method::POST, "") | (Method::POST, "/") => handle_create(req, state).await,

        (Method::PUT, p) if p.starts_with('/') => {
            let id = p.trim_start_matches('/').to_string();
            handle_update(req, state, &id).await
        }

        (Method::DELETE, p) if p.starts_with('/') => {
            let id = p.trim_start_matches('/');
            handle_delete(state, id).await
        }

        _ => error_response(StatusCode::NOT_FOUND, "Route not found"),
    }
}

async fn handle_list(state: Arc<AppState>) -> Response<FullBody> {
    let collection = match blueprints(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match collection.find_many(doc! {}).await {
        Ok(blueprints) => data_response(StatusCode::OK, None, &blueprints),
        Err(e) => {
            error!("Failed to list blueprints: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

async fn handle_get(state: Arc<AppState>, id: &str) -> Response<FullBody> {
    let object_id = match parse_object_id(id) {
        Ok(oid) => oid,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let collection = match blueprints(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match collection.find_by_id(object_id).await {
        Ok(Some(blueprint)) => data_response(StatusCode::OK, None, &blueprint),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Blueprint not found"),
        Err(e) => {
            error!("Failed to fetch blueprint {}: {}", id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

async fn handle_create(req: Request<Incoming>, state: Arc<AppState>) -> Response<FullBody> {
    let payload = match read_payload(req).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let name = match validate_name("Blueprint name", &payload.name) {
        Ok(n) => n,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };
    if let Err(e) = validate_fields(&payload.fields) {
        return error_response(StatusCode::BAD_REQUEST, &e.to_string());
    }

    let collection = match blueprints(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let mut blueprint = BlueprintDoc::new(name, payload.fields);
    match collection.insert_one(blueprint.clone()).await {
        Ok(id) => {
            blueprint._id = Some(id);
            info!("Created blueprint {} ('{}')", id, blueprint.name);
            data_response(
                StatusCode::CREATED,
                Some("Blueprint created successfully"),
                &blueprint,
            )
        }
        Err(e) => {
            error!("Failed to create blueprint: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

async fn handle_update(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<FullBody> {
    let object_id = match parse_object_id(id) {
        Ok(oid) => oid,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let payload = match read_payload(req).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let name = match validate_name("Blueprint name", &payload.name) {
        Ok(n) => n,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };
    if let Err(e) = validate_fields(&payload.fields) {
        return error_response(StatusCode::BAD_REQUEST, &e.to_string());
    }

    let collection = match blueprints(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let mut blueprint = match collection.find_by_id(object_id).await {
        Ok(Some(b)) => b,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "Blueprint not found"),
        Err(e) => {
            error!("Failed to fetch blueprint {}: {}", id, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    // Field definitions are replaced wholesale; existing contracts keep
    // their own copies and are unaffected.
    blueprint.name = name;
    blueprint.fields = payload.fields;

    match collection.replace_one(doc! { "_id": object_id }, blueprint.clone()).await {
        Ok(result) if result.matched_count == 0 => {
            error_response(StatusCode::NOT_FOUND, "Blueprint not found")
        }
        Ok(_) => data_response(
            StatusCode::OK,
            Some("Blueprint updated successfully"),
            &blueprint,
        ),
        Err(e) => {
            error!("Failed to update blueprint {}: {}", id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

async fn handle_delete(state: Arc<AppState>, id: &str) -> Response<FullBody> {
    let object_id = match parse_object_id(id) {
        Ok(oid) => oid,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let collection = match blueprints(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match collection.delete_one(doc! { "_id": object_id }).await {
        Ok(result) if result.deleted_count == 0 => {
            error_response(StatusCode::NOT_FOUND, "Blueprint not found")
        }
        Ok(_) => {
            info!("Deleted blueprint {}", id);
            message_response(StatusCode::OK, "Blueprint deleted successfully")
        }
        Err(e) => {
            error!("Failed to delete blueprint {}: {}", id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn blueprints(
    state: &AppState,
) -> Result<MongoCollection<BlueprintDoc>, Response<FullBody>> {
    state
        .mongo
        .collection::<BlueprintDoc>(BLUEPRINT_COLLECTION)
        .await
        .map_err(|e| {
            error!("Blueprint collection unavailable: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        })
}

async fn read_payload(req: Request<Incoming>) -> Result<BlueprintPayload, Response<FullBody>> {
    let body_bytes = match req.into_body().collect().await {
        Ok(b) => b.to_bytes(),
        Err(_) => return Err(error_response(StatusCode::BAD_REQUEST, "Invalid body")),
    };

    serde_json::from_slice(&body_bytes)
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, &format!("Validation error: {e}")))
}

