//! Contract CRUD and lifecycle endpoints
//!
//! ## Endpoints
//!
//! - `GET /api/contracts?status=<state>&filter=<active|pending|signed>` - List
//! - `GET /api/contracts/{id}` - Get a single contract
//! - `POST /api/contracts` - Materialize a contract from a blueprint
//! - `PUT /api/contracts/{id}` - Replace field values (editable states only)
//! - `PATCH /api/contracts/{id}/state` - Advance the lifecycle state
//! - `DELETE /api/contracts/{id}` - Delete a contract (any state)
//!
//! Transition and editability failures are expected outcomes: they map to
//! 400/403 with the offending states in the message and never mutate the
//! stored record.

use bson::doc;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info};

use crate::db::schemas::{
    BlueprintDoc, ContractDoc, ContractField, BLUEPRINT_COLLECTION, CONTRACT_COLLECTION,
};
use crate::db::MongoCollection;
use crate::lifecycle::{ContractFilter, ContractState};
use crate::routes::{data_response, error_response, message_response};
use crate::server::AppState;
use crate::validate::{parse_object_id, validate_name};

type FullBody = Full<Bytes>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateContractRequest {
    name: String,
    blueprint_id: String,
}

#[derive(Debug, Deserialize)]
struct UpdateContractRequest {
    fields: Option<Vec<ContractField>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransitionRequest {
    new_state: String,
}

/// Dispatch `/api/contracts*` requests
pub async fn handle_contract_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    path: &str,
) -> Response<FullBody> {
    let method = req.method().clone();
    let subpath = path.strip_prefix("/api/contracts").unwrap_or("");

    match (method, subpath) {
        (Method::GET, "") | (Method::GET, "/") => handle_list(req, state).await,

        (Method::GET, p) => {
            let id = p.trim_start_matches('/');
            handle_get(state, id).await
        }

        (Method::POST, "") | (Method::POST, "/") => handle_create(req, state).await,

        (Method::PUT, p) if p.starts_with('/') => {
            let id = p.trim_start_matches('/').to_string();
            handle_update_fields(req, state, &id).await
        }

        (Method::PATCH, p) if p.ends_with("/state") => {
            let id = p
                .strip_prefix('/')
                .and_then(|s| s.strip_suffix("/state"))
                .unwrap_or("")
                .to_string();
            handle_transition(req, state, &id).await
        }

        (Method::DELETE, p) if p.starts_with('/') => {
            let id = p.trim_start_matches('/');
            handle_delete(state, id).await
        }

        _ => error_response(StatusCode::NOT_FOUND, "Route not found"),
    }
}

/// List contracts with optional `status` (exact state) and `filter`
/// (active/pending/signed grouping) query parameters. `filter` wins when both
/// are present, matching the original API.
async fn handle_list(req: Request<Incoming>, state: Arc<AppState>) -> Response<FullBody> {
    let query = req.uri().query().unwrap_or("");
    let status = query_param(query, "status");
    let filter = query_param(query, "filter");

    let mut db_filter = doc! {};

    if let Some(status) = status {
        match ContractState::from_str(&status) {
            Ok(s) => {
                db_filter = doc! { "state": s.as_str() };
            }
            Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
        }
    }

    if let Some(filter_name) = filter {
        match ContractFilter::from_str(&filter_name) {
            Ok(group) => {
                let states: Vec<&str> = group.states().iter().map(|s| s.as_str()).collect();
                db_filter = doc! { "state": { "$in": states } };
            }
            Err(()) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    &format!("unknown contract filter '{filter_name}'"),
                )
            }
        }
    }

    let collection = match contracts(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match collection.find_many(db_filter).await {
        Ok(contracts) => data_response(StatusCode::OK, None, &contracts),
        Err(e) => {
            error!("Failed to list contracts: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

async fn handle_get(state: Arc<AppState>, id: &str) -> Response<FullBody> {
    let object_id = match parse_object_id(id) {
        Ok(oid) => oid,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let collection = match contracts(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match collection.find_by_id(object_id).await {
        Ok(Some(contract)) => data_response(StatusCode::OK, None, &contract),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Contract not found"),
        Err(e) => {
            error!("Failed to fetch contract {}: {}", id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Materialize a new contract from an existing blueprint
async fn handle_create(req: Request<Incoming>, state: Arc<AppState>) -> Response<FullBody> {
    let request: CreateContractRequest = match read_json(req).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let name = match validate_name("Contract name", &request.name) {
        Ok(n) => n,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };
    let blueprint_id = match parse_object_id(&request.blueprint_id) {
        Ok(oid) => oid,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let blueprint_collection = match blueprints(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let blueprint: BlueprintDoc = match blueprint_collection.find_by_id(blueprint_id).await {
        Ok(Some(b)) => b,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "Blueprint not found"),
        Err(e) => {
            error!("Failed to resolve blueprint {}: {}", blueprint_id, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    let collection = match contracts(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let mut contract = ContractDoc::from_blueprint(&blueprint, name);
    match collection.insert_one(contract.clone()).await {
        Ok(id) => {
            contract._id = Some(id);
            info!(
                "Created contract {} ('{}') from blueprint {}",
                id, contract.name, blueprint_id
            );
            data_response(
                StatusCode::CREATED,
                Some("Contract created successfully"),
                &contract,
            )
        }
        Err(e) => {
            error!("Failed to create contract: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Replace a contract's field values. Rejected with 403 while the contract is
/// locked or revoked.
async fn handle_update_fields(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<FullBody> {
    let object_id = match parse_object_id(id) {
        Ok(oid) => oid,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let request: UpdateContractRequest = match read_json(req).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let collection = match contracts(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let mut contract = match collection.find_by_id(object_id).await {
        Ok(Some(c)) => c,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "Contract not found"),
        Err(e) => {
            error!("Failed to fetch contract {}: {}", id, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    // Editability is checked before looking at the payload, as in the
    // original API: a locked contract is 403 even for an empty update.
    if !contract.is_editable() {
        return error_response(StatusCode::FORBIDDEN, "Cannot edit locked or revoked contracts");
    }

    if let Some(fields) = request.fields {
        if let Err(e) = contract.update_fields(fields) {
            return error_response(StatusCode::FORBIDDEN, &e.to_string());
        }
    }

    match collection.replace_one(doc! { "_id": object_id }, contract.clone()).await {
        Ok(result) if result.matched_count == 0 => {
            error_response(StatusCode::NOT_FOUND, "Contract not found")
        }
        Ok(_) => data_response(
            StatusCode::OK,
            Some("Contract updated successfully"),
            &contract,
        ),
        Err(e) => {
            error!("Failed to update contract {}: {}", id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Advance a contract's lifecycle state through the transition table
async fn handle_transition(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<FullBody> {
    let object_id = match parse_object_id(id) {
        Ok(oid) => oid,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let request: TransitionRequest = match read_json(req).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let new_state = match ContractState::from_str(&request.new_state) {
        Ok(s) => s,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let collection = match contracts(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let mut contract = match collection.find_by_id(object_id).await {
        Ok(Some(c)) => c,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "Contract not found"),
        Err(e) => {
            error!("Failed to fetch contract {}: {}", id, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    if let Err(e) = contract.apply_transition(new_state) {
        return error_response(StatusCode::BAD_REQUEST, &e.to_string());
    }

    match collection.replace_one(doc! { "_id": object_id }, contract.clone()).await {
        Ok(result) if result.matched_count == 0 => {
            error_response(StatusCode::NOT_FOUND, "Contract not found")
        }
        Ok(_) => {
            info!("Contract {} transitioned to {}", id, new_state);
            data_response(
                StatusCode::OK,
                Some("Contract state updated successfully"),
                &contract,
            )
        }
        Err(e) => {
            error!("Failed to persist transition for {}: {}", id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

async fn handle_delete(state: Arc<AppState>, id: &str) -> Response<FullBody> {
    let object_id = match parse_object_id(id) {
        Ok(oid) => oid,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let collection = match contracts(&state).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    // Deletion is allowed in any state, terminal ones included
    match collection.delete_one(doc! { "_id": object_id }).await {
        Ok(result) if result.deleted_count == 0 => {
            error_response(StatusCode::NOT_FOUND, "Contract not found")
        }
        Ok(_) => {
            info!("Deleted contract {}", id);
            message_response(StatusCode::OK, "Contract deleted successfully")
        }
        Err(e) => {
            error!("Failed to delete contract {}: {}", id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn contracts(state: &AppState) -> Result<MongoCollection<ContractDoc>, Response<FullBody>> {
    state
        .mongo
        .collection::<ContractDoc>(CONTRACT_COLLECTION)
        .await
        .map_err(|e| {
            error!("Contract collection unavailable: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        })
}

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

async fn read_json<T: serde::de::DeserializeOwned>(
    req: Request<Incoming>,
) -> Result<T, Response<FullBody>> {
    let body_bytes = match req.into_body().collect().await {
        Ok(b) => b.to_bytes(),
        Err(_) => return Err(error_response(StatusCode::BAD_REQUEST, "Invalid body")),
    };

    serde_json::from_slice(&body_bytes)
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, &format!("Validation error: {e}")))
}

fn query_param(query: &str, name: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key == name && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_extraction() {
        assert_eq!(query_param("status=sent&filter=active", "status"), Some("sent".into()));
        assert_eq!(query_param("status=sent&filter=active", "filter"), Some("active".into()));
        assert_eq!(query_param("status=", "status"), None);
        assert_eq!(query_param("", "status"), None);
        assert_eq!(query_param("other=1", "status"), None);
    }

    #[test]
    fn test_transition_request_wire_shape() {
        let req: TransitionRequest = serde_json::from_str(r#"{"newState":"approved"}"#).unwrap();
        assert_eq!(req.new_state, "approved");
    }

    #[test]
    fn test_create_request_wire_shape() {
        let req: CreateContractRequest =
            serde_json::from_str(r#"{"name":"Acme NDA","blueprintId":"665f1b2c9d3e4a5b6c7d8e9f"}"#)
                .unwrap();
        assert_eq!(req.name, "Acme NDA");
        assert_eq!(req.blueprint_id, "665f1b2c9d3e4a5b6c7d8e9f");
    }
}
