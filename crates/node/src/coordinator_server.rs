//! HTTP surface of a coordinator node

use crate::error::Result;
use acp_common::TransactionId;
use acp_coordinator::{Coordinator, TransactionSnapshot};
use acp_protocol::{HealthBody, ProtocolError, TransactionRequest, TransactionStarted};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

/// Routes for the coordinator endpoints
pub fn coordinator_router(coordinator: Arc<Coordinator>) -> Router {
    Router::new()
        .route("/transaction", post(begin_transaction))
        .route("/transaction/:tx_id", get(transaction))
        .route("/health", get(health))
        .with_state(coordinator)
}

/// Register the transaction and answer before the run completes
async fn begin_transaction(
    State(coordinator): State<Arc<Coordinator>>,
    body: std::result::Result<Json<TransactionRequest>, JsonRejection>,
) -> Result<Json<TransactionStarted>> {
    let Json(body) = body.map_err(|e| ProtocolError::MalformedBody(e.body_text()))?;
    let (tx_id, operation, protocol) = body.validate(coordinator.default_protocol())?;

    // The run keeps going after the handle is dropped
    coordinator.begin_transaction(tx_id.clone(), operation, Some(protocol))?;

    Ok(Json(TransactionStarted::new(&tx_id)))
}

async fn transaction(
    State(coordinator): State<Arc<Coordinator>>,
    Path(tx_id): Path<String>,
) -> Result<Json<TransactionSnapshot>> {
    let tx_id = TransactionId::parse(&tx_id).map_err(|e| ProtocolError::InvalidField {
        field: "tx_id",
        reason: e.to_string(),
    })?;
    Ok(Json(coordinator.transaction(&tx_id)?))
}

async fn health(State(coordinator): State<Arc<Coordinator>>) -> Json<HealthBody> {
    Json(HealthBody::healthy(coordinator.coordinator_id()))
}
