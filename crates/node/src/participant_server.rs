//! HTTP surface of a participant node

use crate::error::Result;
use acp_common::TransactionId;
use acp_participant::ParticipantEngine;
use acp_protocol::{Endpoint, ParticipantRequest, ProtocolError, RequestBody};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;

type Body = std::result::Result<Json<RequestBody>, JsonRejection>;

/// Routes for the participant endpoints
pub fn participant_router(engine: Arc<ParticipantEngine>) -> Router {
    Router::new()
        .route("/prepare", post(prepare))
        .route("/decision", post(decision))
        .route("/can_commit", post(can_commit))
        .route("/pre_commit", post(pre_commit))
        .route("/do_commit", post(do_commit))
        .route("/state/:tx_id", get(state))
        .route("/health", get(health))
        .with_state(engine)
}

fn dispatch(engine: &ParticipantEngine, endpoint: Endpoint, body: Body) -> Result<Json<Value>> {
    let Json(body) = body.map_err(|e| ProtocolError::MalformedBody(e.body_text()))?;
    let request = ParticipantRequest::from_body(endpoint, body)?;
    let reply = engine.handle(request)?;
    Ok(Json(reply.to_json()))
}

async fn prepare(State(engine): State<Arc<ParticipantEngine>>, body: Body) -> Result<Json<Value>> {
    dispatch(&engine, Endpoint::Prepare, body)
}

async fn decision(State(engine): State<Arc<ParticipantEngine>>, body: Body) -> Result<Json<Value>> {
    dispatch(&engine, Endpoint::Decision, body)
}

async fn can_commit(
    State(engine): State<Arc<ParticipantEngine>>,
    body: Body,
) -> Result<Json<Value>> {
    dispatch(&engine, Endpoint::CanCommit, body)
}

async fn pre_commit(
    State(engine): State<Arc<ParticipantEngine>>,
    body: Body,
) -> Result<Json<Value>> {
    dispatch(&engine, Endpoint::PreCommit, body)
}

async fn do_commit(
    State(engine): State<Arc<ParticipantEngine>>,
    body: Body,
) -> Result<Json<Value>> {
    dispatch(&engine, Endpoint::DoCommit, body)
}

async fn state(
    State(engine): State<Arc<ParticipantEngine>>,
    Path(tx_id): Path<String>,
) -> Result<Json<Value>> {
    let tx_id = TransactionId::parse(&tx_id).map_err(|e| ProtocolError::InvalidField {
        field: "tx_id",
        reason: e.to_string(),
    })?;
    let reply = engine.handle(ParticipantRequest::GetState { tx_id })?;
    Ok(Json(reply.to_json()))
}

async fn health(State(engine): State<Arc<ParticipantEngine>>) -> Result<Json<Value>> {
    let reply = engine.handle(ParticipantRequest::Health)?;
    Ok(Json(reply.to_json()))
}
