//! Coordinator and participants talking JSON over real sockets

use acp_common::{
    Decision, ParticipantRecord, ParticipantState, Protocol, TransactionId, Vote,
};
use acp_coordinator::{Coordinator, CoordinatorConfig, TransactionSnapshot, TransactionState};
use acp_node::{
    CoordinatorClient, HttpTransport, NodeError, coordinator_router, participant_router,
};
use acp_participant::{ParticipantConfig, ParticipantEngine};
use acp_protocol::{ParticipantReply, ParticipantRequest, Transport};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

fn tx(id: &str) -> TransactionId {
    TransactionId::parse(id).unwrap()
}

async fn spawn_server(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// An address nothing listens on
async fn dead_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

async fn spawn_participant(id: &str) -> (Arc<ParticipantEngine>, ParticipantRecord) {
    let engine = Arc::new(ParticipantEngine::new(ParticipantConfig::new(id)));
    let addr = spawn_server(participant_router(engine.clone())).await;
    (engine, ParticipantRecord::new(id, "127.0.0.1", addr.port()))
}

async fn spawn_coordinator(participants: Vec<ParticipantRecord>) -> CoordinatorClient {
    let config = CoordinatorConfig::new("A")
        .with_participants(participants)
        .with_rpc_timeout(Duration::from_millis(500));
    let coordinator = Arc::new(Coordinator::new(
        config,
        Arc::new(HttpTransport::new().unwrap()),
    ));
    let addr = spawn_server(coordinator_router(coordinator)).await;
    CoordinatorClient::new(&addr.to_string()).unwrap()
}

/// Poll the coordinator until the transaction reaches a terminal state
async fn wait_for_outcome(
    client: &CoordinatorClient,
    tx_id: &TransactionId,
) -> TransactionSnapshot {
    for _ in 0..100 {
        let snapshot = client.transaction(tx_id).await.unwrap();
        if snapshot.state.is_terminal() {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("transaction {} did not finish", tx_id);
}

#[tokio::test]
async fn test_two_phase_commit_over_http() {
    let (b, b_record) = spawn_participant("B").await;
    let (c, c_record) = spawn_participant("C").await;
    let client = spawn_coordinator(vec![b_record.clone(), c_record]).await;

    let started = client
        .begin_transaction(&tx("T1"), "x=-10", Some(Protocol::TwoPhase))
        .await
        .unwrap();
    assert_eq!(started.status, "started");
    assert_eq!(started.tx_id, "T1");

    let snapshot = wait_for_outcome(&client, &tx("T1")).await;
    assert_eq!(snapshot.state, TransactionState::Committed);
    assert_eq!(snapshot.votes.get("B"), Some(&Vote::Yes));
    assert_eq!(b.balance("x"), Some(90));
    assert_eq!(c.balance("x"), Some(90));

    let reply = HttpTransport::new()
        .unwrap()
        .call(
            &b_record,
            ParticipantRequest::GetState { tx_id: tx("T1") },
            Duration::from_secs(1),
        )
        .await
        .unwrap();
    assert_eq!(
        reply,
        ParticipantReply::State {
            tx_id: tx("T1"),
            state: ParticipantState::Committed
        }
    );
}

#[tokio::test]
async fn test_unreachable_participant_over_http() {
    let (b, b_record) = spawn_participant("B").await;
    let dead = dead_addr().await;
    let c_record = ParticipantRecord::new("C", "127.0.0.1", dead.port());
    let client = spawn_coordinator(vec![b_record, c_record]).await;

    client
        .begin_transaction(&tx("T1"), "x=-10", None)
        .await
        .unwrap();

    let snapshot = wait_for_outcome(&client, &tx("T1")).await;
    assert_eq!(snapshot.state, TransactionState::Aborted);
    assert_eq!(snapshot.votes.get("C"), Some(&Vote::No));
    assert_eq!(b.balance("x"), Some(100));
    assert_eq!(b.get_state(&tx("T1")), ParticipantState::Aborted);
}

#[tokio::test]
async fn test_three_phase_commit_over_http() {
    let (b, b_record) = spawn_participant("B").await;
    let (c, c_record) = spawn_participant("C").await;
    let client = spawn_coordinator(vec![b_record, c_record]).await;

    client
        .begin_transaction(&tx("T1"), "x=-10", Some(Protocol::ThreePhase))
        .await
        .unwrap();

    let snapshot = wait_for_outcome(&client, &tx("T1")).await;
    assert_eq!(snapshot.state, TransactionState::Committed);
    assert_eq!(snapshot.protocol, Protocol::ThreePhase);
    assert_eq!(b.balance("x"), Some(90));
    assert_eq!(c.get_state(&tx("T1")), ParticipantState::Committed);
}

#[tokio::test]
async fn test_trigger_errors() {
    let (_, b_record) = spawn_participant("B").await;
    let client = spawn_coordinator(vec![b_record]).await;

    client
        .begin_transaction(&tx("T1"), "x=-10", None)
        .await
        .unwrap();

    let duplicate = client.begin_transaction(&tx("T1"), "x=-10", None).await;
    assert!(matches!(
        duplicate,
        Err(NodeError::Rejected { status: 409, .. })
    ));

    let unknown = client.transaction(&tx("T404")).await;
    assert!(matches!(unknown, Err(NodeError::Rejected { status: 404, .. })));

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.node_id, "A");
}

#[tokio::test]
async fn test_missing_fields_are_client_errors() {
    let (engine, b_record) = spawn_participant("B").await;
    let client = spawn_coordinator(vec![b_record.clone()]).await;
    let http = reqwest::Client::new();

    let coordinator_health = client.health().await.unwrap();
    assert_eq!(coordinator_health.node_id, "A");

    let response = http
        .post(format!("http://{}/prepare", b_record.address()))
        .json(&serde_json::json!({ "tx_id": "T1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("operation"));

    let response = http
        .post(format!("http://{}/decision", b_record.address()))
        .json(&serde_json::json!({ "tx_id": "T1", "decision": "MAYBE" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Nothing was recorded for the rejected requests
    assert_eq!(engine.transaction_count(), 0);
}

#[tokio::test]
async fn test_participant_endpoints_speak_original_json() {
    let (_, b_record) = spawn_participant("B").await;
    let base = format!("http://{}", b_record.address());
    let http = reqwest::Client::new();

    let vote: serde_json::Value = http
        .post(format!("{}/prepare", base))
        .json(&serde_json::json!({ "tx_id": "T1", "operation": "x=-10" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(vote, serde_json::json!({ "vote": "YES" }));

    let ack: serde_json::Value = http
        .post(format!("{}/decision", base))
        .json(&serde_json::json!({ "tx_id": "T1", "decision": "COMMIT" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ack, serde_json::json!({ "result": "ACK" }));

    let state: serde_json::Value = http
        .get(format!("{}/state/T1", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state, serde_json::json!({ "tx_id": "T1", "state": "COMMITTED" }));

    let health: serde_json::Value = http
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health, serde_json::json!({ "status": "healthy", "node_id": "B" }));

    // A conflicting decision is refused
    let response = http
        .post(format!("{}/decision", base))
        .json(&serde_json::json!({ "tx_id": "T1", "decision": "ABORT" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn test_state_queries_escape_transaction_ids() {
    let (b, b_record) = spawn_participant("B").await;
    let transport = HttpTransport::new().unwrap();

    // "T" is committed so a truncated id would answer with the wrong state
    for id in ["T", "T#1", "T?x=1", "a/b"] {
        transport
            .call(
                &b_record,
                ParticipantRequest::Prepare {
                    tx_id: tx(id),
                    operation: "x=-10".to_string(),
                },
                Duration::from_secs(1),
            )
            .await
            .unwrap();
    }
    b.handle_decision(&tx("T"), Decision::Commit).unwrap();

    for id in ["T#1", "T?x=1", "a/b"] {
        let reply = transport
            .call(
                &b_record,
                ParticipantRequest::GetState { tx_id: tx(id) },
                Duration::from_secs(1),
            )
            .await
            .unwrap();
        assert_eq!(
            reply,
            ParticipantReply::State {
                tx_id: tx(id),
                state: ParticipantState::Ready
            }
        );
    }
}

#[tokio::test]
async fn test_coordinator_query_escapes_transaction_ids() {
    let (b, b_record) = spawn_participant("B").await;
    let client = spawn_coordinator(vec![b_record]).await;

    client
        .begin_transaction(&tx("T#1"), "x=-10", None)
        .await
        .unwrap();

    let snapshot = wait_for_outcome(&client, &tx("T#1")).await;
    assert_eq!(snapshot.tx_id, tx("T#1"));
    assert_eq!(snapshot.state, TransactionState::Committed);
    assert_eq!(b.get_state(&tx("T#1")), ParticipantState::Committed);

    let unknown = client.transaction(&tx("T")).await;
    assert!(matches!(unknown, Err(NodeError::Rejected { status: 404, .. })));
}
