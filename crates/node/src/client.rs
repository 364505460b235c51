//! Client for a coordinator's HTTP surface

use crate::error::{NodeError, Result};
use crate::http_transport::join_url;
use acp_common::{Protocol, TransactionId};
use acp_coordinator::TransactionSnapshot;
use acp_protocol::{ErrorBody, HealthBody, TransactionRequest, TransactionStarted};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Timeout for calls made by the client
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct CoordinatorClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl CoordinatorClient {
    /// `address` is `host:port`
    pub fn new(address: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .build()
            .map_err(NodeError::Http)?;

        Ok(Self {
            http_client,
            base_url: format!("http://{}", address),
        })
    }

    /// Ask the coordinator to start a transaction
    ///
    /// Success only means the transaction was registered; the outcome is
    /// decided later.
    pub async fn begin_transaction(
        &self,
        tx_id: &TransactionId,
        operation: &str,
        protocol: Option<Protocol>,
    ) -> Result<TransactionStarted> {
        let response = self
            .http_client
            .post(join_url(&self.base_url, &["transaction"])?)
            .json(&TransactionRequest::new(tx_id, operation, protocol))
            .send()
            .await?;
        decode(response).await
    }

    pub async fn transaction(&self, tx_id: &TransactionId) -> Result<TransactionSnapshot> {
        let response = self
            .http_client
            .get(join_url(&self.base_url, &["transaction", tx_id.as_str()])?)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn health(&self) -> Result<HealthBody> {
        let response = self
            .http_client
            .get(join_url(&self.base_url, &["health"])?)
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };
    Err(NodeError::Rejected {
        status: status.as_u16(),
        message,
    })
}
