//! Transport over JSON/HTTP, the wire format of the node binaries

use crate::error::{NodeError, Result};
use acp_common::ParticipantRecord;
use acp_protocol::{
    Endpoint, ErrorBody, ParticipantReply, ParticipantRequest, Transport, TransportError,
};
use async_trait::async_trait;
use std::time::Duration;

/// Calls participants at `http://host:port/<endpoint>`
#[derive(Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let http_client = reqwest::Client::builder().build().map_err(NodeError::Http)?;
        Ok(Self { http_client })
    }

    fn request_builder(
        &self,
        participant: &ParticipantRecord,
        request: &ParticipantRequest,
    ) -> std::result::Result<reqwest::RequestBuilder, TransportError> {
        let base = format!("http://{}", participant.address());
        let url = match request {
            ParticipantRequest::GetState { tx_id } => join_url(&base, &["state", tx_id.as_str()]),
            _ => join_url(&base, &[request.endpoint().as_str()]),
        }
        .map_err(invalid_url)?;

        let builder = match request {
            ParticipantRequest::GetState { .. } | ParticipantRequest::Health => {
                self.http_client.get(url)
            }
            _ => self.http_client.post(url).json(&request.to_body()),
        };
        Ok(builder)
    }
}

/// Append path segments to `base`, percent-encoding each one
///
/// Transaction ids are arbitrary strings, so `/`, `?` and `#` must not
/// leak into the path structure.
pub(crate) fn join_url(base: &str, segments: &[&str]) -> Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(base)
        .map_err(|e| NodeError::InvalidUrl(format!("{}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| NodeError::InvalidUrl(format!("{}: cannot be a base", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn invalid_url(e: NodeError) -> TransportError {
    TransportError::Unreachable(e.to_string())
}

fn map_send_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_decode() {
        TransportError::Malformed(e.to_string())
    } else {
        TransportError::Unreachable(e.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(
        &self,
        participant: &ParticipantRecord,
        request: ParticipantRequest,
        timeout: Duration,
    ) -> std::result::Result<ParticipantReply, TransportError> {
        let endpoint: Endpoint = request.endpoint();

        let response = self
            .request_builder(participant, &request)?
            .timeout(timeout)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status.to_string(),
            };
            return Err(TransportError::Remote(message));
        }

        let value = response
            .json::<serde_json::Value>()
            .await
            .map_err(map_send_error)?;
        Ok(ParticipantReply::from_json(endpoint, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_escapes_segments() {
        let base = "http://127.0.0.1:8001";

        assert_eq!(
            join_url(base, &["health"]).unwrap().as_str(),
            "http://127.0.0.1:8001/health"
        );
        assert_eq!(
            join_url(base, &["state", "T#1"]).unwrap().as_str(),
            "http://127.0.0.1:8001/state/T%231"
        );
        assert_eq!(
            join_url(base, &["state", "T?x=1"]).unwrap().as_str(),
            "http://127.0.0.1:8001/state/T%3Fx=1"
        );
        assert_eq!(
            join_url(base, &["state", "a/b"]).unwrap().as_str(),
            "http://127.0.0.1:8001/state/a%2Fb"
        );
    }

    #[test]
    fn test_join_url_rejects_bad_base() {
        assert!(matches!(
            join_url("not a url", &["health"]),
            Err(NodeError::InvalidUrl(_))
        ));
    }
}
