//! Client for the `/interact` claim endpoint.

use crate::ClientError;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
pub struct InteractRequest {
    pub address: Address,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractResponse {
    pub message: String,
}

/// POST `{address}` to the endpoint and return its `{message}`.
///
/// Non-2xx answers still carry a message; it is returned as
/// [`ClientError::Interact`].
pub async fn submit_interact(
    client: &reqwest::Client,
    url: &str,
    address: Address,
) -> Result<InteractResponse, ClientError> {
    debug!(%url, %address, "Submitting address to interact endpoint");

    let response = client
        .post(url)
        .json(&InteractRequest { address })
        .send()
        .await
        .map_err(|e| ClientError::Rpc(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(interact_error(status.as_u16(), &body));
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::Rpc(format!("invalid interact response: {e}")))
}

/// Error for a non-2xx answer. The `{message}` is used when the body has
/// one, the raw body otherwise.
fn interact_error(status: u16, body: &str) -> ClientError {
    let message = serde_json::from_str::<InteractResponse>(body)
        .map(|response| response.message)
        .unwrap_or_else(|_| body.trim().to_string());

    ClientError::Interact { status, message }
}
