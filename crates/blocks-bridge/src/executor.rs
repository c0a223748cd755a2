use std::collections::BTreeMap;

use thiserror::Error;

use crate::{
    credentials::CredentialStore,
    model::{HttpMethod, RequestDescriptor, ResponseEnvelope},
    transport::{HttpTransport, OutboundRequest, TransportError, TransportResponse},
};

/// Why an executed request produced no envelope. None of these reach the surface.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// The server answered 400 or 401.
    #[error("Authentication failed with status {status}")]
    Authentication {
        #[allow(missing_docs)]
        status: u16,
    },

    /// The server answered with a status other than 200, 400 or 401.
    #[error("Unexpected response status {status}")]
    UnexpectedStatus {
        #[allow(missing_docs)]
        status: u16,
    },

    #[allow(missing_docs)]
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[allow(missing_docs)]
    #[error("Failed to encode request body: {0}")]
    BodyEncoding(#[from] serde_json::Error),
}

/// Performs the request of an admitted instruction with the host's credentials.
pub struct RequestExecutor<T> {
    transport: T,
    credentials: CredentialStore,
}

impl<T: HttpTransport> RequestExecutor<T> {
    #[allow(missing_docs)]
    pub fn new(transport: T, credentials: CredentialStore) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    /// Apply the request's cookies, send it and normalize a 200 response.
    ///
    /// Every cookie is in the jar before the request leaves. Nothing is retried.
    pub async fn execute(
        &self,
        request: &RequestDescriptor,
    ) -> Result<ResponseEnvelope, ExecuteError> {
        if let Some(cookies) = &request.cookies {
            let applied = self.credentials.apply(cookies).await;
            tracing::debug!(applied, offered = cookies.len(), "Applied instruction cookies");
        }

        let outbound = build_outbound_request(request)?;
        let response = self.transport.send(outbound).await?;

        match response.status {
            200 => Ok(normalize_response(response)),
            400 | 401 => Err(ExecuteError::Authentication {
                status: response.status,
            }),
            status => Err(ExecuteError::UnexpectedStatus { status }),
        }
    }
}

/// Translate a descriptor into the request that goes on the wire.
///
/// The body is only attached to POST requests and is encoded as a JSON object with sorted keys.
/// `Content-Type: application/json` is added unless the descriptor sets a content type itself.
pub fn build_outbound_request(
    request: &RequestDescriptor,
) -> Result<OutboundRequest, ExecuteError> {
    let method = request.method();

    let mut headers: Vec<(String, String)> = request
        .headers
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    let body = match (method, &request.body) {
        (HttpMethod::Post, Some(body)) => {
            // BTreeMap serializes in key order
            let encoded = serde_json::to_vec(body)?;
            if !headers
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
            }
            Some(encoded)
        }
        _ => None,
    };

    Ok(OutboundRequest {
        method,
        url: request.url.clone(),
        headers,
        body,
    })
}

fn normalize_response(response: TransportResponse) -> ResponseEnvelope {
    let headers: BTreeMap<String, String> = response.headers.into_iter().collect();
    let body = serde_json::from_slice(&response.body).unwrap_or(serde_json::Value::Null);
    ResponseEnvelope::new(headers, body)
}
