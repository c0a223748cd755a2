use std::{future::Future, sync::Arc};

use blocks_http::{new_http_client, CookieStore};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest_middleware::ClientWithMiddleware;
use thiserror::Error;
use url::Url;

use crate::{model::HttpMethod, BridgeSettings};

/// A request ready to be put on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundRequest {
    #[allow(missing_docs)]
    pub method: HttpMethod,
    #[allow(missing_docs)]
    pub url: String,
    /// One entry per outbound header.
    pub headers: Vec<(String, String)>,
    #[allow(missing_docs)]
    pub body: Option<Vec<u8>>,
}

/// What came back from the server, before any interpretation of the status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    #[allow(missing_docs)]
    pub status: u16,
    /// Response headers in the order received.
    pub headers: Vec<(String, String)>,
    #[allow(missing_docs)]
    pub body: Vec<u8>,
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid request URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Request(#[from] reqwest_middleware::Error),

    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

/// Performs HTTP requests for the executor.
///
/// Implementations are used from tasks running off the surface context, so both the transport
/// and the futures it returns must be `Send`.
pub trait HttpTransport: Send + Sync {
    /// Send `request` and wait for the complete response.
    fn send(
        &self,
        request: OutboundRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// [`HttpTransport`] backed by `reqwest`, with jar cookies injected by middleware.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: ClientWithMiddleware,
}

impl ReqwestTransport {
    #[allow(missing_docs)]
    pub fn new(client: ClientWithMiddleware) -> Self {
        Self { client }
    }

    /// Build a transport whose requests carry the matching cookies of `jar`.
    pub fn from_settings(
        settings: &BridgeSettings,
        jar: Arc<dyn CookieStore>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(new_http_client(
            &settings.http_client_settings(),
            jar,
        )?))
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        let url = Url::parse(&request.url).map_err(|source| TransportError::InvalidUrl {
            url: request.url.clone(),
            source,
        })?;

        let mut builder = self.client.request(request.method.into(), url);
        for (name, value) in &request.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => builder = builder.header(name, value),
                _ => tracing::warn!(header = %name, "Skipping header the HTTP stack rejects"),
            }
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await.map_err(TransportError::Body)?;

        Ok(TransportResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}
