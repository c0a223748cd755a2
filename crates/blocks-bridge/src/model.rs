//! Values exchanged with the surface.

use std::collections::BTreeMap;

use blocks_http::Cookie;
use serde::{Deserialize, Serialize};

/// Discriminator of a [`ResponseEnvelope`].
pub const RESPONSE_OBJECT: &str = "RESPONSE_OBJECT";

/// A cookie the surface wants present in the jar before its request runs.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieDescriptor {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub secure: bool,
    pub http_only: bool,
    pub path: String,
}

impl From<&CookieDescriptor> for Cookie {
    fn from(descriptor: &CookieDescriptor) -> Self {
        Cookie {
            name: descriptor.name.clone(),
            value: descriptor.value.clone(),
            domain: Some(descriptor.domain.clone()),
            path: Some(descriptor.path.clone()),
            expires: None,
            secure: descriptor.secure,
            http_only: descriptor.http_only,
        }
    }
}

/// The effective method of a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    #[allow(missing_docs)]
    Get,
    #[allow(missing_docs)]
    Post,
}

impl HttpMethod {
    #[allow(missing_docs)]
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// The HTTP request an instruction asks the host to perform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// Target URL.
    pub url: String,
    /// Requested method. Only the exact string `"POST"` selects POST.
    pub method: Option<String>,
    /// Flat body, sent as a JSON object for POST requests only.
    pub body: Option<BTreeMap<String, String>>,
    /// Headers attached verbatim.
    pub headers: BTreeMap<String, String>,
    /// Cookies to store in the jar before the request is sent.
    pub cookies: Option<Vec<CookieDescriptor>>,
    /// Idempotency token of the instruction. Unrelated to HTTP caching.
    pub etag: String,
}

impl RequestDescriptor {
    /// The method the request is sent with. Anything but `"POST"` falls back to GET.
    pub fn method(&self) -> HttpMethod {
        match self.method.as_deref() {
            Some("POST") => HttpMethod::Post,
            _ => HttpMethod::Get,
        }
    }
}

/// One surface-originated request, the unit of deduplication and execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    #[allow(missing_docs)]
    pub request: RequestDescriptor,
}

impl Instruction {
    /// The idempotency token of this instruction.
    pub fn etag(&self) -> &str {
        &self.request.etag
    }
}

/// Normalized result of a successful request, posted back into the surface.
///
/// Serializes as `{"type": "RESPONSE_OBJECT", "headers": {...}, "response": ...}` with the
/// headers in sorted order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "type")]
    #[allow(missing_docs)]
    pub kind: String,
    /// Response headers, the last value winning for repeated names.
    pub headers: BTreeMap<String, String>,
    /// Response body parsed as JSON, `null` when it is not JSON.
    pub response: serde_json::Value,
}

impl ResponseEnvelope {
    #[allow(missing_docs)]
    pub fn new(headers: BTreeMap<String, String>, response: serde_json::Value) -> Self {
        Self {
            kind: RESPONSE_OBJECT.to_string(),
            headers,
            response,
        }
    }
}
