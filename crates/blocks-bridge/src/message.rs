//! Classification of raw messages posted by the surface.

use serde_json::Value;

/// Name of the deep-link handoff message.
pub const OPEN_SWEDISH_BANKID: &str = "OPEN_SWEDISH_BANKID";

/// A message as received from the surface's message handler.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptMessage {
    /// Name of the handler the message was posted to.
    pub channel: String,
    /// Untyped message body.
    pub body: Value,
}

impl ScriptMessage {
    #[allow(missing_docs)]
    pub fn new(channel: impl Into<String>, body: Value) -> Self {
        Self {
            channel: channel.into(),
            body,
        }
    }
}

/// The closed set of messages the bridge reacts to.
///
/// The channel multiplexes unrelated concerns through one untyped body, so each body is
/// classified once here and routed on the variant afterwards.
#[derive(Clone, Debug, PartialEq)]
pub enum InboundMessage {
    /// `{"extraInformation": {"INSTRUCTIONS": <payload>}}`, payload not yet decoded.
    Instruction(Value),
    /// `{"name": "OPEN_SWEDISH_BANKID", "value": <url>}`
    DeepLink(String),
    /// Anything else.
    Unknown,
}

impl InboundMessage {
    /// Classify a message body. An instruction wins over a deep link when a body carries both.
    pub fn classify(body: &Value) -> Self {
        let Some(body) = body.as_object() else {
            return InboundMessage::Unknown;
        };

        if let Some(payload) = body
            .get("extraInformation")
            .and_then(Value::as_object)
            .and_then(|extra| extra.get("INSTRUCTIONS"))
            .filter(|payload| payload.is_object())
        {
            return InboundMessage::Instruction(payload.clone());
        }

        if body.get("name").and_then(Value::as_str) == Some(OPEN_SWEDISH_BANKID) {
            if let Some(url) = body.get("value").and_then(Value::as_str) {
                return InboundMessage::DeepLink(url.to_string());
            }
        }

        InboundMessage::Unknown
    }
}
