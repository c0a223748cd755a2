use std::time::Duration;

use blocks_http::HttpClientSettings;
use serde::{Deserialize, Serialize};

/// Behavior settings of a bridge instance. They are fixed once the bridge is created.
///
/// Defaults to
///
/// ```
/// # use blocks_bridge::BridgeSettings;
/// let settings = BridgeSettings::default();
///
/// assert_eq!(settings.channel_name, "iOSNative");
/// assert_eq!(settings.user_agent, "Blocks Native Bridge");
/// assert_eq!(settings.deep_link_redirect, "bankid:///");
/// assert_eq!(settings.request_timeout, None);
/// assert!(settings.https_only);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BridgeSettings {
    /// Name of the message handler the surface posts to. Other channels are ignored.
    pub channel_name: String,
    /// User agent of instruction requests.
    pub user_agent: String,
    /// Value that replaces the last query parameter of a deep-link handoff URL.
    pub deep_link_redirect: String,
    /// Request timeout in seconds. `None` keeps the transport defaults.
    pub request_timeout: Option<u64>,
    /// Refuse instructions that target plain `http://` URLs.
    pub https_only: bool,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            channel_name: "iOSNative".into(),
            user_agent: "Blocks Native Bridge".into(),
            deep_link_redirect: "bankid:///".into(),
            request_timeout: None,
            https_only: true,
        }
    }
}

impl BridgeSettings {
    pub(crate) fn http_client_settings(&self) -> HttpClientSettings {
        HttpClientSettings {
            user_agent: self.user_agent.clone(),
            timeout: self.request_timeout.map(Duration::from_secs),
            https_only: self.https_only,
        }
    }
}
