use std::io::Write;

use blocks_bridge::{ScriptMessage, Surface, SurfaceError, UrlOpener};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// One line of host input.
#[derive(Debug, Deserialize)]
pub struct InputLine {
    pub channel: Option<String>,
    pub body: Value,
}

impl InputLine {
    pub fn into_message(self, default_channel: &str) -> ScriptMessage {
        let channel = self.channel.unwrap_or_else(|| default_channel.to_string());
        ScriptMessage::new(channel, self.body)
    }
}

/// Surface that prints every script it is asked to evaluate.
pub struct StdoutSurface;

impl Surface for StdoutSurface {
    fn is_attached(&self) -> bool {
        true
    }

    fn evaluate_script(&self, script: &str) -> Result<(), SurfaceError> {
        // Scripts span several lines, keep one script per output line.
        let line = script.replace('\n', " ");
        writeln!(std::io::stdout().lock(), "{line}")
            .map_err(|e| SurfaceError::Evaluation(e.to_string()))
    }
}

pub struct StdoutOpener;

impl UrlOpener for StdoutOpener {
    fn open(&self, url: &Url) -> Result<(), SurfaceError> {
        writeln!(std::io::stdout().lock(), "open {url}").map_err(|e| SurfaceError::Open {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_defaults_to_configured_one() {
        let line: InputLine = serde_json::from_str(r#"{"body":{"name":"x"}}"#).unwrap();
        let message = line.into_message("iOSNative");

        assert_eq!(message.channel, "iOSNative");
        assert_eq!(message.body, serde_json::json!({"name": "x"}));
    }

    #[test]
    fn explicit_channel_is_kept() {
        let line: InputLine =
            serde_json::from_str(r#"{"channel":"other","body":null}"#).unwrap();
        assert_eq!(line.into_message("iOSNative").channel, "other");
    }
}
