//! Host-side handles the bridge talks back through.

use thiserror::Error;
use url::Url;

/// Name under which results are posted back into the surface.
pub const SUPPLEMENTAL_INFORMATION: &str = "SUPPLEMENTAL_INFORMATION";

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("The surface is no longer attached")]
    Detached,

    #[error("Script evaluation failed: {0}")]
    Evaluation(String),

    #[error("Could not open {url}: {reason}")]
    Open { url: String, reason: String },
}

/// The embedded content surface, typically a web view.
///
/// Implementations are usually bound to the context that created them and are only ever called
/// there; they do not need to be `Send`.
pub trait Surface: 'static {
    /// Whether the surface still shows the page the bridge was created for. A destroyed or
    /// navigated-away surface reports `false`.
    fn is_attached(&self) -> bool;

    /// Evaluate `script` in the surface's page context.
    fn evaluate_script(&self, script: &str) -> Result<(), SurfaceError>;
}

/// The host's facility for handing URLs to other applications.
pub trait UrlOpener: Send + Sync {
    #[allow(missing_docs)]
    fn open(&self, url: &Url) -> Result<(), SurfaceError>;
}

/// Script that re-posts a serialized result into the surface as a `SUPPLEMENTAL_INFORMATION`
/// message.
pub fn delivery_script(serialized: &str) -> String {
    // U+2028/U+2029 are line terminators in older JavaScript engines
    let value = serialized
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029");

    format!(
        "(function() {{\n    window.postMessage({{ name: '{SUPPLEMENTAL_INFORMATION}', value: {value} }});\n}})();"
    )
}
