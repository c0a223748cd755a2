//! Handoff of BankID deep links to the host's URL opener.

use std::sync::Arc;

use thiserror::Error;
use url::Url;

use crate::surface::{SurfaceError, UrlOpener};

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum DeepLinkError {
    #[error("Invalid deep link URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Open(#[from] SurfaceError),
}

/// Replace the last query parameter of `raw_url` with `redirect=<redirect>`.
///
/// The remaining parameters keep their original encoding. A URL without a query is returned
/// unchanged.
pub fn rewrite_redirect(raw_url: &str, redirect: &str) -> Result<Url, DeepLinkError> {
    let mut url = Url::parse(raw_url)?;

    let redirect_item = format!("redirect={redirect}");
    if let Some(query) = url.query() {
        let mut items: Vec<&str> = query.split('&').filter(|item| !item.is_empty()).collect();
        items.pop();
        items.push(&redirect_item);
        let rewritten = items.join("&");
        url.set_query(Some(&rewritten));
    }

    Ok(url)
}

/// Hands authentication off to an external app through a rewritten deep link.
pub struct DeepLinkHandler {
    opener: Arc<dyn UrlOpener>,
    redirect: String,
}

impl DeepLinkHandler {
    #[allow(missing_docs)]
    pub fn new(opener: Arc<dyn UrlOpener>, redirect: impl Into<String>) -> Self {
        Self {
            opener,
            redirect: redirect.into(),
        }
    }

    /// Rewrite `raw_url` and open it. Returns the URL that was opened.
    pub fn open(&self, raw_url: &str) -> Result<Url, DeepLinkError> {
        let url = rewrite_redirect(raw_url, &self.redirect)?;
        self.opener.open(&url)?;
        Ok(url)
    }
}
