use url::Url;

use super::{Cookie, CookieError};

/// Abstraction for cookie jars.
///
/// The bridge writes cookies handed over by the surface and the HTTP middleware reads them back
/// for every outbound request. Implementations must be safe to share between bridge instances
/// and tasks; a cookie written by one is visible to all of them.
#[async_trait::async_trait]
pub trait CookieStore: Send + Sync {
    /// Stores a cookie, replacing any cookie with the same domain, path and name.
    ///
    /// Implementations should call [`Cookie::validate`] before persisting.
    async fn set_cookie(&self, cookie: Cookie) -> Result<(), CookieError>;

    /// Returns the non-expired cookies that should accompany a request to `url`, most specific
    /// path first.
    async fn cookies_for(&self, url: &Url) -> Result<Vec<Cookie>, CookieError>;

    /// Clears all stored cookies.
    async fn clear(&self) -> Result<(), CookieError>;

    /// Lists all non-expired cookie names (for debugging/testing).
    async fn list_cookies(&self) -> Result<Vec<String>, CookieError>;
}
