/// Why a cookie was refused by the jar.
#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    /// Name, value, domain or path is malformed
    #[error("Cookie rejected, malformed attributes: {0}")]
    InvalidCookie(String),
}
