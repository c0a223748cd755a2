#![doc = include_str!("../README.md")]

/// HTTP client construction.
pub mod client;
/// Cookie data model and validation.
pub mod cookie;
/// Cookie error types.
pub mod cookie_error;
/// Middleware that attaches jar cookies to outbound requests.
pub mod cookie_middleware;
/// Cookie storage abstraction.
pub mod cookie_store;
/// In-memory jar and the process-wide shared instance.
pub mod in_memory_cookie_store;
/// `Set-Cookie` response header parsing.
pub mod set_cookie;

pub use client::{new_http_client, HttpClientSettings};
pub use cookie::Cookie;
pub use cookie_error::CookieError;
pub use cookie_middleware::CookieInjectionMiddleware;
pub use cookie_store::CookieStore;
pub use in_memory_cookie_store::{shared_cookie_jar, InMemoryCookieStore};
pub use set_cookie::parse_set_cookie;
