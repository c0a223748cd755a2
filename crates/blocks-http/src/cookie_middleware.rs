use std::sync::Arc;

use http::Extensions;
use reqwest::{header, Request};
use reqwest_middleware::{Middleware, Next, Result};
use url::Url;

use super::{set_cookie::parse_set_cookie, CookieStore};

/// Middleware that injects cookies from a [`CookieStore`] into HTTP requests and stores the
/// cookies the server sets in return.
///
/// Looks up the cookies matching the request URL and formats them as a `Cookie` header per
/// RFC 6265. A `Cookie` header already present on the request is kept and the jar cookies are
/// appended to it. Every `Set-Cookie` header of the response is written back into the same store.
pub struct CookieInjectionMiddleware {
    cookie_store: Arc<dyn CookieStore>,
}

impl CookieInjectionMiddleware {
    /// Creates a new cookie injection middleware with the specified store.
    pub fn new(cookie_store: Arc<dyn CookieStore>) -> Self {
        Self { cookie_store }
    }
}

#[async_trait::async_trait]
impl Middleware for CookieInjectionMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<reqwest::Response> {
        let cookies = match self.cookie_store.cookies_for(req.url()).await {
            Ok(cookies) => cookies,
            Err(e) => {
                tracing::warn!("Failed to retrieve cookies from store: {e}");
                Vec::new()
            }
        };

        if !cookies.is_empty() {
            let mut pairs: Vec<String> = req
                .headers()
                .get(header::COOKIE)
                .and_then(|existing| existing.to_str().ok())
                .map(|existing| vec![existing.to_string()])
                .unwrap_or_default();
            pairs.extend(cookies.iter().map(|c| c.to_cookie_header()));

            match header::HeaderValue::from_str(&pairs.join("; ")) {
                Ok(header_value) => {
                    req.headers_mut().insert(header::COOKIE, header_value);
                }
                Err(e) => {
                    tracing::warn!(url = %req.url(), "Failed to build cookie header: {e}");
                }
            }
        }

        let request_url = req.url().clone();
        let response = next.run(req, extensions).await?;
        self.store_response_cookies(&request_url, response.headers()).await;

        Ok(response)
    }
}

impl CookieInjectionMiddleware {
    /// Keep the cookies set by the server so later requests to the same site carry them.
    async fn store_response_cookies(&self, request_url: &Url, headers: &header::HeaderMap) {
        for raw in headers.get_all(header::SET_COOKIE) {
            let Some(cookie) = raw.to_str().ok().and_then(|raw| parse_set_cookie(raw, request_url))
            else {
                tracing::debug!(url = %request_url, "Ignoring unreadable Set-Cookie header");
                continue;
            };

            let name = cookie.name.clone();
            if let Err(e) = self.cookie_store.set_cookie(cookie).await {
                tracing::warn!(cookie_name = %name, "Failed to store response cookie: {e}");
            }
        }
    }
}
