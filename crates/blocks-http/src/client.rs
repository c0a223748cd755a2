use std::{sync::Arc, time::Duration};

use reqwest_middleware::ClientWithMiddleware;

use crate::{CookieInjectionMiddleware, CookieStore};

/// Settings for the client that performs requests on behalf of the surface.
#[derive(Clone, Debug)]
pub struct HttpClientSettings {
    /// Sent as the `User-Agent` of every request.
    pub user_agent: String,
    /// Overall request timeout. `None` leaves the transport defaults in place.
    pub timeout: Option<Duration>,
    /// Refuse plain `http://` URLs.
    pub https_only: bool,
}

impl Default for HttpClientSettings {
    fn default() -> Self {
        Self {
            user_agent: "Blocks Native Bridge".into(),
            timeout: None,
            https_only: true,
        }
    }
}

/// Build the HTTP client used for instruction requests.
///
/// Every request sent through the returned client carries the cookies of `cookie_store` that
/// match its URL.
pub fn new_http_client(
    settings: &HttpClientSettings,
    cookie_store: Arc<dyn CookieStore>,
) -> Result<ClientWithMiddleware, reqwest::Error> {
    let mut client_builder = reqwest::Client::builder()
        .use_rustls_tls()
        .user_agent(settings.user_agent.clone())
        .https_only(settings.https_only);

    if let Some(timeout) = settings.timeout {
        client_builder = client_builder.timeout(timeout);
    }

    let client = client_builder.build()?;

    Ok(reqwest_middleware::ClientBuilder::new(client)
        .with(CookieInjectionMiddleware::new(cookie_store))
        .build())
}
