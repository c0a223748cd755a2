use std::sync::Arc;

use blocks_http::{shared_cookie_jar, Cookie, CookieStore};

use crate::model::CookieDescriptor;

/// Writes cookies handed over by the surface into the credential jar.
///
/// The jar is shared with every other bridge and HTTP client of the process. Cookies are never
/// removed by the bridge; they outlive the request that carried them and stay until the jar
/// expires or clears them.
#[derive(Clone)]
pub struct CredentialStore {
    jar: Arc<dyn CookieStore>,
}

impl CredentialStore {
    #[allow(missing_docs)]
    pub fn new(jar: Arc<dyn CookieStore>) -> Self {
        Self { jar }
    }

    /// Adapter over the process-wide jar.
    pub fn shared() -> Self {
        Self::new(shared_cookie_jar())
    }

    /// The underlying jar.
    pub fn jar(&self) -> Arc<dyn CookieStore> {
        self.jar.clone()
    }

    /// Store every descriptor in order and return how many were accepted.
    ///
    /// A descriptor the jar rejects is skipped; the remaining ones are still applied.
    pub async fn apply(&self, cookies: &[CookieDescriptor]) -> usize {
        let mut applied = 0;
        for descriptor in cookies {
            match self.jar.set_cookie(Cookie::from(descriptor)).await {
                Ok(()) => applied += 1,
                Err(e) => {
                    tracing::warn!(
                        cookie_name = %descriptor.name,
                        domain = %descriptor.domain,
                        "Skipping cookie: {e}"
                    );
                }
            }
        }
        applied
    }
}
