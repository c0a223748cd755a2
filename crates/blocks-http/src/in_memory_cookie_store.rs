use std::sync::{Arc, OnceLock};

use tokio::sync::RwLock;
use url::Url;

use super::{Cookie, CookieError, CookieStore};

/// In-memory cookie jar guarded by a `RwLock`.
///
/// Cookies are identified by `(domain, path, name)` the way a browser jar identifies them, and
/// are kept in insertion order so that equally specific cookies are sent in the order they were
/// set.
pub struct InMemoryCookieStore {
    cookies: RwLock<Vec<Cookie>>,
}

impl InMemoryCookieStore {
    /// Creates a new empty in-memory cookie store.
    pub fn new() -> Self {
        Self {
            cookies: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryCookieStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The jar shared by every bridge and HTTP client in this process.
///
/// Mirrors the platform's shared cookie storage: a cookie set through one bridge instance is sent
/// by every other one, and it stays in the jar until it expires or the jar is cleared.
pub fn shared_cookie_jar() -> Arc<InMemoryCookieStore> {
    static JAR: OnceLock<Arc<InMemoryCookieStore>> = OnceLock::new();
    JAR.get_or_init(|| Arc::new(InMemoryCookieStore::new()))
        .clone()
}

fn same_identity(a: &Cookie, b: &Cookie) -> bool {
    a.name == b.name && a.domain == b.domain && a.path == b.path
}

#[async_trait::async_trait]
impl CookieStore for InMemoryCookieStore {
    async fn set_cookie(&self, cookie: Cookie) -> Result<(), CookieError> {
        cookie.validate()?;

        let mut cookies = self.cookies.write().await;
        match cookies.iter_mut().find(|c| same_identity(c, &cookie)) {
            Some(existing) => *existing = cookie,
            None => cookies.push(cookie),
        }
        Ok(())
    }

    async fn cookies_for(&self, url: &Url) -> Result<Vec<Cookie>, CookieError> {
        let cookies = self.cookies.read().await;
        let mut matching: Vec<Cookie> = cookies.iter().filter(|c| c.matches(url)).cloned().collect();
        // Longer paths first (RFC 6265 section 5.4), stable for equal lengths
        matching.sort_by_key(|c| std::cmp::Reverse(c.path.as_deref().map_or(0, str::len)));
        Ok(matching)
    }

    async fn clear(&self) -> Result<(), CookieError> {
        self.cookies.write().await.clear();
        Ok(())
    }

    async fn list_cookies(&self) -> Result<Vec<String>, CookieError> {
        let cookies = self.cookies.read().await;
        Ok(cookies
            .iter()
            .filter(|c| !c.is_expired())
            .map(|c| c.name.clone())
            .collect())
    }
}
