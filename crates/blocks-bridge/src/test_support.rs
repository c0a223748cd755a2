//! Fakes for the trait seams of the bridge.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use blocks_http::{Cookie, CookieError, CookieStore, InMemoryCookieStore};
use url::Url;

use crate::{
    surface::{Surface, SurfaceError, UrlOpener},
    transport::{HttpTransport, OutboundRequest, TransportError, TransportResponse},
};

/// Run a test inside a local context so surfaces can be bound with `spawn_local`.
pub async fn run_local<F: std::future::Future>(test: F) -> F::Output {
    tokio::task::LocalSet::new().run_until(test).await
}

/// Ordered log shared between fakes, used to assert on the interleaving of side effects.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: String) {
        self.0.lock().unwrap().push(event);
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Clone)]
enum Behavior {
    Respond(TransportResponse),
    Fail,
    Hang,
}

/// Transport that records what it was asked to send and answers from a script.
#[derive(Clone)]
pub struct FakeTransport {
    behavior: Behavior,
    sent: Arc<Mutex<Vec<OutboundRequest>>>,
    events: EventLog,
}

impl FakeTransport {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            sent: Default::default(),
            events: EventLog::default(),
        }
    }

    pub fn responding(status: u16, headers: &[(&str, &str)], body: &[u8]) -> Self {
        Self::with_behavior(Behavior::Respond(TransportResponse {
            status,
            headers: headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            body: body.to_vec(),
        }))
    }

    pub fn failing() -> Self {
        Self::with_behavior(Behavior::Fail)
    }

    pub fn hanging() -> Self {
        Self::with_behavior(Behavior::Hang)
    }

    pub fn events(&self) -> EventLog {
        self.events.clone()
    }

    pub fn sent(&self) -> Vec<OutboundRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl HttpTransport for FakeTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        self.events
            .push(format!("send {} {}", request.method.as_str(), request.url));
        self.sent.lock().unwrap().push(request.clone());

        match &self.behavior {
            Behavior::Respond(response) => Ok(response.clone()),
            Behavior::Fail => Err(TransportError::InvalidUrl {
                url: request.url,
                source: url::ParseError::EmptyHost,
            }),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

/// Cookie store that logs every write before handing it to an in-memory jar.
pub struct RecordingCookieStore {
    inner: InMemoryCookieStore,
    events: EventLog,
}

impl RecordingCookieStore {
    pub fn new(events: EventLog) -> Self {
        Self {
            inner: InMemoryCookieStore::new(),
            events,
        }
    }
}

#[async_trait::async_trait]
impl CookieStore for RecordingCookieStore {
    async fn set_cookie(&self, cookie: Cookie) -> Result<(), CookieError> {
        self.events.push(format!("cookie {}", cookie.name));
        self.inner.set_cookie(cookie).await
    }

    async fn cookies_for(&self, url: &Url) -> Result<Vec<Cookie>, CookieError> {
        self.inner.cookies_for(url).await
    }

    async fn clear(&self) -> Result<(), CookieError> {
        self.inner.clear().await
    }

    async fn list_cookies(&self) -> Result<Vec<String>, CookieError> {
        self.inner.list_cookies().await
    }
}

/// Surface that keeps the scripts it evaluated.
#[derive(Clone)]
pub struct RecordingSurface {
    scripts: Arc<Mutex<Vec<String>>>,
    attached: Arc<AtomicBool>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            scripts: Default::default(),
            attached: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }

    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }
}

impl Surface for RecordingSurface {
    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    fn evaluate_script(&self, script: &str) -> Result<(), SurfaceError> {
        self.scripts.lock().unwrap().push(script.to_string());
        Ok(())
    }
}

/// URL opener that remembers what it opened, or refuses everything.
#[derive(Clone)]
pub struct RecordingOpener {
    opened: Arc<Mutex<Vec<String>>>,
    refuse: bool,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self {
            opened: Default::default(),
            refuse: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            refuse: true,
            ..Self::new()
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &Url) -> Result<(), SurfaceError> {
        if self.refuse {
            return Err(SurfaceError::Open {
                url: url.to_string(),
                reason: "no handler installed".to_string(),
            });
        }
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}
