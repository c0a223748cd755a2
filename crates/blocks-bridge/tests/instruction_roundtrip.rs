use std::sync::{Arc, Mutex};

use blocks_bridge::{
    BridgeController, BridgeSettings, CredentialStore, ReqwestTransport, RequestExecutor,
    ScriptMessage, Surface, SurfaceError, UrlOpener,
};
use blocks_http::{CookieStore, InMemoryCookieStore};
use blocks_threading::ThreadBoundRunner;
use serde_json::{json, Value};
use url::Url;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

#[derive(Clone, Default)]
struct CapturingSurface {
    scripts: Arc<Mutex<Vec<String>>>,
}

impl CapturingSurface {
    fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }
}

impl Surface for CapturingSurface {
    fn is_attached(&self) -> bool {
        true
    }

    fn evaluate_script(&self, script: &str) -> Result<(), SurfaceError> {
        self.scripts.lock().unwrap().push(script.to_string());
        Ok(())
    }
}

struct NoopOpener;

impl UrlOpener for NoopOpener {
    fn open(&self, _url: &Url) -> Result<(), SurfaceError> {
        Ok(())
    }
}

fn plain_http_settings() -> BridgeSettings {
    BridgeSettings {
        https_only: false,
        ..Default::default()
    }
}

fn bridge_with_jar(
    jar: Arc<InMemoryCookieStore>,
    surface: &CapturingSurface,
) -> BridgeController<ReqwestTransport, CapturingSurface> {
    let settings = plain_http_settings();
    let transport = ReqwestTransport::from_settings(&settings, jar.clone()).unwrap();
    let executor = RequestExecutor::new(transport, CredentialStore::new(jar));
    BridgeController::new(
        settings,
        executor,
        ThreadBoundRunner::new(surface.clone()),
        Arc::new(NoopOpener),
    )
}

fn instruction(request: Value) -> ScriptMessage {
    ScriptMessage::new(
        "iOSNative",
        json!({"extraInformation": {"INSTRUCTIONS": {"request": request}}}),
    )
}

fn local_cookie(name: &str, value: &str) -> Value {
    json!({
        "name": name, "value": value, "domain": "127.0.0.1",
        "secure": false, "httpOnly": true, "path": "/"
    })
}

#[tokio::test]
async fn post_instruction_round_trip() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/login"))
        .and(matchers::header("content-type", "application/json"))
        .and(matchers::header("x-client", "blocks"))
        .and(matchers::header("cookie", "sid=abc"))
        .and(matchers::body_string(r#"{"a":"1","b":"2"}"#))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-session", "s1")
                .set_body_json(json!({"ok": true})),
        )
        .expect(1)
        .mount(&server)
        .await;

    tokio::task::LocalSet::new()
        .run_until(async {
            let surface = CapturingSurface::default();
            let bridge = bridge_with_jar(Arc::new(InMemoryCookieStore::new()), &surface);
            let request = json!({
                "url": format!("{}/login", server.uri()),
                "method": "POST",
                "body": {"b": "2", "a": "1"},
                "headers": {"X-Client": "blocks"},
                "cookies": [local_cookie("sid", "abc")],
                "etag": "login-1"
            });

            bridge.on_message(instruction(request.clone()));
            bridge.settle().await;
            bridge.on_message(instruction(request));
            bridge.settle().await;

            let scripts = surface.scripts();
            assert_eq!(scripts.len(), 1);
            assert!(scripts[0].contains(r#""type":"RESPONSE_OBJECT""#));
            assert!(scripts[0].contains(r#""x-session":"s1""#));
            assert!(scripts[0].contains(r#""response":{"ok":true}"#));
        })
        .await;
}

#[tokio::test]
async fn unauthorized_response_is_not_delivered() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "login"})))
        .expect(1)
        .mount(&server)
        .await;

    tokio::task::LocalSet::new()
        .run_until(async {
            let surface = CapturingSurface::default();
            let bridge = bridge_with_jar(Arc::new(InMemoryCookieStore::new()), &surface);

            bridge.on_message(instruction(json!({
                "url": format!("{}/accounts", server.uri()),
                "headers": {},
                "etag": "accounts-1"
            })));
            bridge.settle().await;

            assert!(surface.scripts().is_empty());
        })
        .await;
}

#[tokio::test]
async fn cookies_outlive_the_request_and_are_shared_between_bridges() {
    let server = MockServer::start().await;
    Mock::given(matchers::path("/first"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(matchers::path("/second"))
        .and(matchers::header("cookie", "shared=1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"second": true})))
        .expect(1)
        .mount(&server)
        .await;

    tokio::task::LocalSet::new()
        .run_until(async {
            let first_surface = CapturingSurface::default();
            let second_surface = CapturingSurface::default();
            let first = BridgeController::with_shared_jar(
                plain_http_settings(),
                ThreadBoundRunner::new(first_surface.clone()),
                Arc::new(NoopOpener),
            )
            .unwrap();
            let second = BridgeController::with_shared_jar(
                plain_http_settings(),
                ThreadBoundRunner::new(second_surface.clone()),
                Arc::new(NoopOpener),
            )
            .unwrap();

            first.on_message(instruction(json!({
                "url": format!("{}/first", server.uri()),
                "headers": {},
                "cookies": [local_cookie("shared", "1")],
                "etag": "first"
            })));
            first.settle().await;

            second.on_message(instruction(json!({
                "url": format!("{}/second", server.uri()),
                "headers": {},
                "etag": "first"
            })));
            second.settle().await;

            assert_eq!(first_surface.scripts().len(), 1);
            let scripts = second_surface.scripts();
            assert_eq!(scripts.len(), 1);
            assert!(scripts[0].contains(r#""response":{"second":true}"#));

            assert!(blocks_http::shared_cookie_jar()
                .list_cookies()
                .await
                .unwrap()
                .contains(&"shared".to_string()));
        })
        .await;
}

#[tokio::test]
async fn session_cookie_from_login_is_sent_by_the_next_instruction() {
    let server = MockServer::start().await;
    Mock::given(matchers::path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", "sid=fromserver; Path=/")
                .set_body_json(json!({"loggedIn": true})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(matchers::path("/accounts"))
        .and(matchers::header("cookie", "sid=fromserver"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accounts": []})))
        .expect(1)
        .mount(&server)
        .await;

    tokio::task::LocalSet::new()
        .run_until(async {
            let jar = Arc::new(InMemoryCookieStore::new());
            let surface = CapturingSurface::default();
            let bridge = bridge_with_jar(jar.clone(), &surface);

            bridge.on_message(instruction(json!({
                "url": format!("{}/login", server.uri()),
                "method": "POST",
                "body": {"user": "u"},
                "headers": {},
                "etag": "login"
            })));
            bridge.settle().await;

            bridge.on_message(instruction(json!({
                "url": format!("{}/accounts", server.uri()),
                "headers": {},
                "etag": "accounts"
            })));
            bridge.settle().await;

            assert_eq!(jar.list_cookies().await.unwrap(), vec!["sid".to_string()]);
            let scripts = surface.scripts();
            assert_eq!(scripts.len(), 2);
            assert!(scripts[1].contains(r#""response":{"accounts":[]}"#));
        })
        .await;
}
