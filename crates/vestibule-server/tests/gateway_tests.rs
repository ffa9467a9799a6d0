//! Black-box tests for the Vestibule HTTP shell.
//!
//! Each test spawns the production router on an ephemeral port with
//! in-memory profile storage and drives it over real HTTP, so the gating
//! middleware, session routes, and admin API are exercised exactly as a
//! browser would see them.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;
use tokio::sync::watch;

use vestibule_core::bus::ChangeBus;
use vestibule_core::session::CredentialStore;
use vestibule_core::store::MaintenanceStore;
use vestibule_server::build_router;
use vestibule_server::state::AppState;
use vestibule_storage::{MemoryBackend, StorageBackend};

struct TestServer {
    base_url: String,
    server: tokio::task::JoinHandle<()>,
    worker: tokio::task::JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl TestServer {
    /// Spawn a fresh shell over its own empty profile.
    async fn spawn() -> Self {
        Self::spawn_on(Arc::new(MemoryBackend::new()), ChangeBus::default()).await
    }

    /// Spawn a shell over shared storage and a shared bus, as a sibling
    /// of another instance.
    async fn spawn_on(storage: Arc<dyn StorageBackend>, bus: ChangeBus) -> Self {
        let store = Arc::new(MaintenanceStore::new(Arc::clone(&storage), bus, None));
        store.initialize().await;
        Self::start(storage, store).await
    }

    /// Spawn a shell whose store never finished its initial read, to
    /// observe the loading response.
    async fn spawn_uninitialized() -> Self {
        let storage: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
        let store = Arc::new(MaintenanceStore::new(
            Arc::clone(&storage),
            ChangeBus::default(),
            None,
        ));
        Self::start(storage, store).await
    }

    async fn start(storage: Arc<dyn StorageBackend>, store: Arc<MaintenanceStore>) -> Self {
        let credentials = CredentialStore::new(storage);
        let state = Arc::new(AppState::new(Arc::clone(&store), credentials));

        let (shutdown, shutdown_rx) = watch::channel(false);
        // A short reconcile interval keeps sibling-convergence tests fast.
        let worker = tokio::spawn(async move {
            store.run(Duration::from_millis(50), shutdown_rx).await;
        });

        // Build app (same router as prod), but bind to an ephemeral port.
        let app = build_router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            server,
            worker,
            shutdown,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        self.server.abort();
        self.worker.abort();
    }
}

/// The session guard answers with a redirect; keep it visible to assertions.
fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("failed to build test client")
}

async fn login(client: &reqwest::Client, base_url: &str, superadmin: bool) {
    let res = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "credential": "operator-1", "superadmin": superadmin }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

async fn set_maintenance(
    client: &reqwest::Client,
    base_url: &str,
    enabled: bool,
    message: Option<&str>,
) -> serde_json::Value {
    let mut body = json!({ "enabled": enabled });
    if let Some(message) = message {
        body["message"] = json!(message);
    }
    let res = client
        .put(format!("{base_url}/superadmin/api/maintenance"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

/// Sibling convergence rides the change bus or the next reconcile pass.
/// Poll briefly until the instance catches up.
async fn status_eventually(
    client: &reqwest::Client,
    base_url: &str,
    enabled: bool,
) -> serde_json::Value {
    for _ in 0..100 {
        let body: serde_json::Value = client
            .get(format!("{base_url}/api/maintenance/status"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if body["maintenanceMode"] == enabled {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("instance did not converge to maintenanceMode={enabled} within timeout");
}

// ── Sessions ─────────────────────────────────────────────────────────

#[tokio::test]
async fn landing_page_is_public() {
    let srv = TestServer::spawn().await;
    let client = client();

    let res = client.get(&srv.base_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("Vestibule"));
}

#[tokio::test]
async fn protected_page_redirects_without_session() {
    let srv = TestServer::spawn().await;
    let client = client();

    let res = client
        .get(format!("{}/dashboard", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[reqwest::header::LOCATION], "/");
}

#[tokio::test]
async fn login_opens_the_app_pages() {
    let srv = TestServer::spawn().await;
    let client = client();
    login(&client, &srv.base_url, false).await;

    let res = client
        .get(format!("{}/dashboard", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("Dashboard"));

    let res = client
        .get(format!("{}/tools", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_rejects_empty_credential() {
    let srv = TestServer::spawn().await;
    let client = client();

    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "credential": "" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn logout_closes_the_session() {
    let srv = TestServer::spawn().await;
    let client = client();
    login(&client, &srv.base_url, false).await;

    let res = client
        .post(format!("{}/auth/logout", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(format!("{}/dashboard", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
}

// ── Admin maintenance API ────────────────────────────────────────────

#[tokio::test]
async fn admin_api_requires_bypass() {
    let srv = TestServer::spawn().await;
    let client = client();

    let res = client
        .get(format!("{}/superadmin/api/maintenance", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");

    // An ordinary session is not enough either.
    login(&client, &srv.base_url, false).await;
    let res = client
        .put(format!("{}/superadmin/api/maintenance", srv.base_url))
        .json(&json!({ "enabled": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn maintenance_toggle_lifecycle() {
    let srv = TestServer::spawn().await;
    let client = client();
    login(&client, &srv.base_url, true).await;

    let res = client
        .get(format!("{}/superadmin/api/maintenance", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let view: serde_json::Value = res.json().await.unwrap();
    assert_eq!(view["enabled"], false);

    let view = set_maintenance(&client, &srv.base_url, true, Some("Back at 14:00 UTC")).await;
    assert_eq!(view["enabled"], true);
    assert_eq!(view["message"], "Back at 14:00 UTC");

    let view = set_maintenance(&client, &srv.base_url, false, None).await;
    assert_eq!(view["enabled"], false);
    // Disabling leaves the stored message in place for next time.
    assert_eq!(view["message"], "Back at 14:00 UTC");
}

// ── The maintenance gate ─────────────────────────────────────────────

#[tokio::test]
async fn splash_replaces_pages_during_maintenance() {
    let srv = TestServer::spawn().await;
    let client = client();
    login(&client, &srv.base_url, true).await;
    set_maintenance(&client, &srv.base_url, true, Some("Back at 14:00 UTC")).await;

    // Logging out drops the bypass, so this profile sees the splash.
    let res = client
        .post(format!("{}/auth/logout", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client.get(&srv.base_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(res.text().await.unwrap().contains("Back at 14:00 UTC"));

    // The gate sits in front of the session guard, so protected pages
    // show the splash too rather than redirecting.
    let res = client
        .get(format!("{}/dashboard", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn bypass_keeps_the_portal_usable() {
    let srv = TestServer::spawn().await;
    let client = client();
    login(&client, &srv.base_url, true).await;
    set_maintenance(&client, &srv.base_url, true, None).await;

    let res = client
        .get(format!("{}/dashboard", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("Dashboard"));
}

#[tokio::test]
async fn admin_prefix_stays_open_during_maintenance() {
    let srv = TestServer::spawn().await;
    let client = client();
    login(&client, &srv.base_url, true).await;
    set_maintenance(&client, &srv.base_url, true, None).await;

    // Operator still logged in: the panel works.
    let res = client
        .get(format!("{}/superadmin/dashboard", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Logged out: the admin landing stays reachable so an operator can
    // get back in, while the panel pages fall back to the session guard.
    client
        .post(format!("{}/auth/logout", srv.base_url))
        .send()
        .await
        .unwrap();

    let res = client
        .get(format!("{}/superadmin", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/superadmin/dashboard", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn loading_shell_before_first_read() {
    let srv = TestServer::spawn_uninitialized().await;
    let client = client();

    let res = client.get(&srv.base_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.headers()[reqwest::header::RETRY_AFTER], "1");
    assert!(res.text().await.unwrap().contains("Loading"));

    // Administrative paths never wait on the store.
    let res = client
        .get(format!("{}/superadmin", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

// ── The status endpoint ──────────────────────────────────────────────

#[tokio::test]
async fn status_endpoint_reports_live_state() {
    let srv = TestServer::spawn().await;
    let client = client();

    let res = client
        .get(format!("{}/api/maintenance/status", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[reqwest::header::CACHE_CONTROL], "no-store");
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["maintenanceMode"], false);
    assert_eq!(body["apiReachable"], false);

    login(&client, &srv.base_url, true).await;
    set_maintenance(&client, &srv.base_url, true, Some("Back at 14:00 UTC")).await;

    let body: serde_json::Value = client
        .get(format!("{}/api/maintenance/status", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["maintenanceMode"], true);
    assert_eq!(body["maintenanceMessage"], "Back at 14:00 UTC");
}

#[tokio::test]
async fn status_endpoint_is_exempt_from_the_gate() {
    let srv = TestServer::spawn().await;
    let client = client();
    login(&client, &srv.base_url, true).await;
    set_maintenance(&client, &srv.base_url, true, None).await;
    client
        .post(format!("{}/auth/logout", srv.base_url))
        .send()
        .await
        .unwrap();

    // Pages are blocked, but the status endpoint still answers.
    let res = client
        .get(format!("{}/api/maintenance/status", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["maintenanceMode"], true);
}

// ── Sibling instances ────────────────────────────────────────────────

#[tokio::test]
async fn sibling_instance_converges_over_shared_profile() {
    let storage: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
    let bus = ChangeBus::default();
    let first = TestServer::spawn_on(Arc::clone(&storage), bus.clone()).await;
    let second = TestServer::spawn_on(storage, bus).await;

    let client = client();
    login(&client, &first.base_url, true).await;
    set_maintenance(&client, &first.base_url, true, Some("Back at 14:00 UTC")).await;

    let body = status_eventually(&client, &second.base_url, true).await;
    assert_eq!(body["maintenanceMessage"], "Back at 14:00 UTC");

    set_maintenance(&client, &first.base_url, false, None).await;
    status_eventually(&client, &second.base_url, false).await;
}
