//! Shared test harness for service integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use tempfile::{NamedTempFile, TempDir};
use tokio::sync::RwLock;
use wiremock::MockServer;

use kiosk_core::{AccountId, PackageCatalog};
use kiosk_gateway::GatewayClient;
use kiosk_ledger::RocksLedger;
use kiosk_service::notify::{Notifier, NotifyError};
use kiosk_service::{create_router, AppState, ServiceConfig};

/// Service API key used in tests.
pub const SERVICE_KEY: &str = "test-service-key";

/// Admin API key used in tests.
pub const ADMIN_KEY: &str = "test-admin-key";

/// Webhook secret used in tests.
pub const WEBHOOK_SECRET: &str = "test-webhook-secret";

/// Catalog file written for every harness.
pub const CATALOG_JSON: &str = r#"{
    "packages": {
        "100_videos": {
            "price_cents": 1500,
            "access_reference": "https://chat.example/join/abc",
            "display_name": "100 Videos"
        },
        "1000_videos": {
            "price_cents": 3500,
            "access_reference": "https://chat.example/join/def",
            "display_name": "1000 Videos",
            "enabled": false
        }
    }
}"#;

/// Notifier that records every message instead of delivering it.
#[derive(Default)]
pub struct RecordingNotifier {
    /// Delivered access references: (account, package name, reference).
    pub access: Mutex<Vec<(AccountId, String, String)>>,

    /// Delivered expiry notices: (account, package name, amount cents).
    pub expiries: Mutex<Vec<(AccountId, String, i64)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_access(
        &self,
        account_id: AccountId,
        package_name: &str,
        access_reference: &str,
    ) -> Result<(), NotifyError> {
        self.access.lock().unwrap().push((
            account_id,
            package_name.to_string(),
            access_reference.to_string(),
        ));
        Ok(())
    }

    async fn send_expiry_notice(
        &self,
        account_id: AccountId,
        package_name: &str,
        amount_cents: i64,
    ) -> Result<(), NotifyError> {
        self.expiries
            .lock()
            .unwrap()
            .push((account_id, package_name.to_string(), amount_cents));
        Ok(())
    }
}

/// Fully wired service with a fake processor and a recording notifier.
pub struct TestHarness {
    /// Axum test server wrapping the full router.
    pub server: TestServer,

    /// Direct handle on the ledger backing the server.
    pub ledger: Arc<RocksLedger>,

    /// The recording notification sink.
    pub notifier: Arc<RecordingNotifier>,

    /// Orchestrator handle, for driving sweeps in tests.
    pub orchestrator: Arc<kiosk_service::Orchestrator>,

    /// Fake payment processor.
    pub processor: MockServer,

    _data_dir: TempDir,
    _catalog_file: NamedTempFile,
}

impl TestHarness {
    /// Build a harness with all keys configured and the catalog file written.
    pub async fn new() -> Self {
        let processor = MockServer::start().await;

        let data_dir = TempDir::new().expect("Failed to create temp directory");
        let ledger = Arc::new(RocksLedger::open(data_dir.path()).expect("Failed to open ledger"));

        let mut catalog_file = NamedTempFile::new().expect("Failed to create catalog file");
        catalog_file
            .write_all(CATALOG_JSON.as_bytes())
            .expect("Failed to write catalog file");
        let catalog =
            PackageCatalog::load(catalog_file.path()).expect("Failed to load catalog file");

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: data_dir.path().to_string_lossy().to_string(),
            catalog_path: catalog_file.path().to_string_lossy().to_string(),
            callback_url: "http://localhost:8080/webhooks/payment".into(),
            processor_api_url: processor.uri(),
            processor_api_key: Some("test-merchant-key".into()),
            webhook_secret: Some(WEBHOOK_SECRET.into()),
            bot_api_url: None,
            bot_token: None,
            service_api_key: Some(SERVICE_KEY.into()),
            admin_api_key: Some(ADMIN_KEY.into()),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            sweep_interval_seconds: 30,
        };

        let gateway = Arc::new(GatewayClient::new(processor.uri(), "test-merchant-key"));
        let notifier = Arc::new(RecordingNotifier::default());

        let state = AppState::new(
            Arc::clone(&ledger) as Arc<dyn kiosk_ledger::Ledger>,
            Some(gateway),
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            Arc::new(RwLock::new(catalog)),
            config,
        );
        let orchestrator = Arc::clone(&state.orchestrator);

        let server = TestServer::new(create_router(state)).expect("Failed to create test server");

        Self {
            server,
            ledger,
            notifier,
            orchestrator,
            processor,
            _data_dir: data_dir,
            _catalog_file: catalog_file,
        }
    }

    /// Sign a webhook body with the harness secret.
    pub fn sign(body: &str) -> String {
        kiosk_service::crypto::hmac_sha256_hex(WEBHOOK_SECRET, body)
    }
}

/// Mount a successful invoice response on the processor for `track_id`.
pub async fn mount_invoice_success(processor: &MockServer, track_id: &str) {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    Mock::given(method("POST"))
        .and(path("/v1/payment/invoice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200,
            "message": "Success",
            "data": {
                "track_id": track_id,
                "payment_url": format!("https://pay.example/{track_id}"),
                "expired_at": chrono::Utc::now().timestamp() + 1800,
            }
        })))
        .mount(processor)
        .await;
}
