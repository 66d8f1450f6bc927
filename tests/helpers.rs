// Shared test helpers: a real server on an ephemeral port with a temporary
// database and registry.

use std::path::PathBuf;

use tempfile::TempDir;
use tokio::net::TcpListener;

use api_hub::storage::insert_account;
use api_hub::{serve, AppState, ServeConfig};

/// A running server. The temp directory lives as long as the server handle.
#[allow(dead_code)] // Fields are used by some test files only
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    _dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Inserts an account directly and returns its key.
    pub async fn account(&self, email: &str, api_key: &str) -> String {
        let mut conn = self.state.pool.acquire().await.expect("connection");
        insert_account(&mut conn, email, api_key)
            .await
            .expect("Failed to insert test account")
            .api_key
    }
}

/// Starts a server whose registry file contains `registry_json`.
pub async fn start_server(registry_json: &str) -> TestServer {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let registry: PathBuf = dir.path().join("apis.json");
    std::fs::write(&registry, registry_json).expect("Failed to write registry");

    let config = ServeConfig {
        db_path: dir.path().join("hub.db"),
        registry,
        proxy_attempts: 0,
        proxy_delay_min_ms: 0,
        proxy_delay_max_ms: 0,
        skip_whois: true,
        ..Default::default()
    };

    let state = AppState::from_config(&config)
        .await
        .expect("Failed to build app state");
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("local addr");

    let served = state.clone();
    tokio::spawn(async move {
        let _ = serve(listener, served).await;
    });

    TestServer {
        base_url: format!("http://{addr}"),
        state,
        _dir: dir,
    }
}

/// The registry shipped in `assets/apis.json`.
#[allow(dead_code)]
pub const DEFAULT_REGISTRY: &str = r#"{"echo": ["msg", "apiKey"], "link_detail": ["url", "apiKey"]}"#;
