//! # Common Test Utilities
//!
//! `TestApp` spawns the real server on a random port with its AI provider
//! pointed at an `httpmock::MockServer`, for end-to-end tests of the API.

// Not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use httpmock::{Method::POST, Mock, MockServer};
use metaprompt_server::{
    config,
    router,
    state::{build_app_state, AppState},
};
use reqwest::Client;
use serde_json::{json, Value};
use std::{fs::File, io::Write, net::SocketAddr};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

/// The path the mock AI provider listens on.
pub const CHAT_PATH: &str = "/v1/chat/completions";

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub app_state: AppState,
    _config_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the server with the default test configuration.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_config("").await
    }

    /// Spawns the server, appending `extra_yaml` to the test configuration.
    pub async fn spawn_with_config(extra_yaml: &str) -> Result<Self> {
        let mock_server = MockServer::start_async().await;
        let config_dir = tempdir()?;
        let config_path = config_dir.path().join("config.yml");

        let config_content = format!(
            r#"
port: 0
provider:
  provider: "openrouter"
  api_url: "{}"
  api_key: "test-key"
  model_name: "mock-chat-model"
  timeout_secs: 10
{}
"#,
            mock_server.url(CHAT_PATH),
            extra_yaml
        );
        let mut file = File::create(&config_path)?;
        file.write_all(config_content.as_bytes())?;

        let config = config::get_config(Some(&config_path.to_string_lossy()))?;
        let app_state = build_app_state(config).await?;
        Self::spawn_with_state(app_state, mock_server, config_dir).await
    }

    async fn spawn_with_state(
        app_state: AppState,
        mock_server: MockServer,
        config_dir: TempDir,
    ) -> Result<Self> {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let app_state_for_harness = app_state.clone();
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            app_state: app_state_for_harness,
            _config_dir: config_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }

    /// Mocks a chat completion answering `content` for requests whose body
    /// contains `body_fragment`.
    pub async fn mock_completion(&self, body_fragment: &str, content: &str) -> Mock<'_> {
        let body = chat_completion_body(content);
        let fragment = body_fragment.to_string();
        self.mock_server
            .mock_async(|when, then| {
                when.method(POST).path(CHAT_PATH).body_contains(fragment);
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(body);
            })
            .await
    }

    /// Mocks the provider failing with `status`.
    pub async fn mock_failure(&self, status: u16) -> Mock<'_> {
        self.mock_server
            .mock_async(|when, then| {
                when.method(POST).path(CHAT_PATH);
                then.status(status)
                    .header("Retry-After", "12")
                    .body("provider error");
            })
            .await
    }

    /// POSTs `body` as JSON and returns the status and decoded body.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<(u16, Value)> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        let status = response.status().as_u16();
        let body = response.json().await?;
        Ok((status, body))
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// An OpenAI-style `chat/completions` response carrying `content`.
pub fn chat_completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}
