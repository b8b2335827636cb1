#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tempfile::TempDir;

use market_api::config::AppConfig;
use market_api::database::JsonFileStorage;
use market_api::{app, AppState};

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    data_dir: TempDir,
}

impl TestServer {
    /// Boot the router on an unused port over a fresh data directory
    pub async fn spawn() -> Result<Self> {
        let data_dir = tempfile::tempdir().context("failed to create data dir")?;
        Self::spawn_in(data_dir).await
    }

    /// Boot over a data directory that may already hold collections
    pub async fn spawn_in(data_dir: TempDir) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.server.port = port;
        config.server.data_dir = data_dir.path().to_path_buf();
        config.api.enable_request_logging = false;
        // Minimum bcrypt cost keeps registration fast under test
        config.security.bcrypt_cost = 4;

        let state = AppState::new(config, Arc::new(JsonFileStorage::new(data_dir.path())));
        state.seed_ids().await?;

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            data_dir,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn data_path(&self, collection: &str) -> PathBuf {
        self.data_dir.path().join(format!("{}.json", collection))
    }

    /// Parsed contents of a collection file, `[]` if it was never written
    pub fn read_collection(&self, collection: &str) -> Result<Vec<Value>> {
        match std::fs::read_to_string(self.data_path(collection)) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Hand the data directory over, e.g. to restart on the same files
    pub fn into_data_dir(self) -> TempDir {
        self.data_dir
    }

    pub async fn register(&self, username: &str, email: &str, password: &str, role: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/register"))
            .json(&json!({
                "username": username,
                "email": email,
                "password": password,
                "role": role,
            }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

        let body: Value = res.json().await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("register response has no token")
    }

    /// Register `email` and return its token and user id
    pub async fn account(&self, email: &str, role: &str) -> Result<(String, i64)> {
        let username = email.split('@').next().unwrap_or(email);
        let token = self.register(username, email, "secret", role).await?;
        let id = self.user_id(email)?;
        Ok((token, id))
    }

    pub fn user_id(&self, email: &str) -> Result<i64> {
        self.read_collection("users")?
            .iter()
            .find(|u| u["email"] == email)
            .and_then(|u| u["id"].as_i64())
            .with_context(|| format!("no stored user {}", email))
    }

    pub async fn create_product(&self, token: &str, product: Value) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/products"))
            .bearer_auth(token)
            .json(&product)
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create product failed: {}", res.status());
        Ok(res.json().await?)
    }
}
