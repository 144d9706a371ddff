#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::{json, Value};

use gigbook_api::config::{AppConfig, TokenLifetime};
use gigbook_api::database::{MemoryStore, Store};
use gigbook_api::{app, AppState};

/// A router served on a free port over a fresh in-memory store.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let mut config = AppConfig::testing();
        // Private-device tokens must outlast any single test
        config.security.token_expire_long = TokenLifetime::new(0, 60);
        Self::start_with(config).await
    }

    pub async fn start_with(config: AppConfig) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(&config, store.clone())?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            port,
            base_url,
            store,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/ping")).send().await {
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

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// Register through the API and return the full response body
    pub async fn register(&self, username: &str, email: &str, private: bool) -> Result<Value> {
        let res = self
            .post("/admin/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": "greaterthaneight",
                "isPrivateDevice": private,
            }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());
        Ok(res.json().await?)
    }

    /// Token for a freshly registered non-admin user
    pub async fn user_token(&self, username: &str) -> Result<String> {
        let body = self
            .register(username, &format!("{}@test.com", username), true)
            .await?;
        token_of(&body)
    }

    /// Token for a freshly registered user promoted to admin
    pub async fn admin_token(&self, username: &str) -> Result<String> {
        let token = self.user_token(username).await?;
        self.store
            .set_admin(username, true)
            .await?
            .context("promoted user vanished")?;
        Ok(token)
    }
}

pub fn token_of(body: &Value) -> Result<String> {
    body["auth_token"]
        .as_str()
        .map(str::to_string)
        .context("response carried no auth_token")
}

pub fn sample_job() -> Value {
    json!({
        "client": "Blue Note",
        "description": "Wedding reception",
        "amountPaid": 450,
        "paidTo": "Gladtime Audio",
        "workedBy": "Tyler and Meghan",
        "confirmation": "Confirmed",
        "hasPaid": false,
        "startDate": "2024-06-01",
        "endDate": "2024-06-01"
    })
}

pub fn sample_one_time_expense() -> Value {
    json!({
        "merchant": "Guitar Center",
        "description": "XLR cables",
        "amountSpent": 59.99,
        "date": "2024-06-03",
        "paidBy": "Tyler",
        "taxDeductible": true,
        "category": "Business Supplies"
    })
}

pub fn sample_recurring_expense() -> Value {
    json!({
        "merchant": "Storage Unit",
        "description": "Gear storage",
        "amount": 85.5,
        "taxDeductible": true,
        "category": "Business Equipment",
        "recurrence": "Monthly",
        "paidBy": "Gladtime Audio",
        "startDate": "2024-01-01"
    })
}
