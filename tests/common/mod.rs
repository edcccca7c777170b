//! tests/common/mod.rs
//! Shared helpers: spawn the Axum app on an ephemeral port with Yahoo and
//! Telegram replaced by local mock servers.

#![allow(dead_code)]

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use axum::serve;
use cef_nav::config::{environment::EnvironmentVariables, state::AppState};
use cef_nav::core::server::create_app;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener as TokioTcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const BOT_TOKEN: &str = "TEST";
pub const CHAT_ID: &str = "-1001";

pub struct TestApp {
    pub base_url: String,
    pub yahoo: MockServer,
    pub telegram: MockServer,
    pub dir: TempDir,
}

pub struct TestEnv {
    pub yahoo: MockServer,
    pub telegram: MockServer,
    pub dir: TempDir,
    pub vars: HashMap<String, String>,
}

impl TestEnv {
    /// Mocks plus a temp dir; `holdings` is written to all_holdings.json when given
    pub async fn new(holdings: Option<Value>) -> Self {
        let yahoo = MockServer::start().await;
        let telegram = MockServer::start().await;
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let holdings_file: PathBuf = dir.path().join("all_holdings.json");
        if let Some(holdings) = holdings {
            std::fs::write(&holdings_file, holdings.to_string()).expect("Failed to write holdings");
        }

        let mut vars: HashMap<String, String> = HashMap::new();
        vars.insert("ENVIRONMENT".into(), "test".into());
        vars.insert("HOLDINGS_FILE".into(), holdings_file.display().to_string());
        vars.insert("DASHBOARD_FILE".into(), dir.path().join("dashboard_data.json").display().to_string());
        vars.insert("REFERENCE_FILE".into(), dir.path().join("reference.json").display().to_string());
        vars.insert("YAHOO_BASE_URL".into(), yahoo.uri());
        vars.insert("TELEGRAM_API_URL".into(), telegram.uri());
        vars.insert("TELEGRAM_BOT_TOKEN".into(), BOT_TOKEN.into());
        vars.insert("TELEGRAM_CHAT_ID".into(), CHAT_ID.into());

        Self { yahoo, telegram, dir, vars }
    }

    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn unset(mut self, key: &str) -> Self {
        self.vars.remove(key);
        self
    }

    pub fn environment(&self) -> Arc<EnvironmentVariables> {
        Arc::new(EnvironmentVariables::from_vars(&self.vars).expect("Invalid test environment"))
    }

    /// Spawns the app on a random unused port
    pub async fn spawn(self) -> TestApp {
        let state: AppState = AppState::new(self.environment()).expect("Failed to build state");
        let app = create_app(state);

        let listener: TokioTcpListener = TokioTcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let addr: std::net::SocketAddr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            serve(listener, app).await.expect("Server failed");
        });

        TestApp {
            base_url: format!("http://{}", addr),
            yahoo: self.yahoo,
            telegram: self.telegram,
            dir: self.dir,
        }
    }
}

/// Two funds: PDO moves +2.0% (critical), ADX moves +0.1%
pub fn sample_holdings() -> Value {
    json!({
        "PDO": [
            { "symbol": "AAA", "weight": 10.0 },
            { "symbol": "PRIV_PVT", "weight": 5.0 }
        ],
        "ADX": [
            { "symbol": "BBB", "weight": 10.0 },
            { "symbol": "AAA", "weight": 0.0 }
        ]
    })
}

/// Yahoo chart payload with the given daily closes
pub fn chart(closes: &[Option<f64>]) -> Value {
    json!({
        "chart": {
            "result": [{
                "meta": { "currency": "USD" },
                "timestamp": [],
                "indicators": { "quote": [{ "close": closes }] }
            }],
            "error": null
        }
    })
}

pub async fn mock_chart(server: &MockServer, symbol: &str, closes: &[Option<f64>], expected: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/v8/finance/chart/{}", symbol)))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart(closes)))
        .expect(expected)
        .mount(server)
        .await;
}

/// AAA: 100 -> 120 (+20%), BBB: 50 -> 50.5 (+1%)
pub async fn mock_sample_quotes(server: &MockServer, expected: u64) {
    mock_chart(server, "AAA", &[Some(95.0), Some(100.0), None, Some(120.0)], expected).await;
    mock_chart(server, "BBB", &[Some(50.0), Some(50.5)], expected).await;
}

pub async fn mock_telegram(server: &MockServer, status: u16, expected: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", BOT_TOKEN)))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "ok": status == 200 })))
        .expect(expected)
        .mount(server)
        .await;
}

/// Text of every message Telegram received, in order
pub async fn telegram_texts(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
        .filter_map(|v| v["text"].as_str().map(String::from))
        .collect()
}
