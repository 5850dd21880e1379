//! Rollclaim integration test harness.
//!
//! Tests run the client services against mock rollup endpoints served by
//! axum on loopback ports:
//!
//!   cargo test --test integration
//!
//! Every test starts its own servers, so tests never share state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use rollclaim_core::config::{ChainConfig, RollclaimConfig, LOCAL_CHAIN_ID};

mod claims;
mod inspect;
mod wasm;

// ── Harness ───────────────────────────────────────────────────────────────────

/// Account the mock node signs for.
pub const NODE_ACCOUNT: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

/// Serve `app` on an ephemeral loopback port. Returns the base URL.
pub async fn serve(app: Router) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind mock server")?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

/// Mock inspect server. Reports are hex payloads keyed by the exact message
/// text the client put in the path.
#[derive(Clone, Default)]
pub struct InspectMock {
    reports: Arc<Mutex<HashMap<String, Vec<String>>>>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl InspectMock {
    pub fn respond(&self, message: &str, reports: Vec<String>) {
        self.reports
            .lock()
            .unwrap()
            .insert(message.to_string(), reports);
    }

    /// Messages received, decoded from the request path.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    pub async fn start(&self) -> Result<String> {
        let app = Router::new()
            .route("/inspect/{message}", get(inspect_route))
            .with_state(self.clone());
        serve(app).await
    }
}

async fn inspect_route(
    State(mock): State<InspectMock>,
    Path(message): Path<String>,
) -> Json<Value> {
    mock.seen.lock().unwrap().push(message.clone());
    let reports: Vec<Value> = mock
        .reports
        .lock()
        .unwrap()
        .get(&message)
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|payload| json!({ "payload": payload }))
        .collect();
    Json(json!({
        "status": "Accepted",
        "exception_payload": null,
        "reports": reports,
        "processed_input_count": 0,
    }))
}

/// Mock JSON-RPC node answering `eth_accounts` and `eth_sendTransaction`.
#[derive(Clone, Default)]
pub struct RpcMock {
    transactions: Arc<Mutex<Vec<Value>>>,
    reject: Arc<Mutex<Vec<usize>>>,
}

impl RpcMock {
    /// Reject the `n`th transaction (0-based) with a JSON-RPC error.
    pub fn reject_nth(&self, n: usize) {
        self.reject.lock().unwrap().push(n);
    }

    /// Transaction objects received by `eth_sendTransaction`, in order.
    pub fn transactions(&self) -> Vec<Value> {
        self.transactions.lock().unwrap().clone()
    }

    pub async fn start(&self) -> Result<String> {
        let app = Router::new()
            .route("/", post(rpc_route))
            .with_state(self.clone());
        serve(app).await
    }
}

async fn rpc_route(State(mock): State<RpcMock>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let body = match request["method"].as_str() {
        Some("eth_accounts") => json!({ "result": [NODE_ACCOUNT] }),
        Some("eth_sendTransaction") => {
            let mut txs = mock.transactions.lock().unwrap();
            let n = txs.len();
            txs.push(request["params"][0].clone());
            if mock.reject.lock().unwrap().contains(&n) {
                json!({ "error": { "code": -32000, "message": "replacement transaction underpriced" } })
            } else {
                json!({ "result": format!("0x{n:064x}") })
            }
        }
        _ => json!({ "error": { "code": -32601, "message": "method not found" } }),
    };

    let mut response = json!({ "jsonrpc": "2.0", "id": id });
    if let (Some(response), Some(body)) = (response.as_object_mut(), body.as_object()) {
        response.extend(body.clone());
    }
    Json(response)
}

/// Config pointing the local chain at the given mock endpoints.
pub fn config_for(rpc_url: &str, inspect_api_url: &str) -> RollclaimConfig {
    let mut config = RollclaimConfig::default();
    config.chains.insert(
        LOCAL_CHAIN_ID.to_string(),
        ChainConfig {
            token: "ETH".into(),
            label: "mock".into(),
            rpc_url: rpc_url.into(),
            inspect_api_url: inspect_api_url.into(),
        },
    );
    config
}

/// Hex payload of a text report.
pub fn text_report(text: &str) -> String {
    rollclaim_core::payload::encode_text(text)
}
