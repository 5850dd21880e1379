//! Input submission, one transaction per message.
//!
//! Messages are appended to the application's inbox through the InputBox
//! contract's `addInput(address,bytes)`. The signing side is a JSON-RPC node
//! holding the sender account (a local devnet or a wallet-backed provider),
//! reached with `eth_sendTransaction`.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::{Address, B256};
use alloy_sol_types::{sol, SolCall};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use rollclaim_core::config::{ConfigError, RollclaimConfig};
use rollclaim_core::payload::encode_hex;
use rollclaim_core::{ChunkError, MessageError};

sol! {
    function addInput(address appContract, bytes payload) external returns (bytes32);
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("invalid address {0:?}")]
    InvalidAddress(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Message(#[from] MessageError),
    #[error(transparent)]
    Chunk(#[from] ChunkError),
    #[error("rpc request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("transaction rejected ({code}): {message}")]
    Rejected { code: i64, message: String },
    #[error("node reported no accounts to send from")]
    NoAccount,
    #[error("malformed rpc response: {0}")]
    MalformedResponse(String),
}

pub fn parse_address(text: &str) -> Result<Address, SubmitError> {
    text.trim()
        .parse()
        .map_err(|_| SubmitError::InvalidAddress(text.to_string()))
}

/// Calldata of `InputBox.addInput(dapp, payload)`.
pub fn add_input_calldata(dapp: Address, payload: Vec<u8>) -> Vec<u8> {
    addInputCall {
        appContract: dapp,
        payload: payload.into(),
    }
    .abi_encode()
}

/// Something that appends inputs to an application's inbox.
pub trait InputSink: Send + Sync {
    /// Submit one input. Resolves once the transaction is accepted for
    /// broadcast, not when it is included in a block.
    fn add_input(
        &self,
        dapp: Address,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<B256, SubmitError>> + Send;
}

// ── JSON-RPC sink ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Sends inputs with `eth_sendTransaction` to a node that signs for `sender`.
pub struct JsonRpcSink {
    http: reqwest::Client,
    rpc_url: String,
    input_box: Address,
    /// None = first account of `eth_accounts`.
    sender: Option<Address>,
    next_id: AtomicU64,
}

impl JsonRpcSink {
    pub fn new(rpc_url: impl Into<String>, input_box: Address, sender: Option<Address>) -> Self {
        Self {
            http: reqwest::Client::new(),
            rpc_url: rpc_url.into(),
            input_box,
            sender,
            next_id: AtomicU64::new(1),
        }
    }

    /// Sink for the currently connected chain.
    pub fn from_config(config: &RollclaimConfig) -> Result<Self, SubmitError> {
        let chain = config.active_chain()?;
        let input_box = parse_address(&config.dapp.input_box)?;
        let sender = match config.submit.sender.trim() {
            "" => None,
            s => Some(parse_address(s)?),
        };
        Ok(Self::new(chain.rpc_url.clone(), input_box, sender))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, SubmitError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        let response: RpcResponse<T> = self
            .http
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.error {
            return Err(SubmitError::Rejected {
                code: err.code,
                message: err.message,
            });
        }
        response
            .result
            .ok_or_else(|| SubmitError::MalformedResponse(format!("{method}: missing result")))
    }

    async fn sender(&self) -> Result<Address, SubmitError> {
        if let Some(sender) = self.sender {
            return Ok(sender);
        }
        let accounts: Vec<Address> = self.call("eth_accounts", serde_json::json!([])).await?;
        accounts.first().copied().ok_or(SubmitError::NoAccount)
    }
}

impl InputSink for JsonRpcSink {
    async fn add_input(&self, dapp: Address, payload: Vec<u8>) -> Result<B256, SubmitError> {
        let from = self.sender().await?;
        let data = encode_hex(&add_input_calldata(dapp, payload));
        let tx = serde_json::json!([{
            "from": from,
            "to": self.input_box,
            "data": data,
        }]);
        self.call("eth_sendTransaction", tx).await
    }
}

// ── Submitter ─────────────────────────────────────────────────────────────────

/// Sends encoded messages as inputs to one application.
pub struct InputSubmitter<S> {
    sink: S,
    dapp: Address,
}

impl<S: InputSink> InputSubmitter<S> {
    pub fn new(sink: S, dapp: Address) -> Self {
        Self { sink, dapp }
    }

    pub fn dapp(&self) -> Address {
        self.dapp
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Submit the UTF-8 bytes of `message`. Failures are logged and returned;
    /// nothing is retried.
    pub async fn submit(&self, message: &str) -> Result<B256, SubmitError> {
        match self
            .sink
            .add_input(self.dapp, message.as_bytes().to_vec())
            .await
        {
            Ok(tx) => {
                tracing::info!(dapp = %self.dapp, %tx, bytes = message.len(), "input submitted");
                Ok(tx)
            }
            Err(e) => {
                tracing::warn!(dapp = %self.dapp, error = %e, "input submission failed");
                Err(e)
            }
        }
    }
}
