//! Read-only queries against the application's off-chain state.
//!
//! A query is an encoded [`ClaimMessage`] placed, URL-encoded, in the path of
//! `GET {inspect_api_url}/inspect/{message}`. The server answers with a list of
//! hex reports; text queries only look at the first one.

use bytes::Bytes;
use reqwest::Url;
use serde::Deserialize;

use rollclaim_core::config::{ConfigError, RollclaimConfig};
use rollclaim_core::payload::{decode_hex, decode_text, PayloadError};
use rollclaim_core::{ClaimMessage, MessageError};

#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error("no inspect interface defined for chain {0}")]
    NoEndpoint(String),
    #[error("invalid inspect url {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Message(#[from] MessageError),
    #[error("inspect request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("undecodable report: {0}")]
    Payload(#[from] PayloadError),
}

/// One report of an inspect response.
#[derive(Debug, Clone, Deserialize)]
pub struct Report {
    pub payload: String,
}

/// Body of an inspect response. Only `reports` is relied upon.
#[derive(Debug, Clone, Deserialize)]
pub struct InspectResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub exception_payload: Option<String>,
    #[serde(default)]
    pub reports: Vec<Report>,
    #[serde(default)]
    pub processed_input_count: Option<u64>,
}

#[derive(Clone)]
pub struct InspectClient {
    http: reqwest::Client,
    chain_id: String,
    /// None when the chain has no inspect interface.
    endpoint: Option<String>,
}

impl InspectClient {
    /// `inspect_api_url` may be empty, in which case every query fails with
    /// [`InspectError::NoEndpoint`].
    pub fn new(chain_id: impl Into<String>, inspect_api_url: &str) -> Self {
        let endpoint = Some(inspect_api_url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_string);
        Self {
            http: reqwest::Client::new(),
            chain_id: chain_id.into(),
            endpoint,
        }
    }

    /// Client for the currently connected chain.
    pub fn from_config(config: &RollclaimConfig) -> Result<Self, InspectError> {
        let chain = config.active_chain()?;
        Ok(Self::new(&config.network.chain_id, &chain.inspect_api_url))
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Full request URL for an encoded message.
    pub fn url_for(&self, message: &str) -> Result<Url, InspectError> {
        let Some(base) = self.endpoint.as_deref() else {
            tracing::error!(chain = %self.chain_id, "no inspect interface defined for chain");
            return Err(InspectError::NoEndpoint(self.chain_id.clone()));
        };
        let mut url =
            Url::parse(base).map_err(|e| InspectError::InvalidUrl(format!("{base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| InspectError::InvalidUrl(base.to_string()))?
            .pop_if_empty()
            .push("inspect")
            .push(message);
        Ok(url)
    }

    /// Send an encoded message and return the raw response.
    pub async fn query(&self, message: &str) -> Result<InspectResponse, InspectError> {
        let url = self.url_for(message)?;
        tracing::debug!(chain = %self.chain_id, %url, "inspect request");

        let response: InspectResponse = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.status.as_deref() == Some("Exception") {
            let reason = response
                .exception_payload
                .as_deref()
                .and_then(|p| decode_text(p).ok())
                .unwrap_or_default();
            tracing::warn!(chain = %self.chain_id, reason = %reason, "inspect raised an exception");
        }
        tracing::debug!(reports = response.reports.len(), "inspect response");
        Ok(response)
    }

    /// First report of the query as text. `None` when the server returned no
    /// reports, so callers can tell "no data" apart from an empty string.
    pub async fn inspect(&self, message: &ClaimMessage) -> Result<Option<String>, InspectError> {
        let response = self.query(&message.encode()?).await?;
        match response.reports.first() {
            Some(report) => Ok(Some(decode_text(&report.payload)?)),
            None => {
                tracing::debug!(action = %message.action, "inspect returned no reports");
                Ok(None)
            }
        }
    }

    /// Every report of the query as bytes.
    pub async fn inspect_raw(&self, message: &ClaimMessage) -> Result<Vec<Bytes>, InspectError> {
        let response = self.query(&message.encode()?).await?;
        response
            .reports
            .iter()
            .map(|r| Ok(Bytes::from(decode_hex(&r.payload)?)))
            .collect()
    }
}
