//! Claim lifecycle actions sent as inputs.
//!
//! Validation data larger than one input is sent as `validateChunk` messages
//! that the application reassembles by claim id.

use alloy_primitives::B256;

use rollclaim_core::config::{ChunkEncoding, RollclaimConfig};
use rollclaim_core::{prepare_data, split, Action, ClaimMessage};

use crate::submit::{parse_address, InputSink, InputSubmitter, JsonRpcSink, SubmitError};

/// Result of sending one chunk.
#[derive(Debug)]
pub struct ChunkOutcome {
    pub index: usize,
    pub result: Result<B256, SubmitError>,
}

/// Every chunk outcome of one validation, in send order.
#[derive(Debug)]
pub struct ValidationSubmission {
    pub chunked: bool,
    pub outcomes: Vec<ChunkOutcome>,
}

impl ValidationSubmission {
    pub fn all_sent(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Chunks to resend.
    pub fn failed_indices(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_err())
            .map(|o| o.index)
            .collect()
    }
}

pub struct ClaimSender<S> {
    submitter: InputSubmitter<S>,
    max_chunk_size: usize,
    encoding: ChunkEncoding,
}

impl ClaimSender<JsonRpcSink> {
    pub fn from_config(config: &RollclaimConfig) -> Result<Self, SubmitError> {
        let sink = JsonRpcSink::from_config(config)?;
        let dapp = parse_address(&config.dapp.address)?;
        Ok(Self::new(
            InputSubmitter::new(sink, dapp),
            config.submit.max_chunk_size,
            config.submit.chunk_encoding,
        ))
    }
}

impl<S: InputSink> ClaimSender<S> {
    pub fn new(
        submitter: InputSubmitter<S>,
        max_chunk_size: usize,
        encoding: ChunkEncoding,
    ) -> Self {
        Self {
            submitter,
            max_chunk_size,
            encoding,
        }
    }

    pub fn submitter(&self) -> &InputSubmitter<S> {
        &self.submitter
    }

    pub async fn claim(&self, id: &str, value: u64) -> Result<B256, SubmitError> {
        self.send(&ClaimMessage::claim(id, value)?).await
    }

    pub async fn finalize(&self, id: &str) -> Result<B256, SubmitError> {
        self.send(&ClaimMessage::finalize(id)?).await
    }

    pub async fn dispute(&self, id: &str) -> Result<B256, SubmitError> {
        self.send(&ClaimMessage::dispute(id)?).await
    }

    async fn send(&self, message: &ClaimMessage) -> Result<B256, SubmitError> {
        self.submitter.submit(&message.encode()?).await
    }

    /// Messages that validate claim `id` with `csv`: a single `validate`
    /// when the data fits, otherwise one `validateChunk` per chunk.
    pub fn plan_validation(&self, id: &str, csv: &str) -> Result<Vec<ClaimMessage>, SubmitError> {
        if csv.len() <= self.max_chunk_size {
            return Ok(vec![ClaimMessage::validate(id, csv)?]);
        }
        let chunks: Vec<String> = match self.encoding {
            ChunkEncoding::Framed => prepare_data(csv.as_bytes(), self.max_chunk_size)?,
            ChunkEncoding::Plain => split(csv, self.max_chunk_size)?
                .into_iter()
                .map(str::to_string)
                .collect(),
        };
        Ok(chunks
            .into_iter()
            .map(|chunk| ClaimMessage::validate_chunk(id, chunk))
            .collect::<Result<_, _>>()?)
    }

    /// Send the validation messages in order. A failed chunk does not stop
    /// the rest; its error is kept in the outcome.
    pub async fn validate(&self, id: &str, csv: &str) -> Result<ValidationSubmission, SubmitError> {
        let messages = self.plan_validation(id, csv)?;
        let chunked = messages
            .first()
            .is_some_and(|m| m.action == Action::ValidateChunk);
        let total = messages.len();
        if chunked {
            tracing::info!(%id, chunks = total, bytes = csv.len(), "sending validation in chunks");
        }

        let mut outcomes = Vec::with_capacity(total);
        for (index, message) in messages.iter().enumerate() {
            let result = self.send(message).await;
            if let Err(e) = &result {
                tracing::warn!(%id, chunk = index, total, error = %e, "validation chunk not sent");
            }
            outcomes.push(ChunkOutcome { index, result });
        }
        Ok(ValidationSubmission { chunked, outcomes })
    }
}
