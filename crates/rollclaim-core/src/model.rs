//! Typed views of the documents returned by the claim inspect routes.

use std::collections::BTreeMap;

use serde::de::IgnoredAny;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Undefined,
    Open,
    Disputing,
    Finalized,
    Disputed,
    Validated,
    Contradicted,
    #[serde(other)]
    Unknown,
}

impl ClaimStatus {
    /// No further action can change the claim.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            Self::Finalized | Self::Disputed | Self::Validated | Self::Contradicted
        )
    }
}

/// Entry of `getClaimList`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClaimSummary {
    pub id: String,
    pub status: ClaimStatus,
    pub value: u64,
}

/// Progress of a chunked validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataChunksProgress {
    pub total_chunks: u32,
    pub size: u64,
    #[serde(default)]
    pub chunks: Option<Vec<u32>>,
}

/// Result of `showClaim`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub user_address: String,
    #[serde(default)]
    pub disputing_user_address: String,
    pub value: u64,
    pub last_edited: u64,
    pub status: ClaimStatus,
    #[serde(default)]
    pub data_chunks: Option<DataChunksProgress>,
}

/// Result of `showUser`. Open claim and dispute sets are keyed by claim id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub open_claims: BTreeMap<String, IgnoredAny>,
    #[serde(default)]
    pub open_disputes: BTreeMap<String, IgnoredAny>,
    pub total_disputes: u32,
    pub won_disputes: u32,
    pub total_claims: u32,
    pub correct_claims: u32,
}
