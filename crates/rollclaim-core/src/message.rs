//! Claim message schema
//!
//! Every input and inspect query the application understands is a small JSON
//! record tagged by `action`. Only the fields an action needs are present.

use serde::{Deserialize, Serialize};

/// Claim values are expressed per million (1_000_000 == 100%).
pub const MAX_CLAIM_VALUE: u64 = 1_000_000;

/// Action discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Claim,
    Finalize,
    Dispute,
    Validate,
    ValidateChunk,
    GetClaimList,
    ShowClaim,
    ShowUser,
    Wasm,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Claim => "claim",
            Self::Finalize => "finalize",
            Self::Dispute => "dispute",
            Self::Validate => "validate",
            Self::ValidateChunk => "validateChunk",
            Self::GetClaimList => "getClaimList",
            Self::ShowClaim => "showClaim",
            Self::ShowUser => "showUser",
            Self::Wasm => "wasm",
        }
    }

    /// Read-only actions, served by the inspect endpoint rather than inputs.
    pub fn is_inspect(&self) -> bool {
        matches!(
            self,
            Self::GetClaimList | Self::ShowClaim | Self::ShowUser | Self::Wasm
        )
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("claim value {0} exceeds 1000000")]
    ValueOutOfRange(u64),
    #[error("{0} requires a non-empty id")]
    MissingId(Action),
    #[error("{0} requires non-empty data")]
    MissingData(Action),
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A tagged claim record. Absent fields are omitted from the encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimMessage {
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl ClaimMessage {
    fn bare(action: Action) -> Self {
        Self {
            action,
            id: None,
            value: None,
            data: None,
        }
    }

    fn with_id(action: Action, id: impl Into<String>) -> Result<Self, MessageError> {
        let id = id.into();
        if id.is_empty() {
            return Err(MessageError::MissingId(action));
        }
        Ok(Self {
            id: Some(id),
            ..Self::bare(action)
        })
    }

    fn with_data(
        action: Action,
        id: impl Into<String>,
        data: impl Into<String>,
    ) -> Result<Self, MessageError> {
        let data = data.into();
        if data.is_empty() {
            return Err(MessageError::MissingData(action));
        }
        Ok(Self {
            data: Some(data),
            ..Self::with_id(action, id)?
        })
    }

    /// Claim `id` (a data CID) with a permillion `value`.
    pub fn claim(id: impl Into<String>, value: u64) -> Result<Self, MessageError> {
        if value > MAX_CLAIM_VALUE {
            return Err(MessageError::ValueOutOfRange(value));
        }
        Ok(Self {
            value: Some(value),
            ..Self::with_id(Action::Claim, id)?
        })
    }

    pub fn finalize(id: impl Into<String>) -> Result<Self, MessageError> {
        Self::with_id(Action::Finalize, id)
    }

    pub fn dispute(id: impl Into<String>) -> Result<Self, MessageError> {
        Self::with_id(Action::Dispute, id)
    }

    /// Validate a claim with the whole data set.
    pub fn validate(id: impl Into<String>, data: impl Into<String>) -> Result<Self, MessageError> {
        Self::with_data(Action::Validate, id, data)
    }

    /// Validate a claim with one chunk of the data set.
    pub fn validate_chunk(
        id: impl Into<String>,
        chunk: impl Into<String>,
    ) -> Result<Self, MessageError> {
        Self::with_data(Action::ValidateChunk, id, chunk)
    }

    pub fn get_claim_list() -> Self {
        Self::bare(Action::GetClaimList)
    }

    pub fn show_claim(id: impl Into<String>) -> Result<Self, MessageError> {
        Self::with_id(Action::ShowClaim, id)
    }

    pub fn show_user(id: impl Into<String>) -> Result<Self, MessageError> {
        Self::with_id(Action::ShowUser, id)
    }

    /// Request the processing module the application serves.
    pub fn wasm() -> Self {
        Self::bare(Action::Wasm)
    }

    /// JSON text in the field order `action, id, value, data`.
    pub fn encode(&self) -> Result<String, MessageError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value};

    fn decoded(msg: &ClaimMessage) -> Map<String, Value> {
        match serde_json::from_str::<Value>(&msg.encode().unwrap()).unwrap() {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn keys(map: &Map<String, Value>) -> Vec<&str> {
        let mut k: Vec<&str> = map.keys().map(String::as_str).collect();
        k.sort_unstable();
        k
    }

    #[test]
    fn claim_encodes_exactly_action_id_value() {
        let msg = ClaimMessage::claim("Qm123", 500_000).unwrap();
        assert_eq!(
            msg.encode().unwrap(),
            r#"{"action":"claim","id":"Qm123","value":500000}"#
        );
        let map = decoded(&msg);
        assert_eq!(keys(&map), ["action", "id", "value"]);
        assert!(!map.contains_key("data"));
    }

    #[test]
    fn every_action_carries_only_its_fields() {
        let cases = [
            (ClaimMessage::claim("c", 1).unwrap(), vec!["action", "id", "value"]),
            (ClaimMessage::finalize("c").unwrap(), vec!["action", "id"]),
            (ClaimMessage::dispute("c").unwrap(), vec!["action", "id"]),
            (ClaimMessage::validate("c", "a,b").unwrap(), vec!["action", "data", "id"]),
            (ClaimMessage::validate_chunk("c", "0x00").unwrap(), vec!["action", "data", "id"]),
            (ClaimMessage::get_claim_list(), vec!["action"]),
            (ClaimMessage::show_claim("c").unwrap(), vec!["action", "id"]),
            (ClaimMessage::show_user("0xabc").unwrap(), vec!["action", "id"]),
            (ClaimMessage::wasm(), vec!["action"]),
        ];
        for (msg, expected) in cases {
            let map = decoded(&msg);
            assert_eq!(keys(&map), expected, "{}", msg.action);
            assert_eq!(map["action"], Value::String(msg.action.as_str().into()));
        }
    }

    #[test]
    fn action_tags_match_wire_names() {
        assert_eq!(
            serde_json::to_string(&Action::ValidateChunk).unwrap(),
            "\"validateChunk\""
        );
        assert_eq!(
            serde_json::to_string(&Action::GetClaimList).unwrap(),
            "\"getClaimList\""
        );
        assert!(Action::Wasm.is_inspect());
        assert!(!Action::Validate.is_inspect());
    }

    #[test]
    fn wasm_request_matches_inspect_route() {
        assert_eq!(ClaimMessage::wasm().encode().unwrap(), r#"{"action":"wasm"}"#);
    }

    #[test]
    fn rejects_out_of_range_value() {
        assert!(matches!(
            ClaimMessage::claim("c", MAX_CLAIM_VALUE + 1),
            Err(MessageError::ValueOutOfRange(_))
        ));
        assert!(ClaimMessage::claim("c", MAX_CLAIM_VALUE).is_ok());
    }

    #[test]
    fn rejects_missing_id_and_data() {
        assert!(matches!(
            ClaimMessage::finalize(""),
            Err(MessageError::MissingId(Action::Finalize))
        ));
        assert!(matches!(
            ClaimMessage::validate("c", ""),
            Err(MessageError::MissingData(Action::Validate))
        ));
    }
}
