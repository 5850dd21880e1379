//! Hex payload helpers.
//!
//! Report payloads, chunk frames and module payloads all travel as hex strings
//! with a two-character `0x` marker in front.

pub const HEX_PREFIX: &str = "0x";

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("payload shorter than its \"0x\" marker")]
    MissingPrefix,
    #[error("invalid hex payload: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// `0x`-prefixed lowercase hex of `data`.
pub fn encode_hex(data: &[u8]) -> String {
    format!("{HEX_PREFIX}{}", hex::encode(data))
}

/// Skip the two-character marker and decode the rest as hex.
pub fn decode_hex(payload: &str) -> Result<Vec<u8>, PayloadError> {
    let body = payload.get(HEX_PREFIX.len()..).ok_or(PayloadError::MissingPrefix)?;
    Ok(hex::decode(body)?)
}

/// Decode a hex payload into UTF-8 text.
pub fn decode_text(payload: &str) -> Result<String, PayloadError> {
    Ok(String::from_utf8(decode_hex(payload)?)?)
}

/// `0x`-prefixed hex of the UTF-8 bytes of `text`.
pub fn encode_text(text: &str) -> String {
    encode_hex(text.as_bytes())
}
