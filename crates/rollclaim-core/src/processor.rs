//! Content identifiers and the blank-cell statistic of CSV data sets.
//!
//! These are the values a claim is made of: the CID of the data set and the
//! share of filled cells, per million. The application recomputes both when a
//! claim is validated; a claim is valid only if both match.

use sha2::{Digest, Sha256};

/// Cell values (case-insensitive) counted as blank in addition to "".
pub const DEFAULT_NIL_FIELDS: &[&str] = &["na"];

/// CIDv1 header: version 1, raw codec (0x55), sha2-256 multihash of 32 bytes.
const CID_V1_RAW_SHA256_PREFIX: [u8; 4] = [0x01, 0x55, 0x12, 0x20];

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV has no data cells")]
    NoDataCells,
    #[error("processing module failed: {0}")]
    Module(String),
}

/// Filled cells per million, skipping the header row. A cell is blank when it
/// is empty or equals one of `nil_fields` ignoring case.
pub fn blank_cell_permillion(csv_text: &str, nil_fields: &[&str]) -> Result<u64, ProcessError> {
    let nil_fields: Vec<String> = nil_fields.iter().map(|f| f.to_lowercase()).collect();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_text.as_bytes());

    let mut total_cells: u64 = 0;
    let mut empty_cells: u64 = 0;
    for record in reader.records() {
        for value in record?.iter() {
            total_cells += 1;
            if value.is_empty() || nil_fields.contains(&value.to_lowercase()) {
                empty_cells += 1;
            }
        }
    }

    if total_cells == 0 {
        return Err(ProcessError::NoDataCells);
    }
    Ok(1_000_000 * (total_cells - empty_cells) / total_cells)
}

/// CIDv1 (raw codec, sha2-256) of `data`, in base32 multibase form.
pub fn data_cid(data: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(CID_V1_RAW_SHA256_PREFIX.len() + 32);
    bytes.extend_from_slice(&CID_V1_RAW_SHA256_PREFIX);
    bytes.extend_from_slice(&Sha256::digest(data));
    format!("b{}", data_encoding::BASE32_NOPAD.encode(&bytes).to_ascii_lowercase())
}

/// Whether `cid` names `data`.
pub fn cid_matches(data: &[u8], cid: &str) -> bool {
    data_cid(data) == cid.trim()
}

/// Outcome of checking a claim against its data the way the application does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimCheck {
    Valid,
    CidMismatch { computed: String },
    ValueMismatch { computed: u64 },
}

/// Recompute cid and value for `data` and compare with the claim.
pub fn validate_claim(id: &str, value: u64, data: &str) -> Result<ClaimCheck, ProcessError> {
    let computed = data_cid(data.as_bytes());
    if computed != id {
        return Ok(ClaimCheck::CidMismatch { computed });
    }
    let computed = blank_cell_permillion(data, DEFAULT_NIL_FIELDS)?;
    if computed != value {
        return Ok(ClaimCheck::ValueMismatch { computed });
    }
    Ok(ClaimCheck::Valid)
}
