//! CSV processing capability.
//!
//! The values a claim is built from can be computed natively or by the
//! module the application serves (see [`crate::wasm`]); both sit behind
//! [`CsvProcessor`].

use rollclaim_core::processor::{
    blank_cell_permillion, data_cid, ProcessError, DEFAULT_NIL_FIELDS,
};

pub trait CsvProcessor: Send + Sync {
    /// Content identifier of the data set.
    fn data_cid(&self, csv: &str) -> Result<String, ProcessError>;

    /// Filled cells per million.
    fn blank_cell_value(&self, csv: &str) -> Result<u64, ProcessError>;
}

/// In-process implementation of the application's own rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeProcessor;

impl CsvProcessor for NativeProcessor {
    fn data_cid(&self, csv: &str) -> Result<String, ProcessError> {
        Ok(data_cid(csv.as_bytes()))
    }

    fn blank_cell_value(&self, csv: &str) -> Result<u64, ProcessError> {
        blank_cell_permillion(csv, DEFAULT_NIL_FIELDS)
    }
}

/// Claim inputs computed from one data set. The default is the reset state
/// shown when processing fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedCsv {
    pub cid: String,
    pub value: u64,
}

pub fn process_csv(processor: &dyn CsvProcessor, csv: &str) -> Result<ProcessedCsv, ProcessError> {
    let result = processor.data_cid(csv).and_then(|cid| {
        let value = processor.blank_cell_value(csv)?;
        Ok(ProcessedCsv { cid, value })
    });
    match &result {
        Ok(p) => tracing::debug!(cid = %p.cid, value = p.value, "csv processed"),
        Err(e) => tracing::warn!(error = %e, "csv processing failed"),
    }
    result
}
