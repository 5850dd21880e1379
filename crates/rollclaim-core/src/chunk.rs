//! Splitting oversized validation payloads into input-sized pieces.
//!
//! Two shapes are produced:
//!
//! - [`split`] cuts text into fragments of at most `max` bytes, on character
//!   boundaries, whose concatenation is the original text.
//! - [`prepare_data`] gzips the payload and cuts the compressed bytes into
//!   hex frames `0x ‖ u32_be(index) ‖ u32_be(last_index) ‖ slice`, which is
//!   the shape the application reassembles for `validateChunk`.
//!
//! [`ChunkAssembly`] is the receiving side of `prepare_data`.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::payload::{decode_hex, encode_hex, PayloadError};

/// Bytes of `index ‖ last_index` in front of every frame.
pub const FRAME_HEADER_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    #[error("maximum chunk size must be positive")]
    ZeroMaxSize,
    #[error("character at byte {offset} is wider than the {max}-byte chunk limit")]
    CharTooWide { offset: usize, max: usize },
    #[error("cannot chunk empty data")]
    EmptyData,
    #[error("compression failed: {0}")]
    Compression(#[source] std::io::Error),
    #[error("invalid frame: {0}")]
    Frame(#[from] PayloadError),
    #[error("frame is {0} bytes, shorter than its header")]
    FrameTooShort(usize),
    #[error("frame index {index} outside of {total} chunks")]
    IndexOutOfRange { index: u32, total: u64 },
    #[error("frame announces {actual} chunks, assembly expects {expected}")]
    InconsistentTotal { expected: u32, actual: u32 },
}

/// Split `payload` into fragments of at most `max` bytes.
///
/// A payload that already fits comes back as a single fragment, so callers
/// that skip chunking for small payloads see the same result either way.
pub fn split(payload: &str, max: usize) -> Result<Vec<&str>, ChunkError> {
    if max == 0 {
        return Err(ChunkError::ZeroMaxSize);
    }
    if payload.len() <= max {
        return Ok(vec![payload]);
    }

    let mut fragments = Vec::with_capacity(payload.len().div_ceil(max));
    let mut start = 0;
    while start < payload.len() {
        let mut end = (start + max).min(payload.len());
        while !payload.is_char_boundary(end) {
            end -= 1;
        }
        if end == start {
            return Err(ChunkError::CharTooWide { offset: start, max });
        }
        fragments.push(&payload[start..end]);
        start = end;
    }
    Ok(fragments)
}

/// Compress `data` and cut it into hex frames carrying at most `max`
/// compressed bytes each.
pub fn prepare_data(data: &[u8], max: usize) -> Result<Vec<String>, ChunkError> {
    if max == 0 {
        return Err(ChunkError::ZeroMaxSize);
    }
    if data.is_empty() {
        return Err(ChunkError::EmptyData);
    }

    let compressed = compress(data)?;
    let slices: Vec<&[u8]> = compressed.chunks(max).collect();
    let last_index = (slices.len() - 1) as u32;

    Ok(slices
        .iter()
        .enumerate()
        .map(|(index, slice)| {
            let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + slice.len());
            frame.extend_from_slice(&(index as u32).to_be_bytes());
            frame.extend_from_slice(&last_index.to_be_bytes());
            frame.extend_from_slice(slice);
            encode_hex(&frame)
        })
        .collect())
}

fn compress(data: &[u8]) -> Result<Vec<u8>, ChunkError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(ChunkError::Compression)?;
    encoder.finish().map_err(ChunkError::Compression)
}

fn decompress(data: &[u8]) -> Result<Vec<u8>, ChunkError> {
    let mut out = Vec::new();
    GzDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(ChunkError::Compression)?;
    Ok(out)
}

/// Collects frames produced by [`prepare_data`], in any order, and yields
/// the decompressed payload once every frame has arrived.
#[derive(Debug, Default)]
pub struct ChunkAssembly {
    total: Option<u32>,
    parts: BTreeMap<u32, Vec<u8>>,
}

impl ChunkAssembly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames the payload was cut into, once known.
    pub fn total(&self) -> Option<u32> {
        self.total
    }

    pub fn received(&self) -> usize {
        self.parts.len()
    }

    /// Add one hex frame. Returns the payload when this frame completes it;
    /// the assembly is then empty again.
    pub fn add(&mut self, frame: &str) -> Result<Option<Vec<u8>>, ChunkError> {
        let bytes = decode_hex(frame)?;
        if bytes.len() < FRAME_HEADER_LEN {
            return Err(ChunkError::FrameTooShort(bytes.len()));
        }
        let index = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let last_index = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        let total = u64::from(last_index) + 1;

        if u64::from(index) >= total {
            return Err(ChunkError::IndexOutOfRange { index, total });
        }
        let total = total as u32;
        match self.total {
            Some(expected) if expected != total => {
                return Err(ChunkError::InconsistentTotal {
                    expected,
                    actual: total,
                })
            }
            _ => self.total = Some(total),
        }

        self.parts.insert(index, bytes[FRAME_HEADER_LEN..].to_vec());
        if self.parts.len() < total as usize {
            return Ok(None);
        }

        let compressed: Vec<u8> = std::mem::take(&mut self.parts)
            .into_values()
            .flatten()
            .collect();
        self.total = None;
        decompress(&compressed).map(Some)
    }
}
