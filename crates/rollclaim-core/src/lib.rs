//! rollclaim-core — message codec, chunking, configuration, and CSV processing
//! for the claim rollup client. All other rollclaim crates depend on this one.

pub mod chunk;
pub mod config;
pub mod message;
pub mod model;
pub mod payload;
pub mod processor;

pub use chunk::{prepare_data, split, ChunkAssembly, ChunkError};
pub use message::{Action, ClaimMessage, MessageError};
