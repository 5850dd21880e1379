//! rollclaim-services — the client-side services of the claim rollup:
//! inspect queries, input submission, module loading and CSV processing.

pub mod claims;
pub mod content;
pub mod inspect;
pub mod processor;
pub mod submit;
pub mod view;
pub mod wasm;

pub use claims::{ChunkOutcome, ClaimSender, ValidationSubmission};
pub use content::{ContentError, ContentSource};
pub use inspect::{InspectClient, InspectError, InspectResponse, Report};
pub use processor::{process_csv, CsvProcessor, NativeProcessor, ProcessedCsv};
pub use submit::{InputSink, InputSubmitter, JsonRpcSink, SubmitError};
pub use view::{InspectView, ViewUpdate};
pub use wasm::{LoadError, LoadStatus, WasmLoader, WasmProcessor};
