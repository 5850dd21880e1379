//! Processing module loader.
//!
//! The application serves a WebAssembly module through the inspect query
//! `{"action":"wasm"}` so that clients compute claim values with exactly the
//! code that validates them. The module is instantiated without host imports
//! and must export:
//!
//! | export             | signature              | result                                |
//! |--------------------|------------------------|---------------------------------------|
//! | `memory`           | memory                 |                                       |
//! | `alloc`            | `(len i32) -> i32`     | pointer to `len` writable bytes       |
//! | `data_cid`         | `(ptr, len) -> i64`    | `out_ptr << 32 \| out_len`, < 0 error |
//! | `empty_cell_value` | `(ptr, len) -> i64`    | permillion value, < 0 error           |
//!
//! `_start` or `_initialize` runs once after instantiation when exported.
//! Only one instance is live at a time: every successful load replaces the
//! previous one.

use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use tokio::sync::watch;
use wasmtime::{Engine, Instance, Linker, Memory, Module, Store, TypedFunc};

use rollclaim_core::processor::ProcessError;
use rollclaim_core::ClaimMessage;

use crate::inspect::{InspectClient, InspectError};
use crate::processor::CsvProcessor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl std::fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Loading => f.write_str("loading"),
            Self::Loaded => f.write_str("loaded"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("module request failed: {0}")]
    Inspect(#[from] InspectError),
    #[error("application returned no module")]
    NoModule,
    #[error("module instantiation failed: {0}")]
    Instantiate(String),
    #[error("module does not export {0}")]
    MissingExport(&'static str),
    #[error("module load failed: {0}")]
    Failed(String),
    #[error("no module loaded")]
    NotLoaded,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ── Instance ──────────────────────────────────────────────────────────────────

struct ModuleState {
    store: Store<()>,
    memory: Memory,
    alloc: TypedFunc<i32, i32>,
    data_cid: TypedFunc<(i32, i32), i64>,
    empty_cell_value: TypedFunc<(i32, i32), i64>,
}

#[derive(Clone, Copy)]
enum Entry {
    DataCid,
    EmptyCellValue,
}

impl Entry {
    fn name(self) -> &'static str {
        match self {
            Self::DataCid => "data_cid",
            Self::EmptyCellValue => "empty_cell_value",
        }
    }
}

/// A live module instance.
pub struct WasmProcessor {
    state: Mutex<ModuleState>,
}

impl WasmProcessor {
    pub fn instantiate(engine: &Engine, wasm: &[u8]) -> Result<Self, LoadError> {
        let module = Module::from_binary(engine, wasm)
            .map_err(|e| LoadError::Instantiate(format!("{e:#}")))?;
        let mut store = Store::new(engine, ());
        let instance = Linker::<()>::new(engine)
            .instantiate(&mut store, &module)
            .map_err(|e| LoadError::Instantiate(format!("{e:#}")))?;

        let memory = instance
            .get_memory(&mut store, "memory")
            .ok_or(LoadError::MissingExport("memory"))?;
        let alloc = instance
            .get_typed_func::<i32, i32>(&mut store, "alloc")
            .map_err(|_| LoadError::MissingExport("alloc"))?;
        let data_cid = instance
            .get_typed_func::<(i32, i32), i64>(&mut store, "data_cid")
            .map_err(|_| LoadError::MissingExport("data_cid"))?;
        let empty_cell_value = instance
            .get_typed_func::<(i32, i32), i64>(&mut store, "empty_cell_value")
            .map_err(|_| LoadError::MissingExport("empty_cell_value"))?;

        run_start(&instance, &mut store)?;

        Ok(Self {
            state: Mutex::new(ModuleState {
                store,
                memory,
                alloc,
                data_cid,
                empty_cell_value,
            }),
        })
    }

    /// Copy `input` into module memory and call `entry` on it.
    fn call(&self, entry: Entry, input: &[u8]) -> Result<(i64, Vec<u8>), ProcessError> {
        let trap = |e: wasmtime::Error| ProcessError::Module(format!("{}: {e:#}", entry.name()));
        let mut guard = lock(&self.state);
        let state = &mut *guard;

        let len = i32::try_from(input.len())
            .map_err(|_| ProcessError::Module(format!("input of {} bytes too large", input.len())))?;
        let ptr = state.alloc.call(&mut state.store, len).map_err(trap)?;
        state
            .memory
            .write(&mut state.store, ptr as u32 as usize, input)
            .map_err(|e| ProcessError::Module(format!("alloc returned bad pointer: {e}")))?;

        let func = match entry {
            Entry::DataCid => &state.data_cid,
            Entry::EmptyCellValue => &state.empty_cell_value,
        };
        let result = func.call(&mut state.store, (ptr, len)).map_err(trap)?;
        if result < 0 {
            return Err(ProcessError::Module(format!("{} returned {result}", entry.name())));
        }
        if let Entry::EmptyCellValue = entry {
            return Ok((result, Vec::new()));
        }

        let out_ptr = (result >> 32) as usize;
        let out_len = (result & 0xffff_ffff) as usize;
        let mut out = vec![0u8; out_len];
        state
            .memory
            .read(&state.store, out_ptr, &mut out)
            .map_err(|e| ProcessError::Module(format!("output out of bounds: {e}")))?;
        Ok((result, out))
    }
}

fn run_start(instance: &Instance, store: &mut Store<()>) -> Result<(), LoadError> {
    for name in ["_start", "_initialize"] {
        let Some(func) = instance.get_func(&mut *store, name) else {
            continue;
        };
        return func
            .typed::<(), ()>(&*store)
            .and_then(|f| f.call(&mut *store, ()))
            .map_err(|e| LoadError::Instantiate(format!("{name}: {e:#}")));
    }
    Ok(())
}

impl CsvProcessor for WasmProcessor {
    fn data_cid(&self, csv: &str) -> Result<String, ProcessError> {
        let (_, out) = self.call(Entry::DataCid, csv.as_bytes())?;
        String::from_utf8(out)
            .map_err(|_| ProcessError::Module("data_cid output is not UTF-8".into()))
    }

    fn blank_cell_value(&self, csv: &str) -> Result<u64, ProcessError> {
        let (value, _) = self.call(Entry::EmptyCellValue, csv.as_bytes())?;
        Ok(value as u64)
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

pub struct WasmLoader {
    engine: Engine,
    status: watch::Sender<LoadStatus>,
    active: Mutex<Option<Arc<WasmProcessor>>>,
}

impl Default for WasmLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl WasmLoader {
    pub fn new() -> Self {
        let (status, _) = watch::channel(LoadStatus::Idle);
        Self {
            engine: Engine::default(),
            status,
            active: Mutex::new(None),
        }
    }

    pub fn status(&self) -> LoadStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadStatus> {
        self.status.subscribe()
    }

    /// The live instance, if any.
    pub fn processor(&self) -> Option<Arc<WasmProcessor>> {
        lock(&self.active).clone()
    }

    /// Fetch the application's module and instantiate it. No retry on failure.
    pub async fn load(&self, inspect: &InspectClient) -> Result<Arc<WasmProcessor>, LoadError> {
        self.status.send_replace(LoadStatus::Loading);
        tracing::info!(chain = %inspect.chain_id(), "requesting processing module");

        match inspect.inspect_raw(&ClaimMessage::wasm()).await {
            Ok(modules) => self.install(&modules),
            Err(e) => self.fail(e.into()),
        }
    }

    /// Instantiate each module in turn; the last one stays live. A failure
    /// anywhere leaves the previous instance in place.
    pub fn load_modules(&self, modules: &[Bytes]) -> Result<Arc<WasmProcessor>, LoadError> {
        self.status.send_replace(LoadStatus::Loading);
        self.install(modules)
    }

    fn install(&self, modules: &[Bytes]) -> Result<Arc<WasmProcessor>, LoadError> {
        let mut latest = None;
        for (index, wasm) in modules.iter().enumerate() {
            match WasmProcessor::instantiate(&self.engine, wasm) {
                Ok(p) => latest = Some(Arc::new(p)),
                Err(e) => return self.fail(e),
            }
            tracing::info!(index, bytes = wasm.len(), "processing module instantiated");
        }
        let Some(processor) = latest else {
            return self.fail(LoadError::NoModule);
        };

        if lock(&self.active).replace(processor.clone()).is_some() {
            tracing::debug!("previous module instance dropped");
        }
        self.status.send_replace(LoadStatus::Loaded);
        Ok(processor)
    }

    fn fail(&self, error: LoadError) -> Result<Arc<WasmProcessor>, LoadError> {
        tracing::error!(error = %error, "processing module not loaded");
        self.status.send_replace(LoadStatus::Failed(error.to_string()));
        Err(error)
    }

    /// Wait for an in-flight load to settle and return its processor.
    pub async fn ready(&self) -> Result<Arc<WasmProcessor>, LoadError> {
        let mut rx = self.status.subscribe();
        let settled = rx
            .wait_for(|s| *s != LoadStatus::Loading)
            .await
            .map_err(|_| LoadError::NotLoaded)?
            .clone();
        match settled {
            LoadStatus::Loaded => self.processor().ok_or(LoadError::NotLoaded),
            LoadStatus::Failed(reason) => Err(LoadError::Failed(reason)),
            LoadStatus::Idle | LoadStatus::Loading => Err(LoadError::NotLoaded),
        }
    }
}
