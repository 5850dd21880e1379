use rollclaim_core::payload::encode_hex;
use rollclaim_core::ClaimMessage;
use rollclaim_services::{
    process_csv, InspectClient, LoadError, LoadStatus, ProcessedCsv, WasmLoader,
};

use crate::*;

/// Module returning a fixed CID and the input length as the value.
const FIXED_MODULE: &str = r#"(module
    (memory (export "memory") 1)
    (global $next (mut i32) (i32.const 1024))
    (data (i32.const 64) "bafkfromwasm")
    (func (export "alloc") (param $len i32) (result i32)
      (local $p i32)
      global.get $next
      local.set $p
      global.get $next
      local.get $len
      i32.add
      global.set $next
      local.get $p)
    (func (export "data_cid") (param i32 i32) (result i64)
      ;; 64 << 32 | 12
      i64.const 274877906956)
    (func (export "empty_cell_value") (param $ptr i32) (param $len i32) (result i64)
      local.get $len
      i64.extend_i32_u)
    (func (export "_initialize")))"#;

async fn serve_module(reports: Vec<String>) -> InspectClient {
    let mock = InspectMock::default();
    mock.respond(&ClaimMessage::wasm().encode().unwrap(), reports);
    let url = mock.start().await.unwrap();
    InspectClient::new(LOCAL_CHAIN_ID, &url)
}

#[tokio::test]
async fn test_module_loads_from_inspect_and_processes_csv() {
    let wasm = wat::parse_str(FIXED_MODULE).unwrap();
    let client = serve_module(vec![encode_hex(&wasm)]).await;

    let loader = WasmLoader::new();
    let mut status = loader.subscribe();
    assert_eq!(*status.borrow_and_update(), LoadStatus::Idle);

    loader.load(&client).await.unwrap();
    assert_eq!(loader.status(), LoadStatus::Loaded);
    assert!(status.has_changed().unwrap());

    let processor = loader.ready().await.unwrap();
    let processed = process_csv(processor.as_ref(), "a,b\n1,2").unwrap();
    assert_eq!(
        processed,
        ProcessedCsv {
            cid: "bafkfromwasm".into(),
            value: 7,
        }
    );
}

#[tokio::test]
async fn test_garbage_module_fails_the_load() {
    let client = serve_module(vec![encode_hex(b"definitely not wasm")]).await;

    let loader = WasmLoader::new();
    assert!(matches!(
        loader.load(&client).await,
        Err(LoadError::Instantiate(_))
    ));
    assert!(matches!(loader.status(), LoadStatus::Failed(_)));
    assert!(matches!(loader.ready().await, Err(LoadError::Failed(_))));
    assert!(loader.processor().is_none());
}

#[tokio::test]
async fn test_missing_module_fails_the_load() {
    let client = serve_module(vec![]).await;

    let loader = WasmLoader::new();
    assert!(matches!(loader.load(&client).await, Err(LoadError::NoModule)));
    assert_eq!(
        loader.status(),
        LoadStatus::Failed(LoadError::NoModule.to_string())
    );
}

#[tokio::test]
async fn test_unreachable_inspect_fails_the_load() {
    let client = InspectClient::new(LOCAL_CHAIN_ID, "http://127.0.0.1:1");
    let loader = WasmLoader::new();
    assert!(matches!(
        loader.load(&client).await,
        Err(LoadError::Inspect(_))
    ));
    assert!(matches!(loader.status(), LoadStatus::Failed(_)));
}
