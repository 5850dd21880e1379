use alloy_sol_types::SolCall;

use rollclaim_core::config::ChunkEncoding;
use rollclaim_core::payload::decode_hex;
use rollclaim_core::{Action, ChunkAssembly, ClaimMessage};
use rollclaim_services::submit::{addInputCall, parse_address};
use rollclaim_services::{ClaimSender, SubmitError};

use crate::*;

/// Decode the `addInput` calldata of a recorded transaction.
fn decode_input(tx: &Value) -> addInputCall {
    let data = decode_hex(tx["data"].as_str().unwrap()).unwrap();
    addInputCall::abi_decode(&data, true).unwrap()
}

fn message_of(tx: &Value) -> ClaimMessage {
    serde_json::from_slice(&decode_input(tx).payload).unwrap()
}

#[tokio::test]
async fn test_claim_is_sent_to_input_box_for_dapp() {
    let rpc = RpcMock::default();
    let url = rpc.start().await.unwrap();
    let config = config_for(&url, "");

    let sender = ClaimSender::from_config(&config).unwrap();
    let tx = sender.claim("bafkdata", 750_000).await.unwrap();
    assert_eq!(tx.to_string(), format!("0x{:064x}", 0));

    let txs = rpc.transactions();
    assert_eq!(txs.len(), 1);
    assert!(txs[0]["from"].as_str().unwrap().eq_ignore_ascii_case(NODE_ACCOUNT));
    assert!(txs[0]["to"]
        .as_str()
        .unwrap()
        .eq_ignore_ascii_case(&config.dapp.input_box));

    let call = decode_input(&txs[0]);
    assert_eq!(call.appContract, parse_address(&config.dapp.address).unwrap());
    assert_eq!(
        &call.payload[..],
        br#"{"action":"claim","id":"bafkdata","value":750000}"#
    );
}

#[tokio::test]
async fn test_rejected_transaction_is_reported() {
    let rpc = RpcMock::default();
    rpc.reject_nth(0);
    let url = rpc.start().await.unwrap();

    let sender = ClaimSender::from_config(&config_for(&url, "")).unwrap();
    let err = sender.finalize("bafkdata").await.unwrap_err();
    assert!(matches!(err, SubmitError::Rejected { code: -32000, .. }));
}

#[tokio::test]
async fn test_unreachable_node_is_transport_error() {
    let sender = ClaimSender::from_config(&config_for("http://127.0.0.1:1", "")).unwrap();
    let err = sender.dispute("bafkdata").await.unwrap_err();
    assert!(matches!(err, SubmitError::Transport(_)));
}

#[tokio::test]
async fn test_large_validation_is_sent_in_plain_chunks() {
    let rpc = RpcMock::default();
    let url = rpc.start().await.unwrap();
    let mut config = config_for(&url, "");
    config.submit.max_chunk_size = 100;
    config.submit.chunk_encoding = ChunkEncoding::Plain;

    let csv: String = std::iter::once("a,b,c\n".to_string())
        .chain((0..60).map(|i| format!("{i},na,{}\n", i * 3)))
        .collect();
    let sender = ClaimSender::from_config(&config).unwrap();
    let submission = sender.validate("bafkdata", &csv).await.unwrap();
    assert!(submission.chunked);
    assert!(submission.all_sent());

    let messages: Vec<ClaimMessage> = rpc.transactions().iter().map(message_of).collect();
    assert_eq!(messages.len(), csv.len().div_ceil(100));
    assert!(messages
        .iter()
        .all(|m| m.action == Action::ValidateChunk && m.id.as_deref() == Some("bafkdata")));
    let joined: String = messages.iter().filter_map(|m| m.data.clone()).collect();
    assert_eq!(joined, csv);
}

#[tokio::test]
async fn test_framed_validation_reassembles_and_reports_failed_chunk() {
    let rpc = RpcMock::default();
    rpc.reject_nth(1);
    let url = rpc.start().await.unwrap();
    let mut config = config_for(&url, "");
    config.submit.max_chunk_size = 48;

    // Varied rows so the compressed form still needs several frames.
    let csv: String = std::iter::once("id,score,note\n".to_string())
        .chain((0..200).map(|i| format!("{i},{},{:x}\n", i * i % 97, i * 7919)))
        .collect();
    let sender = ClaimSender::from_config(&config).unwrap();
    let submission = sender.validate("bafkdata", &csv).await.unwrap();
    assert!(submission.outcomes.len() > 2);
    assert_eq!(submission.failed_indices(), [1]);

    // Every chunk was attempted; the node kept all of them.
    let mut assembly = ChunkAssembly::new();
    let mut restored = None;
    for tx in rpc.transactions() {
        let message = message_of(&tx);
        restored = assembly.add(message.data.as_deref().unwrap()).unwrap();
    }
    assert_eq!(restored.unwrap(), csv.as_bytes());
}
