//! Connection status.

use anyhow::Result;

use rollclaim_core::config::RollclaimConfig;
use rollclaim_core::model::ClaimSummary;
use rollclaim_core::ClaimMessage;
use rollclaim_services::InspectClient;

use super::banner;

pub async fn cmd_status(config: &RollclaimConfig) -> Result<()> {
    banner("Rollclaim Status");
    println!("  Config      : {}", RollclaimConfig::file_path().display());
    println!("  Chain       : {}", config.network.chain_id);

    let chain = match config.active_chain() {
        Ok(chain) => chain,
        Err(e) => {
            println!("\n  {e}.");
            println!("  Known chains: {}", known_chains(config));
            return Ok(());
        }
    };
    println!("  Network     : {} ({})", chain.label, chain.token);
    println!("  RPC         : {}", chain.rpc_url);
    println!(
        "  Inspect     : {}",
        if chain.inspect_api_url.is_empty() { "(none)" } else { chain.inspect_api_url.as_str() }
    );
    println!("  Application : {}", config.dapp.address);
    println!("  Input box   : {}", config.dapp.input_box);
    println!(
        "  Chunking    : {:?}, {} bytes",
        config.submit.chunk_encoding, config.submit.max_chunk_size
    );

    let client = InspectClient::from_config(config)?;
    match client.inspect(&ClaimMessage::get_claim_list()).await {
        Ok(Some(text)) => match serde_json::from_str::<Vec<ClaimSummary>>(&text) {
            Ok(claims) => println!("\n  Inspect reachable, {} claims.", claims.len()),
            Err(_) => println!("\n  Inspect reachable."),
        },
        Ok(None) => println!("\n  Inspect reachable, no claims reported."),
        Err(e) => println!("\n  Inspect unreachable: {e}"),
    }

    Ok(())
}

fn known_chains(config: &RollclaimConfig) -> String {
    if config.chains.is_empty() {
        return "(none)".to_string();
    }
    config
        .chains
        .iter()
        .map(|(id, chain)| format!("{id} ({})", chain.label))
        .collect::<Vec<_>>()
        .join(", ")
}
