//! Data set processing.

use anyhow::{Context, Result};

use rollclaim_core::config::RollclaimConfig;
use rollclaim_services::{
    process_csv, ClaimSender, ContentSource, InspectClient, NativeProcessor, ProcessedCsv,
    WasmLoader,
};

use super::banner;

pub async fn cmd_process(
    config: &RollclaimConfig,
    source: &ContentSource,
    use_wasm: bool,
    claim: bool,
) -> Result<()> {
    let csv = source
        .load(&reqwest::Client::new(), &config.ipfs.gateway)
        .await
        .with_context(|| format!("failed to load data from {source}"))?;

    let result = if use_wasm {
        let loader = WasmLoader::new();
        let inspect = InspectClient::from_config(config)?;
        let processor = loader
            .load(&inspect)
            .await
            .context("failed to load the processing module")?;
        process_csv(processor.as_ref(), &csv)
    } else {
        process_csv(&NativeProcessor, &csv)
    };
    let failure = result.as_ref().err().map(ToString::to_string);
    let processed: ProcessedCsv = result.unwrap_or_default();

    banner("Data Set");
    println!("  Source    : {source}");
    println!("  Size      : {} bytes", csv.len());
    println!("  Processor : {}", if use_wasm { "application module" } else { "native" });
    println!("  CID       : {}", processed.cid);
    println!("  Value     : {}", processed.value);
    if let Some(reason) = &failure {
        println!("\n  Processing failed: {reason}");
    }

    if claim {
        if failure.is_some() {
            anyhow::bail!("not claiming a data set that failed to process");
        }
        let tx = ClaimSender::from_config(config)
            .context("failed to set up input submission")?
            .claim(&processed.cid, processed.value)
            .await
            .context("claim was not submitted")?;
        println!("\n  Claim submitted in {tx}");
    }
    Ok(())
}
