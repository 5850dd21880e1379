//! Input submission commands.

use anyhow::{Context, Result};

use rollclaim_core::config::RollclaimConfig;
use rollclaim_services::{ClaimSender, ContentSource};

use super::banner;

fn sender(config: &RollclaimConfig) -> Result<ClaimSender<rollclaim_services::JsonRpcSink>> {
    ClaimSender::from_config(config).context("failed to set up input submission")
}

pub async fn cmd_claim(config: &RollclaimConfig, id: &str, value: u64) -> Result<()> {
    let tx = sender(config)?
        .claim(id, value)
        .await
        .context("claim was not submitted")?;
    println!("Claim {id} = {value} submitted in {tx}");
    Ok(())
}

pub async fn cmd_finalize(config: &RollclaimConfig, id: &str) -> Result<()> {
    let tx = sender(config)?
        .finalize(id)
        .await
        .context("finalize was not submitted")?;
    println!("Finalize {id} submitted in {tx}");
    Ok(())
}

pub async fn cmd_dispute(config: &RollclaimConfig, id: &str) -> Result<()> {
    let tx = sender(config)?
        .dispute(id)
        .await
        .context("dispute was not submitted")?;
    println!("Dispute {id} submitted in {tx}");
    Ok(())
}

pub async fn cmd_validate(config: &RollclaimConfig, id: &str, source: &ContentSource) -> Result<()> {
    let csv = source
        .load(&reqwest::Client::new(), &config.ipfs.gateway)
        .await
        .with_context(|| format!("failed to load data from {source}"))?;

    let submission = sender(config)?
        .validate(id, &csv)
        .await
        .context("validation was not submitted")?;

    banner(&format!("Validate {id}"));
    println!("  Data    : {source} ({} bytes)", csv.len());
    println!("  Chunked : {}", submission.chunked);
    for outcome in &submission.outcomes {
        match &outcome.result {
            Ok(tx) => println!("  chunk {:>4} : {tx}", outcome.index),
            Err(e) => println!("  chunk {:>4} : FAILED ({e})", outcome.index),
        }
    }

    if !submission.all_sent() {
        anyhow::bail!(
            "{} of {} chunks not sent: {:?}",
            submission.failed_indices().len(),
            submission.outcomes.len(),
            submission.failed_indices()
        );
    }
    Ok(())
}
