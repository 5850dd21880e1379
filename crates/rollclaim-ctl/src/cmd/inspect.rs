//! Inspect commands, optionally polling.

use std::time::Duration;

use anyhow::{Context, Result};

use rollclaim_core::config::RollclaimConfig;
use rollclaim_core::model::{Claim, ClaimSummary, User};
use rollclaim_core::ClaimMessage;
use rollclaim_services::{InspectClient, InspectView, ViewUpdate};

use super::banner;

pub async fn cmd_claims(config: &RollclaimConfig, watch: Option<u64>) -> Result<()> {
    run(config, ClaimMessage::get_claim_list(), watch, print_claims).await
}

pub async fn cmd_claim(config: &RollclaimConfig, id: &str, watch: Option<u64>) -> Result<()> {
    let message = ClaimMessage::show_claim(id)?;
    run(config, message, watch, |text| print_claim(id, text)).await
}

pub async fn cmd_user(config: &RollclaimConfig, address: &str, watch: Option<u64>) -> Result<()> {
    let message = ClaimMessage::show_user(address)?;
    run(config, message, watch, |text| print_user(address, text)).await
}

/// Query once, or every `watch` seconds until interrupted.
async fn run(
    config: &RollclaimConfig,
    message: ClaimMessage,
    watch: Option<u64>,
    render: impl Fn(&str),
) -> Result<()> {
    let client = InspectClient::from_config(config).context("no inspect client")?;

    let Some(secs) = watch else {
        match client
            .inspect(&message)
            .await
            .with_context(|| format!("{} query failed", message.action))?
        {
            Some(text) => render(&text),
            None => println!("No data reported."),
        }
        return Ok(());
    };

    let mut view = InspectView::new(config.inspect.on_empty);
    let mut ticker = tokio::time::interval(Duration::from_secs(secs.max(1)));
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
        let result = match client.inspect(&message).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(action = %message.action, error = %e, "inspect poll failed");
                continue;
            }
        };
        match view.apply(result) {
            ViewUpdate::Replaced => {
                if let Some(text) = view.shown() {
                    render(text);
                }
            }
            ViewUpdate::Cleared => println!("No data reported."),
            ViewUpdate::Retained => {
                tracing::debug!(action = %message.action, "no reports, keeping last result")
            }
            ViewUpdate::Unchanged => {}
        }
    }
}

fn print_claims(text: &str) {
    let Ok(claims) = serde_json::from_str::<Vec<ClaimSummary>>(text) else {
        println!("{text}");
        return;
    };

    banner(&format!("Claims ({})", claims.len()));
    if claims.is_empty() {
        println!("  No claims yet.");
    }
    for c in &claims {
        println!("  {:<12} {:>9}  {}", format!("{:?}", c.status).to_lowercase(), c.value, c.id);
    }
}

fn print_claim(id: &str, text: &str) {
    let Ok(claim) = serde_json::from_str::<Claim>(text) else {
        println!("{text}");
        return;
    };

    banner(&format!("Claim {id}"));
    println!("  Status      : {:?}", claim.status);
    println!("  Value       : {}", claim.value);
    println!("  Claimant    : {}", claim.user_address);
    if !claim.disputing_user_address.is_empty() {
        println!("  Disputed by : {}", claim.disputing_user_address);
    }
    println!("  Last edited : {}", claim.last_edited);
    if let Some(progress) = &claim.data_chunks {
        let received = progress.chunks.as_ref().map_or(0, Vec::len);
        println!(
            "  Validation  : {received}/{} chunks, {} bytes",
            progress.total_chunks, progress.size
        );
    }
    if claim.status.is_settled() {
        println!("\n  Claim is settled.");
    }
}

fn print_user(address: &str, text: &str) {
    let Ok(user) = serde_json::from_str::<User>(text) else {
        println!("{text}");
        return;
    };

    banner(&format!("User {address}"));
    println!("  Claims   : {} correct of {}", user.correct_claims, user.total_claims);
    println!("  Disputes : {} won of {}", user.won_disputes, user.total_disputes);
    for id in user.open_claims.keys() {
        println!("  open claim   : {id}");
    }
    for id in user.open_disputes.keys() {
        println!("  open dispute : {id}");
    }
}
