//! Processing module commands.

use anyhow::{Context, Result};

use rollclaim_core::config::RollclaimConfig;
use rollclaim_services::{InspectClient, LoadStatus, WasmLoader};

use super::banner;

pub async fn cmd_load(config: &RollclaimConfig) -> Result<()> {
    let inspect = InspectClient::from_config(config)?;
    let loader = WasmLoader::new();
    let mut status = loader.subscribe();

    banner("Processing Module");
    println!("  Chain  : {}", inspect.chain_id());

    let (result, ()) = tokio::join!(loader.load(&inspect), async {
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            println!("  Status : {current}");
            if !matches!(current, LoadStatus::Loading) {
                break;
            }
        }
    });

    result.context("module not loaded")?;
    Ok(())
}
