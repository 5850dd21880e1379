//! Config file commands.

use anyhow::{Context, Result};

use rollclaim_core::config::RollclaimConfig;

pub fn cmd_init() -> Result<()> {
    let existed = RollclaimConfig::file_path().exists();
    let path = RollclaimConfig::write_default_if_missing().context("failed to write config")?;
    if existed {
        println!("Config already present at {}", path.display());
    } else {
        println!("Wrote default config to {}", path.display());
    }
    Ok(())
}

pub fn cmd_show(config: &RollclaimConfig) -> Result<()> {
    let text = toml::to_string_pretty(config).context("failed to serialize config")?;
    println!("# {}", RollclaimConfig::file_path().display());
    print!("{text}");
    Ok(())
}
