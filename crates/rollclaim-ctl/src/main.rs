//! rollclaim-ctl — command-line client for a claim rollup application.

mod cmd;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rollclaim_core::config::RollclaimConfig;
use rollclaim_services::ContentSource;

/// Claim, dispute and validate data sets on a rollup application.
#[derive(Parser, Debug)]
#[command(name = "rollclaim-ctl")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Chain id to connect to (overrides network.chain_id)
    #[arg(long, global = true)]
    chain: Option<String>,

    /// Application address (overrides dapp.address)
    #[arg(long, global = true)]
    dapp: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the active chain, application and inspect reachability
    Status,
    /// Manage the config file
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Send an input to the application
    #[command(subcommand)]
    Send(SendCommand),
    /// Query the application's state
    #[command(subcommand)]
    Inspect(InspectCommand),
    /// Work with data sets
    #[command(subcommand)]
    Data(DataCommand),
    /// Work with the application's processing module
    #[command(subcommand)]
    Wasm(WasmCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config file if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum SendCommand {
    /// Claim a data set by CID with a permillion value
    Claim { id: String, value: u64 },
    /// Finalize an open claim
    Finalize { id: String },
    /// Dispute an open claim
    Dispute { id: String },
    /// Validate a disputed claim with its data set
    Validate {
        id: String,
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Subcommand, Debug)]
enum InspectCommand {
    /// List every claim
    Claims {
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },
    /// Show one claim
    Claim {
        id: String,
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },
    /// Show a user's record
    User {
        address: String,
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
enum DataCommand {
    /// Compute the CID and value of a data set
    Process {
        #[command(flatten)]
        source: SourceArgs,
        /// Use the application's processing module instead of the native rules
        #[arg(long)]
        wasm: bool,
        /// Submit a claim with the computed values
        #[arg(long)]
        claim: bool,
    },
}

#[derive(Subcommand, Debug)]
enum WasmCommand {
    /// Fetch and instantiate the application's processing module
    Load,
}

/// Where to read a data set from.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Local CSV file
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
    /// CID fetched through the configured IPFS gateway
    #[arg(long, value_name = "CID")]
    ipfs: Option<String>,
}

impl SourceArgs {
    fn source(&self) -> Result<ContentSource> {
        match (&self.file, &self.ipfs) {
            (Some(path), _) => Ok(ContentSource::File(path.clone())),
            (None, Some(cid)) => Ok(ContentSource::Ipfs(cid.clone())),
            (None, None) => anyhow::bail!("one of --file or --ipfs is required"),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = RollclaimConfig::load().context("failed to load config")?;
    if let Some(chain) = cli.chain {
        config.network.chain_id = chain;
    }
    if let Some(dapp) = cli.dapp {
        config.dapp.address = dapp;
    }

    match cli.command.unwrap_or(Command::Status) {
        Command::Status => cmd::status::cmd_status(&config).await,
        Command::Config(ConfigCommand::Init) => cmd::config::cmd_init(),
        Command::Config(ConfigCommand::Show) => cmd::config::cmd_show(&config),
        Command::Send(SendCommand::Claim { id, value }) => {
            cmd::send::cmd_claim(&config, &id, value).await
        }
        Command::Send(SendCommand::Finalize { id }) => cmd::send::cmd_finalize(&config, &id).await,
        Command::Send(SendCommand::Dispute { id }) => cmd::send::cmd_dispute(&config, &id).await,
        Command::Send(SendCommand::Validate { id, source }) => {
            cmd::send::cmd_validate(&config, &id, &source.source()?).await
        }
        Command::Inspect(InspectCommand::Claims { watch }) => {
            cmd::inspect::cmd_claims(&config, watch).await
        }
        Command::Inspect(InspectCommand::Claim { id, watch }) => {
            cmd::inspect::cmd_claim(&config, &id, watch).await
        }
        Command::Inspect(InspectCommand::User { address, watch }) => {
            cmd::inspect::cmd_user(&config, &address, watch).await
        }
        Command::Data(DataCommand::Process {
            source,
            wasm,
            claim,
        }) => cmd::data::cmd_process(&config, &source.source()?, wasm, claim).await,
        Command::Wasm(WasmCommand::Load) => cmd::wasm::cmd_load(&config).await,
    }
}
