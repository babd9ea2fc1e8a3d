//! candy-mint operator CLI
//!
//! Inspect what a mint would look like without a wallet:
//! - `plan`: guard group selection and per-unit mint arguments
//! - `merkle`: allowlist merkle root and proofs
//! - `route-status`: whether a wallet's allowList proof is already stored

use anyhow::{Context, Result};
use candy_mint::{
    allowlist::{leaf_hash, MerkleTree},
    program::{AllowListProofSeeds, AllowListProofSource},
    structured_logging::MintLogger,
    AllowlistStore, CandyGuardConfig, MintConfig, OwnedAssetInventory,
};
use clap::{Parser, Subcommand};
use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Candy machine mint preparation", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "candy-mint.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Select a guard group and build the mint arguments for N units
    Plan {
        /// Candy guard snapshot (JSON)
        #[arg(long)]
        guard: PathBuf,

        /// Owned asset inventory (JSON)
        #[arg(long)]
        inventory: Option<PathBuf>,

        /// Allowlists by group label (JSON)
        #[arg(long)]
        allowlists: Option<PathBuf>,

        /// Guard group label
        #[arg(short, long, default_value = "default")]
        label: String,

        /// Number of units to mint
        #[arg(short, long, default_value_t = 1)]
        quantity: usize,
    },

    /// Print the merkle root of an allowlist, and a proof for one address
    Merkle {
        /// Allowlists by group label (JSON)
        #[arg(long)]
        allowlists: PathBuf,

        /// Guard group label
        #[arg(short, long)]
        label: String,

        /// Address to prove
        #[arg(short, long)]
        address: Option<Pubkey>,
    },

    /// Check whether a wallet's allowList proof account exists
    RouteStatus {
        /// Allowlists by group label (JSON)
        #[arg(long)]
        allowlists: PathBuf,

        /// Guard group label
        #[arg(short, long)]
        label: String,

        #[arg(long)]
        candy_machine: Pubkey,

        /// Candy guard (mint authority of the candy machine)
        #[arg(long)]
        candy_guard: Pubkey,

        /// Wallet address
        #[arg(long)]
        user: Pubkey,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.json_logs)?;

    let config = MintConfig::load(Some(args.config.as_path()))
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    match args.command {
        Commands::Plan {
            guard,
            inventory,
            allowlists,
            label,
            quantity,
        } => plan(guard, inventory, allowlists, &label, quantity),
        Commands::Merkle {
            allowlists,
            label,
            address,
        } => merkle(allowlists, &label, address),
        Commands::RouteStatus {
            allowlists,
            label,
            candy_machine,
            candy_guard,
            user,
        } => route_status(&config, allowlists, &label, candy_machine, candy_guard, user).await,
    }
}

/// Initialize logging subsystem
fn init_logging(verbose: bool, json_logs: bool) -> Result<()> {
    let env_filter = if verbose {
        "candy_mint=debug,info"
    } else {
        "candy_mint=info,warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| env_filter.into());

    // Logs go to stderr so stdout stays machine-readable
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    Ok(())
}

fn load_allowlists(path: Option<PathBuf>) -> Result<AllowlistStore> {
    match path {
        Some(path) => AllowlistStore::load(path),
        None => Ok(AllowlistStore::new()),
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn plan(
    guard: PathBuf,
    inventory: Option<PathBuf>,
    allowlists: Option<PathBuf>,
    label: &str,
    quantity: usize,
) -> Result<()> {
    let raw = std::fs::read_to_string(&guard)
        .with_context(|| format!("Failed to read guard snapshot {}", guard.display()))?;
    let candy_guard = CandyGuardConfig::from_json(&raw)
        .with_context(|| format!("Failed to parse guard snapshot {}", guard.display()))?;
    let inventory = match inventory {
        Some(path) => OwnedAssetInventory::load(path)?,
        None => OwnedAssetInventory::default(),
    };
    let allowlists = load_allowlists(allowlists)?;

    let logger = MintLogger::for_new_session();
    let group = candy_mint::select_guard(label, Some(&candy_guard), &logger);
    let batch = candy_mint::build_mint_args(&group, &allowlists, inventory, quantity, &logger);

    info!(
        context_id = %logger.context_id(),
        label = %group.label,
        records = batch.records.len(),
        diagnostics = batch.diagnostics.len(),
        "Mint plan ready"
    );

    print_json(&json!({
        "group": group.label,
        "activeGuards": group.guards.as_ref().map(|guards| guards.active_kinds()).unwrap_or_default(),
        "records": batch.records,
        "diagnostics": batch.diagnostics,
        "remainingInventory": batch.inventory,
    }))
}

fn merkle(allowlists: PathBuf, label: &str, address: Option<Pubkey>) -> Result<()> {
    let store = AllowlistStore::load(allowlists)?;
    let root = store
        .merkle_root(label)
        .with_context(|| format!("No allowlist entries under label {}", label))?;

    let mut output = json!({
        "label": label,
        "merkleRoot": hex::encode(root),
    });

    if let Some(address) = address {
        let proof = store.merkle_proof(label, &address).unwrap_or_default();
        let verified = MerkleTree::verify(&proof, &root, &leaf_hash(&address.to_string()));
        output["address"] = json!(address.to_string());
        output["proof"] = json!(proof.iter().map(hex::encode).collect::<Vec<_>>());
        output["verified"] = json!(verified);
    }

    print_json(&output)
}

async fn route_status(
    config: &MintConfig,
    allowlists: PathBuf,
    label: &str,
    candy_machine: Pubkey,
    candy_guard: Pubkey,
    user: Pubkey,
) -> Result<()> {
    let store = AllowlistStore::load(allowlists)?;
    let merkle_root = store
        .merkle_root(label)
        .with_context(|| format!("No allowlist entries under label {}", label))?;

    let seeds = AllowListProofSeeds {
        merkle_root,
        user,
        candy_guard,
        candy_machine,
    };
    let (proof_pda, _) = seeds.find_pda();

    let client = config.rpc_client()?;
    let exists = client
        .proof_exists(&proof_pda)
        .await
        .with_context(|| format!("Failed to look up proof account {}", proof_pda))?;

    info!(endpoint = %config.rpc.endpoint, proof_pda = %proof_pda, exists, "Proof lookup done");

    print_json(&json!({
        "label": label,
        "proofAccount": proof_pda.to_string(),
        "exists": exists,
        "routeNeeded": !exists,
    }))
}
