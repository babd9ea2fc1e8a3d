//! Candy machine mint preparation library
//!
//! Turns a candy guard configuration into ready-to-sign mint transactions:
//! guard group selection, per-unit guard arguments, allowList proof routes,
//! size-bounded packing and simulation-based compute budgets.

pub mod allowlist;
pub mod compat;
pub mod config;
pub mod guards;
pub mod inventory;
pub mod mint_args;
pub mod program;
pub mod route;
pub mod session;
pub mod structured_logging;
pub mod test_utils;
pub mod tx_builder;
pub mod types;

// Re-export commonly used types
pub use allowlist::AllowlistStore;
pub use config::MintConfig;
pub use guards::{select_guard, CandyGuardConfig, GuardGroup, GuardKind, GuardSet};
pub use inventory::OwnedAssetInventory;
pub use mint_args::{build_mint_args, MintArgs, MintArgsBatch};
pub use session::{MintPlan, MintRequest, MintServices, MintSession};
pub use solana_sdk::{pubkey::Pubkey, signature::Signature};
pub use tx_builder::{TransactionBuilderError, TxBuildOutput, TxBuilder};
