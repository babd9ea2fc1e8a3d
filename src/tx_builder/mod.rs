//! Transaction building for candy machine mints
//!
//! The component is split into focused modules:
//! - **errors**: Error taxonomy for transaction construction
//! - **instructions**: Compute-budget prelude and ordering validation
//! - **builder**: Size-aware `TxBuilder`
//! - **packer**: Greedy packing of instructions into size-bounded builders
//! - **simulate**: Simulation seam and compute-unit estimation
//! - **output**: Finalised unsigned transaction plus required signers
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use candy_mint::tx_builder::{pack_with_prelude, compute_budget_prelude, MAX_TRANSACTION_SIZE};
//! # use solana_sdk::{hash::Hash, instruction::Instruction, pubkey::Pubkey};
//! # fn example(payer: Pubkey, mint_ixs: Vec<Instruction>, blockhash: Hash)
//! #     -> Result<(), candy_mint::tx_builder::TransactionBuilderError> {
//! let builders = pack_with_prelude(
//!     payer,
//!     compute_budget_prelude(1_400_000, 1001),
//!     mint_ixs,
//!     vec![],
//!     MAX_TRANSACTION_SIZE,
//! );
//! for builder in builders {
//!     let output = builder.set_blockhash(blockhash).build()?;
//!     // hand output.tx to the wallet together with output.required_signers
//! }
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub use errors::TransactionBuilderError;

mod builder;
pub mod instructions;
mod output;
mod packer;
mod simulate;

pub use builder::{TxBuilder, MAX_TRANSACTION_SIZE};
pub use instructions::{
    compute_budget_prelude, is_set_compute_unit_limit, requested_unit_limit,
    sanity_check_compute_budget, MAX_COMPUTE_UNIT_LIMIT,
};
pub use output::TxBuildOutput;
pub use packer::{pack, pack_with_prelude, PackStep, Packer};
pub use simulate::{
    ComputeUnitEstimator, SimulationOutcome, TransactionSimulator, DEFAULT_FALLBACK_UNITS,
    SIMULATION_MARGIN_UNITS,
};
