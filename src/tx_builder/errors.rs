//! Error types for mint transaction preparation
//!
//! Most failures in this crate are soft: a missing allowlist, an unsatisfied
//! guard or a failed simulation degrade to diagnostics and fallbacks. The
//! variants below cover the cases where a transaction physically cannot be
//! produced, plus the RPC and configuration failures surfaced by the
//! collaborators behind the crate's traits.

use thiserror::Error;

/// Error type for all transaction building operations
#[derive(Error, Debug)]
pub enum TransactionBuilderError {
    /// An instruction constructor (candy guard program client) refused its input
    #[error("Instruction build error (program={program}): {reason}")]
    InstructionBuild {
        /// The program the instruction targets
        program: String,
        /// Detailed reason for the failure
        reason: String,
    },

    /// Transaction simulation failed at the transport level
    #[error("Simulation failed: {0}")]
    Simulation(String),

    /// No blockhash was set on a builder before finalising it
    #[error("Blockhash error: {0}")]
    Blockhash(String),

    /// The accumulated instructions exceed the single-transaction size ceiling
    #[error("Transaction too large: {size} bytes exceeds limit of {limit} bytes")]
    Oversize {
        /// Serialized size of the candidate transaction
        size: usize,
        /// Configured ceiling
        limit: usize,
    },

    /// The message could not be compiled (account key overflow, bad lookup table, ...)
    #[error("Message compile error: {0}")]
    Compile(String),

    /// Compute budget instructions are missing or out of place
    #[error("Invalid instruction order: {0}")]
    InvalidInstructionOrder(String),

    /// RPC client error
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Configuration or validation error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal invariant violation
    #[error("Internal error: {0}")]
    Internal(String),
}

// Convenience constructors for common error scenarios
impl TransactionBuilderError {
    /// Create an instruction build error for a specific program
    pub fn instruction_failed(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InstructionBuild {
            program: program.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing-blockhash error
    pub fn blockhash_unavailable(reason: impl Into<String>) -> Self {
        Self::Blockhash(reason.into())
    }

    /// Create an invalid instruction order error
    pub fn invalid_order(reason: impl Into<String>) -> Self {
        Self::InvalidInstructionOrder(reason.into())
    }

    /// Create an internal error
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal(reason.into())
    }
}
