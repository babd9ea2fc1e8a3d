//! Finalised, unsigned transaction handed to the wallet
//!
//! A `TxBuildOutput` is what a `TxBuilder` turns into once its instructions,
//! lookup tables and blockhash are fixed. The transaction carries default
//! (all-zero) signatures; the wallet and the freshly generated asset
//! keypairs fill them in.

use crate::compat::{get_required_signers, transaction_size};
use crate::tx_builder::errors::TransactionBuilderError;
use solana_sdk::{pubkey::Pubkey, transaction::VersionedTransaction};

/// Unsigned transaction plus the signers it still needs
#[derive(Debug, Clone)]
pub struct TxBuildOutput {
    /// The built transaction ready for signing
    pub tx: VersionedTransaction,

    /// Required signers (extracted from the message header), fee payer first
    pub required_signers: Vec<Pubkey>,
}

impl TxBuildOutput {
    pub fn new(tx: VersionedTransaction) -> Self {
        let required_signers = get_required_signers(&tx.message).to_vec();
        Self {
            tx,
            required_signers,
        }
    }

    /// Fee payer of the transaction
    pub fn payer(&self) -> Option<&Pubkey> {
        self.required_signers.first()
    }

    /// Wire size of the transaction once signed
    pub fn size(&self) -> Result<usize, TransactionBuilderError> {
        transaction_size(&self.tx)
            .map_err(|e| TransactionBuilderError::internal(format!("Failed to size transaction: {}", e)))
    }

    /// Check whether `signer` must sign this transaction
    pub fn needs_signature_from(&self, signer: &Pubkey) -> bool {
        self.required_signers.contains(signer)
    }
}
