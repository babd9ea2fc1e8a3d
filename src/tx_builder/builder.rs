//! Size-aware transaction builder
//!
//! A `TxBuilder` collects instructions for one V0 transaction together with
//! the fee payer, address lookup tables and blockhash. It can report its own
//! wire size at any point, which is what the packer uses to decide when a
//! transaction is full, and finalises into a [`TxBuildOutput`] only when the
//! result stays within the packet limit.

use crate::compat::{transaction_size, unsigned_transaction};
use crate::tx_builder::errors::TransactionBuilderError;
use crate::tx_builder::instructions::{
    is_set_compute_unit_limit, sanity_check_compute_budget,
};
use crate::tx_builder::output::TxBuildOutput;
use solana_sdk::{
    compute_budget::ComputeBudgetInstruction,
    hash::Hash,
    instruction::Instruction,
    message::{v0::Message as MessageV0, AddressLookupTableAccount, VersionedMessage},
    pubkey::Pubkey,
};

/// Maximum serialized transaction size (Solana packet data size)
pub const MAX_TRANSACTION_SIZE: usize = 1232;

#[derive(Debug, Clone)]
pub struct TxBuilder {
    payer: Pubkey,
    instructions: Vec<Instruction>,
    lookup_tables: Vec<AddressLookupTableAccount>,
    blockhash: Option<Hash>,
    size_limit: usize,
}

impl TxBuilder {
    pub fn new(payer: Pubkey) -> Self {
        Self {
            payer,
            instructions: Vec::new(),
            lookup_tables: Vec::new(),
            blockhash: None,
            size_limit: MAX_TRANSACTION_SIZE,
        }
    }

    pub fn with_size_limit(mut self, size_limit: usize) -> Self {
        self.size_limit = size_limit;
        self
    }

    /// Append an instruction
    pub fn add(mut self, ix: Instruction) -> Self {
        self.instructions.push(ix);
        self
    }

    pub fn push(&mut self, ix: Instruction) {
        self.instructions.push(ix);
    }

    /// Remove the last instruction
    pub fn pop(&mut self) -> Option<Instruction> {
        self.instructions.pop()
    }

    pub fn extend(mut self, ixs: impl IntoIterator<Item = Instruction>) -> Self {
        self.instructions.extend(ixs);
        self
    }

    /// Insert an instruction at the front
    pub fn prepend(mut self, ix: Instruction) -> Self {
        self.instructions.insert(0, ix);
        self
    }

    /// Split into `[..index]` and `[index..]`; both halves keep payer, lookup
    /// tables, blockhash and size limit
    pub fn split_by_index(mut self, index: usize) -> (Self, Self) {
        let tail = self.instructions.split_off(index.min(self.instructions.len()));
        let rest = Self {
            instructions: tail,
            ..self.clone()
        };
        (self, rest)
    }

    pub fn set_address_lookup_tables(mut self, lookup_tables: Vec<AddressLookupTableAccount>) -> Self {
        self.lookup_tables = lookup_tables;
        self
    }

    pub fn set_blockhash(mut self, blockhash: Hash) -> Self {
        self.blockhash = Some(blockhash);
        self
    }

    pub fn payer(&self) -> &Pubkey {
        &self.payer
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    pub fn lookup_tables(&self) -> &[AddressLookupTableAccount] {
        &self.lookup_tables
    }

    pub fn blockhash(&self) -> Option<Hash> {
        self.blockhash
    }

    pub fn size_limit(&self) -> usize {
        self.size_limit
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    fn compile(&self, blockhash: Hash) -> Result<VersionedMessage, TransactionBuilderError> {
        MessageV0::try_compile(&self.payer, &self.instructions, &self.lookup_tables, blockhash)
            .map(VersionedMessage::V0)
            .map_err(|e| TransactionBuilderError::Compile(e.to_string()))
    }

    /// Wire size of the transaction this builder would produce.
    ///
    /// The blockhash does not affect the size, so an unset one is fine here.
    pub fn serialized_size(&self) -> Result<usize, TransactionBuilderError> {
        let message = self.compile(self.blockhash.unwrap_or_default())?;
        transaction_size(&unsigned_transaction(message))
            .map_err(|e| TransactionBuilderError::internal(format!("Failed to size transaction: {}", e)))
    }

    /// Whether the current instructions fit within the size limit
    pub fn fits_in_one_transaction(&self) -> bool {
        self.serialized_size()
            .is_ok_and(|size| size <= self.size_limit)
    }

    /// Replace the `set_compute_unit_limit` in slot 0 with `units`
    pub fn replace_compute_unit_limit(self, units: u32) -> Result<Self, TransactionBuilderError> {
        if !self.instructions.first().is_some_and(is_set_compute_unit_limit) {
            return Err(TransactionBuilderError::invalid_order(
                "Expected set_compute_unit_limit at position 0",
            ));
        }
        let (_, rest) = self.split_by_index(1);
        Ok(rest.prepend(ComputeBudgetInstruction::set_compute_unit_limit(units)))
    }

    /// Finalise into an unsigned transaction.
    ///
    /// # Errors
    ///
    /// - `Blockhash` if no blockhash was set
    /// - `Compile` if the message cannot be compiled
    /// - `Oversize` if the transaction exceeds the size limit
    pub fn build(&self) -> Result<TxBuildOutput, TransactionBuilderError> {
        let blockhash = self.blockhash.ok_or_else(|| {
            TransactionBuilderError::blockhash_unavailable("No blockhash set on transaction builder")
        })?;

        if !self.instructions.is_empty() {
            sanity_check_compute_budget(&self.instructions)?;
        }

        let tx = unsigned_transaction(self.compile(blockhash)?);
        let size = transaction_size(&tx)
            .map_err(|e| TransactionBuilderError::internal(format!("Failed to size transaction: {}", e)))?;
        if size > self.size_limit {
            return Err(TransactionBuilderError::Oversize {
                size,
                limit: self.size_limit,
            });
        }

        Ok(TxBuildOutput::new(tx))
    }
}
