//! Greedy packing of instructions into size-bounded transactions
//!
//! The packer walks the instruction list once. Each instruction is appended
//! speculatively to the open builder; when the builder no longer fits, the
//! instruction is taken back out, the builder is sealed and the instruction
//! is retried against a fresh builder. A fresh builder always accepts its
//! first payload instruction, so an instruction that is too large on its own
//! ends up alone in its builder instead of looping forever. `TxBuilder::build`
//! rejects that builder later.

use crate::tx_builder::builder::TxBuilder;
use solana_sdk::{instruction::Instruction, message::AddressLookupTableAccount, pubkey::Pubkey};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Outcome of one packing step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackStep {
    /// Instruction appended to the open builder
    Appended,
    /// Open builder was full; it has been sealed and the instruction requeued
    Sealed,
    /// Input exhausted; the last builder has been sealed
    Finished,
}

/// Packing state: instructions still to place, the open builder, and the
/// builders already sealed
#[derive(Debug)]
pub struct Packer {
    template: TxBuilder,
    remaining: VecDeque<Instruction>,
    current: TxBuilder,
    current_payload: usize,
    sealed: Vec<TxBuilder>,
    finished: bool,
}

impl Packer {
    /// Start packing `instructions`.
    ///
    /// `template` supplies payer, lookup tables, blockhash and size limit for
    /// every builder; its own instructions (typically the compute-budget
    /// prelude) are placed at the front of each builder.
    pub fn new(template: TxBuilder, instructions: Vec<Instruction>) -> Self {
        Self {
            current: template.clone(),
            template,
            remaining: instructions.into(),
            current_payload: 0,
            sealed: Vec::new(),
            finished: false,
        }
    }

    pub fn sealed(&self) -> &[TxBuilder] {
        &self.sealed
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn seal(&mut self) {
        let full = std::mem::replace(&mut self.current, self.template.clone());
        debug!(
            index = self.sealed.len(),
            instructions = full.len(),
            payload = self.current_payload,
            "Sealed packed transaction"
        );
        self.sealed.push(full);
        self.current_payload = 0;
    }

    /// Advance by one instruction
    pub fn step(&mut self) -> PackStep {
        if self.finished {
            return PackStep::Finished;
        }

        let Some(ix) = self.remaining.pop_front() else {
            if self.current_payload > 0 {
                self.seal();
            }
            self.finished = true;
            return PackStep::Finished;
        };

        let fresh = self.current_payload == 0;
        self.current.push(ix);

        if self.current.fits_in_one_transaction() {
            self.current_payload += 1;
            return PackStep::Appended;
        }

        if fresh {
            warn!(
                size_limit = self.current.size_limit(),
                "Instruction does not fit in an empty transaction"
            );
            self.current_payload += 1;
            return PackStep::Appended;
        }

        if let Some(ix) = self.current.pop() {
            self.remaining.push_front(ix);
        }
        self.seal();
        PackStep::Sealed
    }

    /// Run to completion and return the sealed builders
    pub fn finish(mut self) -> Vec<TxBuilder> {
        while self.step() != PackStep::Finished {}
        self.sealed
    }
}

/// Pack `instructions` into the fewest transactions of at most `size_limit`
/// bytes, attaching `lookup_tables` to each
pub fn pack(
    payer: Pubkey,
    instructions: Vec<Instruction>,
    lookup_tables: Vec<AddressLookupTableAccount>,
    size_limit: usize,
) -> Vec<TxBuilder> {
    let template = TxBuilder::new(payer)
        .set_address_lookup_tables(lookup_tables)
        .with_size_limit(size_limit);
    Packer::new(template, instructions).finish()
}

/// Like [`pack`], with `prelude` at the front of every transaction
pub fn pack_with_prelude(
    payer: Pubkey,
    prelude: Vec<Instruction>,
    instructions: Vec<Instruction>,
    lookup_tables: Vec<AddressLookupTableAccount>,
    size_limit: usize,
) -> Vec<TxBuilder> {
    let template = TxBuilder::new(payer)
        .extend(prelude)
        .set_address_lookup_tables(lookup_tables)
        .with_size_limit(size_limit);
    Packer::new(template, instructions).finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx_builder::builder::MAX_TRANSACTION_SIZE;
    use crate::tx_builder::instructions::{compute_budget_prelude, is_set_compute_unit_limit};
    use solana_sdk::instruction::AccountMeta;

    fn data_ix(payer: &Pubkey, len: usize) -> Instruction {
        Instruction::new_with_bytes(
            Pubkey::new_unique(),
            &vec![1u8; len],
            vec![AccountMeta::new(*payer, true)],
        )
    }

    #[test]
    fn test_empty_input_packs_to_nothing() {
        assert!(pack(Pubkey::new_unique(), vec![], vec![], MAX_TRANSACTION_SIZE).is_empty());
    }

    #[test]
    fn test_small_instructions_share_one_transaction() {
        let payer = Pubkey::new_unique();
        let ixs: Vec<_> = (0..4).map(|_| data_ix(&payer, 20)).collect();

        let builders = pack(payer, ixs.clone(), vec![], MAX_TRANSACTION_SIZE);

        assert_eq!(builders.len(), 1);
        assert_eq!(builders[0].instructions(), ixs.as_slice());
    }

    #[test]
    fn test_overflow_starts_new_transaction() {
        let payer = Pubkey::new_unique();
        let ixs: Vec<_> = (0..3).map(|_| data_ix(&payer, 500)).collect();

        let builders = pack(payer, ixs.clone(), vec![], MAX_TRANSACTION_SIZE);

        assert_eq!(builders.len(), 2);
        assert_eq!(builders[0].len(), 2);
        assert_eq!(builders[1].len(), 1);
        let flattened: Vec<Instruction> = builders
            .into_iter()
            .flat_map(TxBuilder::into_instructions)
            .collect();
        assert_eq!(flattened, ixs);
    }

    #[test]
    fn test_oversize_instruction_is_isolated() {
        let payer = Pubkey::new_unique();
        let ixs = vec![
            data_ix(&payer, 10),
            data_ix(&payer, 1400),
            data_ix(&payer, 10),
        ];

        let builders = pack(payer, ixs, vec![], MAX_TRANSACTION_SIZE);

        assert_eq!(builders.len(), 3);
        assert!(builders[0].fits_in_one_transaction());
        assert!(!builders[1].fits_in_one_transaction());
        assert_eq!(builders[1].len(), 1);
        assert!(builders[2].fits_in_one_transaction());
    }

    #[test]
    fn test_prelude_leads_every_transaction() {
        let payer = Pubkey::new_unique();
        let ixs: Vec<_> = (0..5).map(|_| data_ix(&payer, 400)).collect();

        let builders = pack_with_prelude(
            payer,
            compute_budget_prelude(1_400_000, 1001),
            ixs,
            vec![],
            MAX_TRANSACTION_SIZE,
        );

        assert!(builders.len() > 1);
        for builder in &builders {
            assert!(is_set_compute_unit_limit(&builder.instructions()[0]));
            assert!(builder.len() > 2);
        }
    }

    #[test]
    fn test_step_sequence() {
        let payer = Pubkey::new_unique();
        let template = TxBuilder::new(payer);
        let mut packer = Packer::new(
            template,
            vec![data_ix(&payer, 700), data_ix(&payer, 700)],
        );

        assert_eq!(packer.step(), PackStep::Appended);
        assert_eq!(packer.step(), PackStep::Sealed);
        assert_eq!(packer.sealed().len(), 1);
        assert_eq!(packer.remaining(), 1);
        assert_eq!(packer.step(), PackStep::Appended);
        assert_eq!(packer.step(), PackStep::Finished);
        assert!(packer.is_finished());
        assert_eq!(packer.sealed().len(), 2);
        assert_eq!(packer.step(), PackStep::Finished);
    }
}
