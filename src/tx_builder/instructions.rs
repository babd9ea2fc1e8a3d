//! Compute-budget prelude and ordering validation
//!
//! Every mint transaction starts with the same two compute-budget
//! instructions:
//! 1. `set_compute_unit_limit` (slot 0, replaced once the limit is estimated)
//! 2. `set_compute_unit_price`
//!
//! followed by the program instructions.

use crate::tx_builder::errors::TransactionBuilderError;
use solana_sdk::{compute_budget::ComputeBudgetInstruction, instruction::Instruction};

/// Highest compute-unit limit a transaction may request
pub const MAX_COMPUTE_UNIT_LIMIT: u32 = 1_400_000;

/// `ComputeBudgetInstruction` discriminators
const SET_COMPUTE_UNIT_LIMIT_TAG: u8 = 2;
const SET_COMPUTE_UNIT_PRICE_TAG: u8 = 3;

/// Build the `[unit limit, unit price]` prelude
pub fn compute_budget_prelude(unit_limit: u32, micro_lamports: u64) -> Vec<Instruction> {
    vec![
        ComputeBudgetInstruction::set_compute_unit_limit(unit_limit),
        ComputeBudgetInstruction::set_compute_unit_price(micro_lamports),
    ]
}

pub fn is_compute_budget_ix(ix: &Instruction) -> bool {
    ix.program_id == solana_sdk::compute_budget::id()
}

pub fn is_set_compute_unit_limit(ix: &Instruction) -> bool {
    is_compute_budget_ix(ix) && ix.data.first() == Some(&SET_COMPUTE_UNIT_LIMIT_TAG)
}

pub fn is_set_compute_unit_price(ix: &Instruction) -> bool {
    is_compute_budget_ix(ix) && ix.data.first() == Some(&SET_COMPUTE_UNIT_PRICE_TAG)
}

/// Unit limit requested by a `set_compute_unit_limit` instruction
pub fn requested_unit_limit(ix: &Instruction) -> Option<u32> {
    if !is_set_compute_unit_limit(ix) {
        return None;
    }
    let bytes: [u8; 4] = ix.data.get(1..5)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

/// Validate compute-budget placement (debug/test only)
///
/// Expected layout:
/// 1. Compute budget instructions, at most one limit and one price
/// 2. Program instructions, with no compute budget instruction among them
///
/// # Errors
///
/// Returns `TransactionBuilderError::InvalidInstructionOrder` if:
/// - Instruction list is empty
/// - A unit limit or unit price is set twice
/// - A compute budget instruction follows a program instruction
#[cfg(debug_assertions)]
pub fn sanity_check_compute_budget(instructions: &[Instruction]) -> Result<(), TransactionBuilderError> {
    if instructions.is_empty() {
        return Err(TransactionBuilderError::invalid_order(
            "Instruction list is empty",
        ));
    }

    let mut seen_limit = false;
    let mut seen_price = false;
    let mut seen_program = false;

    for (idx, ix) in instructions.iter().enumerate() {
        if !is_compute_budget_ix(ix) {
            seen_program = true;
            continue;
        }

        if seen_program {
            return Err(TransactionBuilderError::invalid_order(format!(
                "Compute budget instruction at position {} follows a program instruction",
                idx
            )));
        }

        if is_set_compute_unit_limit(ix) {
            if seen_limit {
                return Err(TransactionBuilderError::invalid_order(format!(
                    "Duplicate set_compute_unit_limit at position {}",
                    idx
                )));
            }
            seen_limit = true;
        } else if is_set_compute_unit_price(ix) {
            if seen_price {
                return Err(TransactionBuilderError::invalid_order(format!(
                    "Duplicate set_compute_unit_price at position {}",
                    idx
                )));
            }
            seen_price = true;
        }
    }

    Ok(())
}

/// No-op version of sanity_check_compute_budget for release builds
#[cfg(not(debug_assertions))]
#[inline]
pub fn sanity_check_compute_budget(_instructions: &[Instruction]) -> Result<(), TransactionBuilderError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{instruction::AccountMeta, pubkey::Pubkey};

    fn program_ix() -> Instruction {
        Instruction::new_with_bytes(
            Pubkey::new_unique(),
            &[1, 2, 3],
            vec![AccountMeta::new(Pubkey::new_unique(), true)],
        )
    }

    #[test]
    fn test_prelude_layout() {
        let prelude = compute_budget_prelude(1_400_000, 1001);
        assert_eq!(prelude.len(), 2);
        assert!(is_set_compute_unit_limit(&prelude[0]));
        assert!(is_set_compute_unit_price(&prelude[1]));
        assert_eq!(requested_unit_limit(&prelude[0]), Some(1_400_000));
        assert_eq!(requested_unit_limit(&prelude[1]), None);
    }

    #[test]
    fn test_program_ix_is_not_compute_budget() {
        let ix = program_ix();
        assert!(!is_compute_budget_ix(&ix));
        assert!(!is_set_compute_unit_limit(&ix));
        assert_eq!(requested_unit_limit(&ix), None);
    }

    #[test]
    fn test_sanity_check_accepts_prelude_then_programs() {
        let mut ixs = compute_budget_prelude(470_000, 5);
        ixs.push(program_ix());
        ixs.push(program_ix());
        assert!(sanity_check_compute_budget(&ixs).is_ok());

        // Program-only transactions are fine too
        assert!(sanity_check_compute_budget(&[program_ix()]).is_ok());
    }

    #[cfg(debug_assertions)]
    #[test]
    fn test_sanity_check_rejects_misplaced_budget() {
        assert!(sanity_check_compute_budget(&[]).is_err());

        let trailing = vec![
            program_ix(),
            ComputeBudgetInstruction::set_compute_unit_limit(1),
        ];
        assert!(matches!(
            sanity_check_compute_budget(&trailing),
            Err(TransactionBuilderError::InvalidInstructionOrder(_))
        ));

        let duplicated = vec![
            ComputeBudgetInstruction::set_compute_unit_limit(1),
            ComputeBudgetInstruction::set_compute_unit_limit(2),
            program_ix(),
        ];
        assert!(sanity_check_compute_budget(&duplicated).is_err());
    }
}
