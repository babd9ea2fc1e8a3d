//! Preflight `route` instructions
//!
//! The allowList guard checks membership through a proof account that must
//! exist before the mint. When the wallet has not registered its proof yet,
//! one `route` instruction storing it goes into a preflight transaction.

use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use std::sync::Arc;

use crate::allowlist::AllowlistStore;
use crate::guards::{GuardGroup, GuardKind};
use crate::program::{AllowListProofSeeds, AllowListProofSource, AllowListRoute, CandyGuardInstructions};
use crate::structured_logging::MintLogger;
use crate::tx_builder::TransactionBuilderError;
use crate::types::CandyMachineState;

pub struct RouteBuilder {
    allowlists: Arc<AllowlistStore>,
    proofs: Arc<dyn AllowListProofSource>,
    program: Arc<dyn CandyGuardInstructions>,
    logger: MintLogger,
}

impl RouteBuilder {
    pub fn new(
        allowlists: Arc<AllowlistStore>,
        proofs: Arc<dyn AllowListProofSource>,
        program: Arc<dyn CandyGuardInstructions>,
        logger: MintLogger,
    ) -> Self {
        Self {
            allowlists,
            proofs,
            program,
            logger,
        }
    }

    /// Route instructions `user` needs before minting from `group`.
    ///
    /// Empty unless the allowList guard is active and no proof account
    /// exists yet; then exactly one instruction. A missing allowlist or a
    /// failed proof lookup is logged and yields no instruction. Only an
    /// instruction constructor failure is an error.
    pub async fn build_route(
        &self,
        group: &GuardGroup,
        candy_machine: &CandyMachineState,
        user: &Pubkey,
    ) -> Result<Vec<Instruction>, TransactionBuilderError> {
        if !group.is_active(GuardKind::AllowList) {
            return Ok(Vec::new());
        }

        let (Some(merkle_root), Some(merkle_proof)) = (
            self.allowlists.merkle_root(&group.label),
            self.allowlists.merkle_proof(&group.label, user),
        ) else {
            self.logger.log_allowlist_missing(&group.label);
            return Ok(Vec::new());
        };

        if !self.allowlists.contains(&group.label, user) {
            self.logger.warn(&format!(
                "{} is not on the {} allowlist; the proof will be rejected",
                user, group.label
            ));
        }

        let seeds = AllowListProofSeeds {
            merkle_root,
            user: *user,
            candy_guard: candy_machine.mint_authority,
            candy_machine: candy_machine.address,
        };
        let (proof_pda, _) = seeds.find_pda();

        match self.proofs.proof_exists(&proof_pda).await {
            Ok(true) => {
                self.logger
                    .log_route_skipped(&group.label, "allow list proof already stored");
                return Ok(Vec::new());
            }
            Ok(false) => {}
            Err(e) => {
                self.logger
                    .log_proof_lookup_failed(&group.label, &proof_pda, &e.to_string());
                return Ok(Vec::new());
            }
        }

        let route = AllowListRoute {
            candy_machine: candy_machine.address,
            candy_guard: candy_machine.mint_authority,
            payer: *user,
            user: *user,
            merkle_root,
            merkle_proof,
        };
        let ix = self.program.route_allow_list_proof(&route, group.group_arg())?;
        self.logger.log_route_emitted(&group.label, user);
        Ok(vec![ix])
    }
}
