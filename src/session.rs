//! Mint session orchestration
//!
//! A session prepares everything the wallet needs to mint N assets from one
//! candy machine:
//! 1. select the guard group for the requested label
//! 2. build one `MintArgs` per unit against the owned inventory
//! 3. build preflight (route) transactions for the allowList guard
//! 4. pack the `mint_v1` instructions into size-bounded transactions and
//!    set each transaction's compute-unit limit from a simulation
//!
//! The result is a list of unsigned transactions plus their required
//! signers. Nothing is signed or sent here.

use solana_sdk::{
    hash::Hash, instruction::Instruction, message::AddressLookupTableAccount, pubkey::Pubkey,
};
use std::sync::Arc;

use crate::allowlist::AllowlistStore;
use crate::config::ComputeConfig;
use crate::guards::{select_guard, CandyGuardConfig, GuardGroup};
use crate::inventory::OwnedAssetInventory;
use crate::mint_args::{MintArgs, MintArgsBatch, MintArgsBuilder};
use crate::program::{AllowListProofSource, CandyGuardInstructions, MintV1Accounts};
use crate::route::RouteBuilder;
use crate::structured_logging::MintLogger;
use crate::tx_builder::{
    compute_budget_prelude, ComputeUnitEstimator, Packer, TransactionBuilderError,
    TransactionSimulator, TxBuildOutput, TxBuilder,
};
use crate::types::CandyMachineState;

/// External collaborators of a session
#[derive(Clone)]
pub struct MintServices {
    pub program: Arc<dyn CandyGuardInstructions>,
    pub proofs: Arc<dyn AllowListProofSource>,
    pub simulator: Arc<dyn TransactionSimulator>,
}

/// One "mint N copies" request
#[derive(Debug, Clone)]
pub struct MintRequest {
    /// Guard group label chosen by the user
    pub label: String,
    /// Wallet paying for and receiving the mints
    pub user: Pubkey,
    /// Freshly generated asset addresses, one per unit
    pub assets: Vec<Pubkey>,
    pub inventory: OwnedAssetInventory,
    pub lookup_tables: Vec<AddressLookupTableAccount>,
    pub blockhash: Hash,
}

/// Everything prepared for one request
#[derive(Debug, Clone)]
pub struct MintPlan {
    pub group: GuardGroup,
    pub mint_args: MintArgsBatch,
    /// Route transactions to send and confirm before the mints
    pub preflight: Vec<TxBuildOutput>,
    pub mint_transactions: Vec<TxBuildOutput>,
}

pub struct MintSession {
    candy_machine: CandyMachineState,
    candy_guard: Option<CandyGuardConfig>,
    allowlists: Arc<AllowlistStore>,
    program: Arc<dyn CandyGuardInstructions>,
    routes: RouteBuilder,
    estimator: ComputeUnitEstimator,
    compute: ComputeConfig,
    logger: MintLogger,
}

impl MintSession {
    pub fn new(
        candy_machine: CandyMachineState,
        candy_guard: Option<CandyGuardConfig>,
        allowlists: Arc<AllowlistStore>,
        services: MintServices,
        compute: ComputeConfig,
    ) -> Self {
        Self::with_logger(
            candy_machine,
            candy_guard,
            allowlists,
            services,
            compute,
            MintLogger::for_new_session(),
        )
    }

    pub fn with_logger(
        candy_machine: CandyMachineState,
        candy_guard: Option<CandyGuardConfig>,
        allowlists: Arc<AllowlistStore>,
        services: MintServices,
        compute: ComputeConfig,
        logger: MintLogger,
    ) -> Self {
        let estimator = ComputeUnitEstimator::new(services.simulator, logger.clone())
            .with_fallback_units(compute.fallback_units)
            .with_margin_units(compute.margin_units);
        let routes = RouteBuilder::new(
            allowlists.clone(),
            services.proofs,
            services.program.clone(),
            logger.clone(),
        );
        Self {
            candy_machine,
            candy_guard,
            allowlists,
            program: services.program,
            routes,
            estimator,
            compute,
            logger,
        }
    }

    pub fn logger(&self) -> &MintLogger {
        &self.logger
    }

    pub fn candy_machine(&self) -> &CandyMachineState {
        &self.candy_machine
    }

    pub fn select_guard(&self, label: &str) -> GuardGroup {
        select_guard(label, self.candy_guard.as_ref(), &self.logger)
    }

    pub fn build_mint_args(
        &self,
        group: &GuardGroup,
        inventory: OwnedAssetInventory,
        quantity: usize,
    ) -> MintArgsBatch {
        MintArgsBuilder::new(group, &self.allowlists, &self.logger).build(inventory, quantity)
    }

    pub async fn build_route(
        &self,
        group: &GuardGroup,
        user: &Pubkey,
    ) -> Result<Vec<Instruction>, TransactionBuilderError> {
        self.routes.build_route(group, &self.candy_machine, user).await
    }

    fn mint_accounts(&self, user: &Pubkey, asset: &Pubkey) -> MintV1Accounts {
        MintV1Accounts {
            candy_machine: self.candy_machine.address,
            candy_guard: self.candy_machine.mint_authority,
            collection: self.candy_machine.collection_mint,
            asset: *asset,
            payer: *user,
            minter: *user,
        }
    }

    /// One `mint_v1` per asset, paired with the unit's arguments
    pub fn mint_instructions(
        &self,
        group: &GuardGroup,
        user: &Pubkey,
        assets: &[Pubkey],
        records: &[MintArgs],
    ) -> Result<Vec<Instruction>, TransactionBuilderError> {
        if records.len() != assets.len() {
            return Err(TransactionBuilderError::Configuration(format!(
                "{} mint argument records for {} assets",
                records.len(),
                assets.len()
            )));
        }

        assets
            .iter()
            .zip(records)
            .map(|(asset, args)| {
                self.program
                    .mint_v1(&self.mint_accounts(user, asset), group.group_arg(), args)
            })
            .collect()
    }

    fn template(
        &self,
        user: &Pubkey,
        lookup_tables: Vec<AddressLookupTableAccount>,
        blockhash: Hash,
    ) -> TxBuilder {
        TxBuilder::new(*user)
            .set_address_lookup_tables(lookup_tables)
            .set_blockhash(blockhash)
            .with_size_limit(self.compute.max_transaction_size)
    }

    /// Pack the batch's mint instructions and fix each transaction's
    /// compute-unit limit from a simulation.
    ///
    /// # Errors
    ///
    /// Fails when a mint instruction cannot be constructed or a single mint
    /// does not fit in one transaction.
    pub async fn build_mint_transactions(
        &self,
        group: &GuardGroup,
        user: &Pubkey,
        assets: &[Pubkey],
        records: &[MintArgs],
        lookup_tables: Vec<AddressLookupTableAccount>,
        blockhash: Hash,
    ) -> Result<Vec<TxBuildOutput>, TransactionBuilderError> {
        let instructions = self.mint_instructions(group, user, assets, records)?;
        let template = self
            .template(user, lookup_tables, blockhash)
            .extend(compute_budget_prelude(
                self.compute.placeholder_units,
                self.compute.micro_lamports,
            ));

        let builders = Packer::new(template, instructions).finish();

        let mut outputs = Vec::with_capacity(builders.len());
        for (index, builder) in builders.into_iter().enumerate() {
            let candidate = builder.build()?;
            let units = self.estimator.estimate(&candidate.tx).await;
            let builder = builder.replace_compute_unit_limit(units)?;
            let output = builder.build()?;
            self.logger
                .log_transaction_sealed(index, builder.len(), output.size()?);
            outputs.push(output);
        }
        Ok(outputs)
    }

    /// Single mint transaction with an explicit compute-unit limit
    pub fn build_mint_transaction(
        &self,
        group: &GuardGroup,
        user: &Pubkey,
        asset: &Pubkey,
        args: &MintArgs,
        lookup_tables: Vec<AddressLookupTableAccount>,
        blockhash: Hash,
        units: u32,
    ) -> Result<TxBuildOutput, TransactionBuilderError> {
        let mint_ix = self
            .program
            .mint_v1(&self.mint_accounts(user, asset), group.group_arg(), args)?;
        self.template(user, lookup_tables, blockhash)
            .extend(compute_budget_prelude(units, self.compute.micro_lamports))
            .add(mint_ix)
            .build()
    }

    /// Pack route instructions into preflight transactions (no prelude)
    pub fn build_preflight(
        &self,
        user: &Pubkey,
        route: Vec<Instruction>,
        lookup_tables: Vec<AddressLookupTableAccount>,
        blockhash: Hash,
    ) -> Result<Vec<TxBuildOutput>, TransactionBuilderError> {
        Packer::new(self.template(user, lookup_tables, blockhash), route)
            .finish()
            .iter()
            .map(TxBuilder::build)
            .collect()
    }

    /// Run the whole preparation for `request`.
    ///
    /// Without a candy guard configuration no mint is possible: the plan then
    /// carries the (empty) arguments but no transactions.
    pub async fn prepare(&self, request: MintRequest) -> Result<MintPlan, TransactionBuilderError> {
        let MintRequest {
            label,
            user,
            assets,
            inventory,
            lookup_tables,
            blockhash,
        } = request;

        let group = self.select_guard(&label);
        let mint_args = self.build_mint_args(&group, inventory, assets.len());

        if group.guards.is_none() {
            return Ok(MintPlan {
                group,
                mint_args,
                preflight: Vec::new(),
                mint_transactions: Vec::new(),
            });
        }

        let route = self.build_route(&group, &user).await?;
        let preflight = self.build_preflight(&user, route, lookup_tables.clone(), blockhash)?;
        let mint_transactions = self
            .build_mint_transactions(
                &group,
                &user,
                &assets,
                &mint_args.records,
                lookup_tables,
                blockhash,
            )
            .await?;

        Ok(MintPlan {
            group,
            mint_args,
            preflight,
            mint_transactions,
        })
    }
}
