//! Test Utilities Module
//!
//! Deterministic stand-ins for the external collaborators of a mint
//! session: the candy guard instruction constructors, the simulator and the
//! allowList proof lookup. None of them touch the network.
//!
//! These utilities are only compiled when running tests or when the
//! `test_utils` feature is enabled.

#![cfg(any(test, feature = "test_utils"))]

use async_trait::async_trait;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    transaction::VersionedTransaction,
};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::mint_args::MintArgs;
use crate::program::{
    AllowListProofSource, AllowListRoute, CandyGuardInstructions, MintV1Accounts,
    CORE_CANDY_GUARD_ID,
};
use crate::tx_builder::{SimulationOutcome, TransactionBuilderError, TransactionSimulator};
use crate::types::CandyMachineState;

const MINT_V1_TAG: [u8; 8] = [0x4d, 0x49, 0x4e, 0x54, 0x5f, 0x56, 0x31, 0x00];
const ROUTE_TAG: [u8; 8] = [0x52, 0x4f, 0x55, 0x54, 0x45, 0x00, 0x00, 0x00];

/// Recorded `mint_v1` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMint {
    pub accounts: MintV1Accounts,
    pub group: Option<String>,
    pub args: MintArgs,
}

/// Recorded `route` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRoute {
    pub route: AllowListRoute,
    pub group: Option<String>,
}

/// Fake candy guard program
///
/// Builds instructions shaped like the real ones (same signers, a
/// configurable payload size) and records every call.
#[derive(Clone, Default)]
pub struct FakeCandyGuardProgram {
    /// Extra data bytes appended to each `mint_v1`
    pub mint_padding: usize,
    pub fail: bool,
    pub mints: Arc<Mutex<Vec<RecordedMint>>>,
    pub routes: Arc<Mutex<Vec<RecordedRoute>>>,
}

impl FakeCandyGuardProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `mint_v1` roughly `padding` bytes larger
    pub fn with_mint_padding(mut self, padding: usize) -> Self {
        self.mint_padding = padding;
        self
    }

    /// Program whose constructors always fail
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn recorded_mints(&self) -> Vec<RecordedMint> {
        self.mints.lock().map(|mints| mints.clone()).unwrap_or_default()
    }

    pub fn recorded_routes(&self) -> Vec<RecordedRoute> {
        self.routes.lock().map(|routes| routes.clone()).unwrap_or_default()
    }
}

impl CandyGuardInstructions for FakeCandyGuardProgram {
    fn mint_v1(
        &self,
        accounts: &MintV1Accounts,
        group: Option<&str>,
        args: &MintArgs,
    ) -> Result<Instruction, TransactionBuilderError> {
        if self.fail {
            return Err(TransactionBuilderError::instruction_failed(
                "candy_guard",
                "mint_v1 constructor disabled",
            ));
        }

        if let Ok(mut mints) = self.mints.lock() {
            mints.push(RecordedMint {
                accounts: *accounts,
                group: group.map(str::to_string),
                args: args.clone(),
            });
        }

        let mut data = MINT_V1_TAG.to_vec();
        data.extend_from_slice(group.unwrap_or_default().as_bytes());
        data.extend(std::iter::repeat(0u8).take(self.mint_padding));

        Ok(Instruction::new_with_bytes(
            CORE_CANDY_GUARD_ID,
            &data,
            vec![
                AccountMeta::new_readonly(accounts.candy_guard, false),
                AccountMeta::new(accounts.candy_machine, false),
                AccountMeta::new(accounts.payer, true),
                AccountMeta::new_readonly(accounts.minter, true),
                AccountMeta::new(accounts.asset, true),
                AccountMeta::new(accounts.collection, false),
            ],
        ))
    }

    fn route_allow_list_proof(
        &self,
        route: &AllowListRoute,
        group: Option<&str>,
    ) -> Result<Instruction, TransactionBuilderError> {
        if self.fail {
            return Err(TransactionBuilderError::instruction_failed(
                "candy_guard",
                "route constructor disabled",
            ));
        }

        if let Ok(mut routes) = self.routes.lock() {
            routes.push(RecordedRoute {
                route: route.clone(),
                group: group.map(str::to_string),
            });
        }

        let mut data = ROUTE_TAG.to_vec();
        data.extend_from_slice(&route.merkle_root);
        for node in &route.merkle_proof {
            data.extend_from_slice(node);
        }

        Ok(Instruction::new_with_bytes(
            CORE_CANDY_GUARD_ID,
            &data,
            vec![
                AccountMeta::new_readonly(route.candy_guard, false),
                AccountMeta::new(route.candy_machine, false),
                AccountMeta::new(route.payer, true),
                AccountMeta::new_readonly(route.user, false),
            ],
        ))
    }
}

/// Simulator replaying scripted outcomes in order
pub struct ScriptedSimulator {
    script: tokio::sync::Mutex<VecDeque<Result<SimulationOutcome, TransactionBuilderError>>>,
    /// Outcome once the script is exhausted
    fallback: SimulationOutcome,
    calls: AtomicUsize,
}

impl ScriptedSimulator {
    pub fn new(script: Vec<Result<SimulationOutcome, TransactionBuilderError>>) -> Self {
        Self {
            script: tokio::sync::Mutex::new(script.into()),
            fallback: SimulationOutcome::default(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every simulation reports `units` consumed
    pub fn always_consuming(units: u64) -> Self {
        Self {
            fallback: SimulationOutcome::consumed(units),
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionSimulator for ScriptedSimulator {
    async fn simulate(
        &self,
        _tx: &VersionedTransaction,
    ) -> Result<SimulationOutcome, TransactionBuilderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

/// Proof lookup backed by a fixed set of existing accounts
#[derive(Default)]
pub struct StaticProofSource {
    existing: HashSet<Pubkey>,
    fail: bool,
    lookups: AtomicUsize,
}

impl StaticProofSource {
    /// No proof account exists
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_existing(existing: impl IntoIterator<Item = Pubkey>) -> Self {
        Self {
            existing: existing.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Every lookup fails like an unreachable RPC node
    pub fn unreachable() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AllowListProofSource for StaticProofSource {
    async fn proof_exists(&self, proof_pda: &Pubkey) -> Result<bool, TransactionBuilderError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TransactionBuilderError::Rpc("connection refused".to_string()));
        }
        Ok(self.existing.contains(proof_pda))
    }
}

/// Candy machine with random addresses
pub fn sample_candy_machine() -> CandyMachineState {
    CandyMachineState {
        address: Pubkey::new_unique(),
        mint_authority: Pubkey::new_unique(),
        collection_mint: Pubkey::new_unique(),
    }
}
