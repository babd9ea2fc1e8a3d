//! Candy guard program interface
//!
//! Instruction encoding for the candy guard program is owned by the program
//! client and is treated as opaque here: callers plug in an implementation
//! of [`CandyGuardInstructions`]. The proof-existence lookup is a plain
//! account fetch and comes with an RPC-backed implementation.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};

use crate::mint_args::MintArgs;
use crate::tx_builder::TransactionBuilderError;

/// Core candy guard program
/// (`CMAGAKJ67e9hRZgfC5SFTbZH8MgEmtqazKXjmkaJjWTJ`)
pub const CORE_CANDY_GUARD_ID: Pubkey = Pubkey::new_from_array([
    168, 154, 164, 238, 27, 230, 250, 239, 97, 29, 219, 190, 234, 165, 221, 143, 242, 5, 237, 51,
    151, 28, 41, 64, 47, 215, 140, 161, 3, 166, 166, 9,
]);

/// Seed prefix of allowList proof accounts
pub const ALLOW_LIST_PROOF_SEED: &[u8] = b"allow_list";

/// Seeds of the account recording that `user` proved allowlist membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowListProofSeeds {
    pub merkle_root: [u8; 32],
    pub user: Pubkey,
    pub candy_guard: Pubkey,
    pub candy_machine: Pubkey,
}

impl AllowListProofSeeds {
    pub fn find_pda(&self) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[
                ALLOW_LIST_PROOF_SEED,
                &self.merkle_root,
                self.user.as_ref(),
                self.candy_guard.as_ref(),
                self.candy_machine.as_ref(),
            ],
            &CORE_CANDY_GUARD_ID,
        )
    }
}

/// Accounts of one `mint_v1` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintV1Accounts {
    pub candy_machine: Pubkey,
    pub candy_guard: Pubkey,
    /// Core collection the asset joins
    pub collection: Pubkey,
    /// Freshly generated asset address; signs the transaction
    pub asset: Pubkey,
    pub payer: Pubkey,
    pub minter: Pubkey,
}

/// Arguments of the allowList `route` call that stores a proof
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowListRoute {
    pub candy_machine: Pubkey,
    pub candy_guard: Pubkey,
    pub payer: Pubkey,
    pub user: Pubkey,
    pub merkle_root: [u8; 32],
    pub merkle_proof: Vec<[u8; 32]>,
}

/// Instruction constructors of the candy guard program
pub trait CandyGuardInstructions: Send + Sync {
    /// `mint_v1` for one asset; `group` is `None` for the default guards
    fn mint_v1(
        &self,
        accounts: &MintV1Accounts,
        group: Option<&str>,
        args: &MintArgs,
    ) -> Result<Instruction, TransactionBuilderError>;

    /// `route` to the allowList guard with the `proof` path
    fn route_allow_list_proof(
        &self,
        route: &AllowListRoute,
        group: Option<&str>,
    ) -> Result<Instruction, TransactionBuilderError>;
}

/// Lookup of existing allowList proof accounts
#[async_trait]
pub trait AllowListProofSource: Send + Sync {
    async fn proof_exists(&self, proof_pda: &Pubkey) -> Result<bool, TransactionBuilderError>;
}

#[async_trait]
impl AllowListProofSource for RpcClient {
    async fn proof_exists(&self, proof_pda: &Pubkey) -> Result<bool, TransactionBuilderError> {
        self.get_account_with_commitment(proof_pda, self.commitment())
            .await
            .map(|response| response.value.is_some())
            .map_err(|e| TransactionBuilderError::Rpc(e.to_string()))
    }
}
