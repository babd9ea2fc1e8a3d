//! Per-guard configuration values as stored in a candy guard account

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::types::{hex32, pubkey_str};

/// Penalty for invalid transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotTax {
    pub lamports: u64,
    pub last_instruction: bool,
}

/// Guard that charges an amount in SOL (lamports) for the mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolPayment {
    pub lamports: u64,
    #[serde(with = "pubkey_str")]
    pub destination: Pubkey,
}

/// Guard that charges an amount in a specified spl-token as payment for the mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayment {
    pub amount: u64,
    #[serde(with = "pubkey_str")]
    pub mint: Pubkey,
    #[serde(with = "pubkey_str")]
    pub destination_ata: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartDate {
    pub date: i64,
}

/// Guard that requires a specified signer to validate the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThirdPartySigner {
    #[serde(with = "pubkey_str")]
    pub signer_key: Pubkey,
}

/// Guard that restricts access to addresses that hold the specified spl-token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGate {
    pub amount: u64,
    #[serde(with = "pubkey_str")]
    pub mint: Pubkey,
}

/// Guard that validates the payer holds a gateway token from a gatekeeper
/// network (in most cases issued after a captcha challenge).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gatekeeper {
    /// The network for the gateway token required
    #[serde(with = "pubkey_str")]
    pub gatekeeper_network: Pubkey,
    /// Whether or not the token should expire after minting.
    pub expire_on_use: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndDate {
    pub date: i64,
}

/// Guard that uses a merkle tree to specify the addresses allowed to mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowList {
    #[serde(with = "hex32")]
    pub merkle_root: [u8; 32],
}

/// Guard to set a limit of mints per wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintLimit {
    /// Unique identifier of the mint limit.
    pub id: u8,
    /// Limit of mints per individual address.
    pub limit: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftPayment {
    #[serde(with = "pubkey_str")]
    pub required_collection: Pubkey,
    #[serde(with = "pubkey_str")]
    pub destination: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemedAmount {
    pub maximum: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressGate {
    #[serde(with = "pubkey_str")]
    pub address: Pubkey,
}

/// Guard that restricts the transaction to holders of a specified collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftGate {
    #[serde(with = "pubkey_str")]
    pub required_collection: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftBurn {
    #[serde(with = "pubkey_str")]
    pub required_collection: Pubkey,
}

/// Guard that requires and burns an amount of a specified spl-token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBurn {
    pub amount: u64,
    #[serde(with = "pubkey_str")]
    pub mint: Pubkey,
}

/// SOL payment held in a freeze escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreezeSolPayment {
    pub lamports: u64,
    #[serde(with = "pubkey_str")]
    pub destination: Pubkey,
}

/// Token payment held in a freeze escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreezeTokenPayment {
    pub amount: u64,
    #[serde(with = "pubkey_str")]
    pub mint: Pubkey,
    #[serde(with = "pubkey_str")]
    pub destination_ata: Pubkey,
}

/// Guard that restricts the programs that can be in a mint transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramGate {
    #[serde(with = "pubkey_str::vec")]
    pub additional: Vec<Pubkey>,
}

/// Maximum number of mints in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Unique identifier of the allocation.
    pub id: u8,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token2022Payment {
    pub amount: u64,
    #[serde(with = "pubkey_str")]
    pub mint: Pubkey,
    #[serde(with = "pubkey_str")]
    pub destination_ata: Pubkey,
}

/// Fixed SOL fee for launchpads and marketplaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolFixedFee {
    pub lamports: u64,
    #[serde(with = "pubkey_str")]
    pub destination: Pubkey,
}

/// Limit of mints per NFT of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftMintLimit {
    pub id: u8,
    pub limit: u16,
    #[serde(with = "pubkey_str")]
    pub required_collection: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edition {
    pub edition_start_offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPayment {
    #[serde(with = "pubkey_str")]
    pub required_collection: Pubkey,
    #[serde(with = "pubkey_str")]
    pub destination: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBurn {
    #[serde(with = "pubkey_str")]
    pub required_collection: Pubkey,
}

/// Limit of mints per Core asset of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMintLimit {
    pub id: u8,
    pub limit: u16,
    #[serde(with = "pubkey_str")]
    pub required_collection: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBurnMulti {
    #[serde(with = "pubkey_str")]
    pub required_collection: Pubkey,
    pub num: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPaymentMulti {
    #[serde(with = "pubkey_str")]
    pub required_collection: Pubkey,
    #[serde(with = "pubkey_str")]
    pub destination: Pubkey,
    pub num: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetGate {
    #[serde(with = "pubkey_str")]
    pub required_collection: Pubkey,
}

/// The address of the new asset must match a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VanityMint {
    pub regex: String,
}
