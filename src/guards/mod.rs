//! Candy guard configuration model
//!
//! A candy guard holds a default guard set plus any number of labelled
//! groups. Each guard kind is independently present or absent in a set;
//! presence is an `Option` per kind rather than a sentinel field.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::fmt;

use crate::types::{pubkey_str, DEFAULT_GROUP_LABEL};

pub mod kinds;
mod select;

pub use kinds::*;
pub use select::select_guard;

/// Available guard kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GuardKind {
    BotTax,
    SolPayment,
    TokenPayment,
    StartDate,
    ThirdPartySigner,
    TokenGate,
    Gatekeeper,
    EndDate,
    AllowList,
    MintLimit,
    NftPayment,
    RedeemedAmount,
    AddressGate,
    NftGate,
    NftBurn,
    TokenBurn,
    FreezeSolPayment,
    FreezeTokenPayment,
    ProgramGate,
    Allocation,
    Token2022Payment,
    SolFixedFee,
    NftMintLimit,
    Edition,
    AssetPayment,
    AssetBurn,
    AssetMintLimit,
    AssetBurnMulti,
    AssetPaymentMulti,
    AssetGate,
    VanityMint,
}

impl GuardKind {
    /// Every guard kind, in on-chain feature-flag order
    pub const ALL: [GuardKind; 31] = [
        GuardKind::BotTax,
        GuardKind::SolPayment,
        GuardKind::TokenPayment,
        GuardKind::StartDate,
        GuardKind::ThirdPartySigner,
        GuardKind::TokenGate,
        GuardKind::Gatekeeper,
        GuardKind::EndDate,
        GuardKind::AllowList,
        GuardKind::MintLimit,
        GuardKind::NftPayment,
        GuardKind::RedeemedAmount,
        GuardKind::AddressGate,
        GuardKind::NftGate,
        GuardKind::NftBurn,
        GuardKind::TokenBurn,
        GuardKind::FreezeSolPayment,
        GuardKind::FreezeTokenPayment,
        GuardKind::ProgramGate,
        GuardKind::Allocation,
        GuardKind::Token2022Payment,
        GuardKind::SolFixedFee,
        GuardKind::NftMintLimit,
        GuardKind::Edition,
        GuardKind::AssetPayment,
        GuardKind::AssetBurn,
        GuardKind::AssetMintLimit,
        GuardKind::AssetBurnMulti,
        GuardKind::AssetPaymentMulti,
        GuardKind::AssetGate,
        GuardKind::VanityMint,
    ];

    /// Name used by the candy guard SDKs (`solPayment`, `nftBurn`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            GuardKind::BotTax => "botTax",
            GuardKind::SolPayment => "solPayment",
            GuardKind::TokenPayment => "tokenPayment",
            GuardKind::StartDate => "startDate",
            GuardKind::ThirdPartySigner => "thirdPartySigner",
            GuardKind::TokenGate => "tokenGate",
            GuardKind::Gatekeeper => "gatekeeper",
            GuardKind::EndDate => "endDate",
            GuardKind::AllowList => "allowList",
            GuardKind::MintLimit => "mintLimit",
            GuardKind::NftPayment => "nftPayment",
            GuardKind::RedeemedAmount => "redeemedAmount",
            GuardKind::AddressGate => "addressGate",
            GuardKind::NftGate => "nftGate",
            GuardKind::NftBurn => "nftBurn",
            GuardKind::TokenBurn => "tokenBurn",
            GuardKind::FreezeSolPayment => "freezeSolPayment",
            GuardKind::FreezeTokenPayment => "freezeTokenPayment",
            GuardKind::ProgramGate => "programGate",
            GuardKind::Allocation => "allocation",
            GuardKind::Token2022Payment => "token2022Payment",
            GuardKind::SolFixedFee => "solFixedFee",
            GuardKind::NftMintLimit => "nftMintLimit",
            GuardKind::Edition => "edition",
            GuardKind::AssetPayment => "assetPayment",
            GuardKind::AssetBurn => "assetBurn",
            GuardKind::AssetMintLimit => "assetMintLimit",
            GuardKind::AssetBurnMulti => "assetBurnMulti",
            GuardKind::AssetPaymentMulti => "assetPaymentMulti",
            GuardKind::AssetGate => "assetGate",
            GuardKind::VanityMint => "vanityMint",
        }
    }
}

impl fmt::Display for GuardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of guards available.
///
/// Keys missing from a JSON snapshot deserialize as absent guards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuardSet {
    /// Last instruction check and bot tax (penalty for invalid transactions).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_tax: Option<BotTax>,
    /// Sol payment guard (set the price for the mint in lamports).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sol_payment: Option<SolPayment>,
    /// Token payment guard (set the price for the mint in spl-token amount).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_payment: Option<TokenPayment>,
    /// Start data guard (controls when minting is allowed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<StartDate>,
    /// Third party signer guard (requires an extra signer for the transaction).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub third_party_signer: Option<ThirdPartySigner>,
    /// Token gate guard (restrict access to holders of a specific token).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_gate: Option<TokenGate>,
    /// Gatekeeper guard (captcha challenge).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gatekeeper: Option<Gatekeeper>,
    /// End date guard (set an end date to stop the mint).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<EndDate>,
    /// Allow list guard (curated list of allowed addresses).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_list: Option<AllowList>,
    /// Mint limit guard (add a limit on the number of mints per wallet).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint_limit: Option<MintLimit>,
    /// NFT Payment (charge an NFT in order to mint).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nft_payment: Option<NftPayment>,
    /// Redeemed amount guard (add a limit on the overall number of items minted).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redeemed_amount: Option<RedeemedAmount>,
    /// Address gate (check access against a specified address).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_gate: Option<AddressGate>,
    /// NFT gate guard (check access based on holding a specified NFT).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nft_gate: Option<NftGate>,
    /// NFT burn guard (burn a specified NFT).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nft_burn: Option<NftBurn>,
    /// Token burn guard (burn a specified amount of spl-token).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_burn: Option<TokenBurn>,
    /// Freeze sol payment guard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freeze_sol_payment: Option<FreezeSolPayment>,
    /// Freeze token payment guard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freeze_token_payment: Option<FreezeTokenPayment>,
    /// Program gate guard (restricts the programs that can be in a mint transaction).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_gate: Option<ProgramGate>,
    /// Allocation guard (specify the maximum number of mints in a group).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation: Option<Allocation>,
    /// Token2022 payment guard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token2022_payment: Option<Token2022Payment>,
    /// Sol fixed fee for launchpads, marketplaces to define custom fees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sol_fixed_fee: Option<SolFixedFee>,
    /// NFT mint limit guard (add a limit on the number of mints per NFT).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nft_mint_limit: Option<NftMintLimit>,
    /// Edition guard (adds an edition plugin to the asset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edition: Option<Edition>,
    /// Asset Payment (charge an Asset in order to mint).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_payment: Option<AssetPayment>,
    /// Asset Burn (burn an Asset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_burn: Option<AssetBurn>,
    /// Asset mint limit guard (add a limit on the number of mints per asset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_mint_limit: Option<AssetMintLimit>,
    /// Asset Burn Multi (multi burn Assets).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_burn_multi: Option<AssetBurnMulti>,
    /// Asset Payment Multi (multi pay Assets).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_payment_multi: Option<AssetPaymentMulti>,
    /// Asset Gate (restrict access to holders of a specific asset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_gate: Option<AssetGate>,
    /// Vanity Mint (the address of the new asset must match a pattern).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vanity_mint: Option<VanityMint>,
}

impl GuardSet {
    /// Whether the guard of `kind` is present in this set
    pub fn is_active(&self, kind: GuardKind) -> bool {
        match kind {
            GuardKind::BotTax => self.bot_tax.is_some(),
            GuardKind::SolPayment => self.sol_payment.is_some(),
            GuardKind::TokenPayment => self.token_payment.is_some(),
            GuardKind::StartDate => self.start_date.is_some(),
            GuardKind::ThirdPartySigner => self.third_party_signer.is_some(),
            GuardKind::TokenGate => self.token_gate.is_some(),
            GuardKind::Gatekeeper => self.gatekeeper.is_some(),
            GuardKind::EndDate => self.end_date.is_some(),
            GuardKind::AllowList => self.allow_list.is_some(),
            GuardKind::MintLimit => self.mint_limit.is_some(),
            GuardKind::NftPayment => self.nft_payment.is_some(),
            GuardKind::RedeemedAmount => self.redeemed_amount.is_some(),
            GuardKind::AddressGate => self.address_gate.is_some(),
            GuardKind::NftGate => self.nft_gate.is_some(),
            GuardKind::NftBurn => self.nft_burn.is_some(),
            GuardKind::TokenBurn => self.token_burn.is_some(),
            GuardKind::FreezeSolPayment => self.freeze_sol_payment.is_some(),
            GuardKind::FreezeTokenPayment => self.freeze_token_payment.is_some(),
            GuardKind::ProgramGate => self.program_gate.is_some(),
            GuardKind::Allocation => self.allocation.is_some(),
            GuardKind::Token2022Payment => self.token2022_payment.is_some(),
            GuardKind::SolFixedFee => self.sol_fixed_fee.is_some(),
            GuardKind::NftMintLimit => self.nft_mint_limit.is_some(),
            GuardKind::Edition => self.edition.is_some(),
            GuardKind::AssetPayment => self.asset_payment.is_some(),
            GuardKind::AssetBurn => self.asset_burn.is_some(),
            GuardKind::AssetMintLimit => self.asset_mint_limit.is_some(),
            GuardKind::AssetBurnMulti => self.asset_burn_multi.is_some(),
            GuardKind::AssetPaymentMulti => self.asset_payment_multi.is_some(),
            GuardKind::AssetGate => self.asset_gate.is_some(),
            GuardKind::VanityMint => self.vanity_mint.is_some(),
        }
    }

    /// Guard kinds present in this set, in feature-flag order
    pub fn active_kinds(&self) -> Vec<GuardKind> {
        GuardKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.is_active(*kind))
            .collect()
    }
}

/// A labelled guard set stored in the candy guard account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub label: String,
    pub guards: GuardSet,
}

/// Candy guard account snapshot: top-level guards plus labelled groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandyGuardConfig {
    #[serde(with = "pubkey_str")]
    pub address: Pubkey,
    /// Guards applied when no group is requested
    #[serde(alias = "guards", default)]
    pub default: GuardSet,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl CandyGuardConfig {
    /// Parse a JSON snapshot of a candy guard account
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn group(&self, label: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.label == label)
    }
}

/// The guard group a mint session runs against.
///
/// `guards` is `None` only in the degraded state where no candy guard
/// configuration was available; no mint is possible then.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardGroup {
    pub label: String,
    pub guards: Option<GuardSet>,
}

impl GuardGroup {
    pub fn new(label: impl Into<String>, guards: GuardSet) -> Self {
        Self {
            label: label.into(),
            guards: Some(guards),
        }
    }

    /// Group with no guards at all (configuration missing)
    pub fn unconfigured() -> Self {
        Self {
            label: DEFAULT_GROUP_LABEL.to_string(),
            guards: None,
        }
    }

    pub fn is_default(&self) -> bool {
        self.label == DEFAULT_GROUP_LABEL
    }

    /// Group argument passed to the candy guard program: `None` for the
    /// default guards, `Some(label)` for a named group
    pub fn group_arg(&self) -> Option<&str> {
        if self.is_default() {
            None
        } else {
            Some(self.label.as_str())
        }
    }

    pub fn is_active(&self, kind: GuardKind) -> bool {
        self.guards.as_ref().is_some_and(|guards| guards.is_active(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_kind_names_are_unique() {
        let mut names: Vec<&str> = GuardKind::ALL.iter().map(|kind| kind.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), GuardKind::ALL.len());
    }

    #[test]
    fn test_serde_name_matches_display() {
        for kind in GuardKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.to_string());
        }
    }

    #[test]
    fn test_snapshot_parsing_defaults_absent_guards() {
        let destination = Pubkey::new_unique();
        let json = format!(
            r#"{{
                "address": "{}",
                "guards": {{ "solPayment": {{ "lamports": 1000000000, "destination": "{}" }} }},
                "groups": [
                    {{ "label": "WL", "guards": {{ "mintLimit": {{ "id": 1, "limit": 2 }} }} }}
                ]
            }}"#,
            Pubkey::new_unique(),
            destination
        );

        let config = CandyGuardConfig::from_json(&json).unwrap();
        assert_eq!(config.default.active_kinds(), vec![GuardKind::SolPayment]);
        assert_eq!(
            config.default.sol_payment.as_ref().unwrap().destination,
            destination
        );

        let wl = config.group("WL").unwrap();
        assert_eq!(wl.guards.active_kinds(), vec![GuardKind::MintLimit]);
        assert!(config.group("OG").is_none());
    }

    #[test]
    fn test_group_arg() {
        let default = GuardGroup::new(DEFAULT_GROUP_LABEL, GuardSet::default());
        assert_eq!(default.group_arg(), None);

        let wl = GuardGroup::new("WL", GuardSet::default());
        assert_eq!(wl.group_arg(), Some("WL"));

        let unconfigured = GuardGroup::unconfigured();
        assert!(unconfigured.is_default());
        assert!(!unconfigured.is_active(GuardKind::SolPayment));
    }
}
