//! Mint-time guard arguments
//!
//! Every active guard that needs input at mint time gets one entry in a
//! unit's [`MintArgs`]. Guards that select an owned asset do so from the
//! batch's inventory snapshot, so later units of the same batch never reuse
//! a burned or paid asset and never overdraw a mint-limit counter.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::fmt;

use crate::allowlist::AllowlistStore;
use crate::guards::{GuardGroup, GuardKind, GuardSet};
use crate::inventory::{OwnedAssetInventory, OwnedToken, TokenStandard};
use crate::structured_logging::MintLogger;
use crate::types::{hex32, pubkey_str};

/// `{ id }` for allocation and mintLimit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdArgs {
    pub id: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowListArgs {
    #[serde(with = "hex32")]
    pub merkle_root: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetArgs {
    #[serde(with = "pubkey_str")]
    pub asset: Pubkey,
    #[serde(with = "pubkey_str")]
    pub required_collection: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPaymentArgs {
    #[serde(with = "pubkey_str")]
    pub asset: Pubkey,
    #[serde(with = "pubkey_str")]
    pub required_collection: Pubkey,
    #[serde(with = "pubkey_str")]
    pub destination: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMultiArgs {
    #[serde(with = "pubkey_str::vec")]
    pub assets: Vec<Pubkey>,
    #[serde(with = "pubkey_str")]
    pub required_collection: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPaymentMultiArgs {
    #[serde(with = "pubkey_str::vec")]
    pub assets: Vec<Pubkey>,
    #[serde(with = "pubkey_str")]
    pub required_collection: Pubkey,
    #[serde(with = "pubkey_str")]
    pub destination: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMintLimitArgs {
    pub id: u8,
    #[serde(with = "pubkey_str")]
    pub asset: Pubkey,
}

/// Selected token-metadata NFT, for nftBurn and nftGate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftArgs {
    #[serde(with = "pubkey_str")]
    pub mint: Pubkey,
    #[serde(with = "pubkey_str")]
    pub required_collection: Pubkey,
    pub token_standard: TokenStandard,
    #[serde(
        default,
        with = "pubkey_str::opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub rule_set: Option<Pubkey>,
}

impl NftArgs {
    fn from_token(token: &OwnedToken, required_collection: Pubkey) -> Self {
        let (token_standard, rule_set) = token.resolved_standard();
        Self {
            mint: token.mint,
            required_collection,
            token_standard,
            rule_set,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftPaymentArgs {
    #[serde(flatten)]
    pub nft: NftArgs,
    #[serde(with = "pubkey_str")]
    pub destination: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftMintLimitArgs {
    pub id: u8,
    #[serde(flatten)]
    pub nft: NftArgs,
}

/// `{ destination }` for freezeSolPayment, solFixedFee and solPayment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationArgs {
    #[serde(with = "pubkey_str")]
    pub destination: Pubkey,
}

/// `{ mint, destinationAta }` for the token payment guards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPaymentArgs {
    #[serde(with = "pubkey_str")]
    pub mint: Pubkey,
    #[serde(with = "pubkey_str")]
    pub destination_ata: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatekeeperArgs {
    #[serde(with = "pubkey_str")]
    pub gatekeeper_network: Pubkey,
    pub expire_on_use: bool,
}

/// `{ mint }` for tokenBurn and tokenGate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMintArgs {
    #[serde(with = "pubkey_str")]
    pub mint: Pubkey,
}

/// Guard arguments for one mint unit; absent fields are not sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MintArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation: Option<IdArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_list: Option<AllowListArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_burn: Option<AssetArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_burn_multi: Option<AssetMultiArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_gate: Option<AssetArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_mint_limit: Option<AssetMintLimitArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_payment: Option<AssetPaymentArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_payment_multi: Option<AssetPaymentMultiArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freeze_sol_payment: Option<DestinationArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freeze_token_payment: Option<TokenPaymentArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gatekeeper: Option<GatekeeperArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint_limit: Option<IdArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nft_burn: Option<NftArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nft_gate: Option<NftArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nft_mint_limit: Option<NftMintLimitArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nft_payment: Option<NftPaymentArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sol_fixed_fee: Option<DestinationArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sol_payment: Option<DestinationArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token2022_payment: Option<TokenPaymentArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_burn: Option<TokenMintArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_gate: Option<TokenMintArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_payment: Option<TokenPaymentArgs>,
}

impl MintArgs {
    /// Guard kinds that carry an argument in this record
    pub fn present_kinds(&self) -> Vec<GuardKind> {
        let present = [
            (GuardKind::Allocation, self.allocation.is_some()),
            (GuardKind::AllowList, self.allow_list.is_some()),
            (GuardKind::AssetBurn, self.asset_burn.is_some()),
            (GuardKind::AssetBurnMulti, self.asset_burn_multi.is_some()),
            (GuardKind::AssetGate, self.asset_gate.is_some()),
            (GuardKind::AssetMintLimit, self.asset_mint_limit.is_some()),
            (GuardKind::AssetPayment, self.asset_payment.is_some()),
            (GuardKind::AssetPaymentMulti, self.asset_payment_multi.is_some()),
            (GuardKind::FreezeSolPayment, self.freeze_sol_payment.is_some()),
            (GuardKind::FreezeTokenPayment, self.freeze_token_payment.is_some()),
            (GuardKind::Gatekeeper, self.gatekeeper.is_some()),
            (GuardKind::MintLimit, self.mint_limit.is_some()),
            (GuardKind::NftBurn, self.nft_burn.is_some()),
            (GuardKind::NftGate, self.nft_gate.is_some()),
            (GuardKind::NftMintLimit, self.nft_mint_limit.is_some()),
            (GuardKind::NftPayment, self.nft_payment.is_some()),
            (GuardKind::SolFixedFee, self.sol_fixed_fee.is_some()),
            (GuardKind::SolPayment, self.sol_payment.is_some()),
            (GuardKind::Token2022Payment, self.token2022_payment.is_some()),
            (GuardKind::TokenBurn, self.token_burn.is_some()),
            (GuardKind::TokenGate, self.token_gate.is_some()),
            (GuardKind::TokenPayment, self.token_payment.is_some()),
        ];
        let mut kinds: Vec<GuardKind> = present
            .into_iter()
            .filter_map(|(kind, is_present)| is_present.then_some(kind))
            .collect();
        kinds.sort();
        kinds
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Why a guard's argument could not be built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GuardIssue {
    /// No allowlist registered under the group label
    AllowlistMissing { label: String },
    /// No owned asset of the required collection left
    NoMatchingAsset {
        #[serde(with = "pubkey_str")]
        required_collection: Pubkey,
    },
    /// Fewer owned assets of the required collection than the guard takes
    InsufficientAssets {
        #[serde(with = "pubkey_str")]
        required_collection: Pubkey,
        required: usize,
        available: usize,
    },
    /// Every matching asset has used up its mint limit
    MintLimitExhausted {
        #[serde(with = "pubkey_str")]
        required_collection: Pubkey,
    },
    /// The local allowlist root differs from the one stored in the guard
    MerkleRootMismatch {
        #[serde(with = "hex32")]
        on_chain: [u8; 32],
        #[serde(with = "hex32")]
        local: [u8; 32],
    },
    /// Needs a co-signer this client cannot provide
    Unsupported,
}

impl fmt::Display for GuardIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardIssue::AllowlistMissing { label } => {
                write!(f, "allowlist for guard group {} not found", label)
            }
            GuardIssue::NoMatchingAsset {
                required_collection,
            } => write!(f, "no owned asset of collection {}", required_collection),
            GuardIssue::InsufficientAssets {
                required_collection,
                required,
                available,
            } => write!(
                f,
                "needs {} assets of collection {}, {} owned",
                required, required_collection, available
            ),
            GuardIssue::MintLimitExhausted {
                required_collection,
            } => write!(
                f,
                "no asset of collection {} has mints left",
                required_collection
            ),
            GuardIssue::MerkleRootMismatch { on_chain, local } => write!(
                f,
                "allowlist root {} does not match guard root {}",
                hex::encode(local),
                hex::encode(on_chain)
            ),
            GuardIssue::Unsupported => f.write_str("not supported without a backend signer"),
        }
    }
}

/// A guard whose argument was omitted from one unit, or is expected to be
/// rejected on chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardDiagnostic {
    pub unit: usize,
    pub guard: GuardKind,
    pub issue: GuardIssue,
}

/// Result of building the arguments for a batch of mint units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintArgsBatch {
    /// One record per unit, in unit order
    pub records: Vec<MintArgs>,
    pub diagnostics: Vec<GuardDiagnostic>,
    /// Inventory left after all selections
    pub inventory: OwnedAssetInventory,
}

impl MintArgsBatch {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Builds [`MintArgs`] for every unit of a batch against one guard group
pub struct MintArgsBuilder<'a> {
    group: &'a GuardGroup,
    allowlists: &'a AllowlistStore,
    logger: &'a MintLogger,
}

impl<'a> MintArgsBuilder<'a> {
    pub fn new(group: &'a GuardGroup, allowlists: &'a AllowlistStore, logger: &'a MintLogger) -> Self {
        Self {
            group,
            allowlists,
            logger,
        }
    }

    pub fn build(&self, inventory: OwnedAssetInventory, quantity: usize) -> MintArgsBatch {
        let mut inventory = inventory;
        let mut diagnostics = Vec::new();

        let Some(guards) = self.group.guards.as_ref() else {
            self.logger.log_mint_args_built(&self.group.label, quantity, 0);
            return MintArgsBatch {
                records: vec![MintArgs::default(); quantity],
                diagnostics,
                inventory,
            };
        };

        // The root depends only on the group, not on the unit
        let allow_list_root = guards
            .allow_list
            .as_ref()
            .map(|_| self.allowlists.merkle_root(&self.group.label));

        // Reported once per batch; every unit carries the same root
        if let (Some(guard), Some(Some(local))) = (guards.allow_list.as_ref(), allow_list_root) {
            if quantity > 0 && guard.merkle_root != local {
                self.logger
                    .log_merkle_root_mismatch(&self.group.label, &guard.merkle_root, &local);
                diagnostics.push(GuardDiagnostic {
                    unit: 0,
                    guard: GuardKind::AllowList,
                    issue: GuardIssue::MerkleRootMismatch {
                        on_chain: guard.merkle_root,
                        local,
                    },
                });
            }
        }

        let records = (0..quantity)
            .map(|unit| {
                self.build_unit(unit, guards, allow_list_root, &mut inventory, &mut diagnostics)
            })
            .collect();

        self.logger
            .log_mint_args_built(&self.group.label, quantity, diagnostics.len());

        MintArgsBatch {
            records,
            diagnostics,
            inventory,
        }
    }

    fn build_unit(
        &self,
        unit: usize,
        guards: &GuardSet,
        allow_list_root: Option<Option<[u8; 32]>>,
        inventory: &mut OwnedAssetInventory,
        diagnostics: &mut Vec<GuardDiagnostic>,
    ) -> MintArgs {
        let mut args = MintArgs::default();
        let mut omit = |guard: GuardKind, issue: GuardIssue| {
            self.logger.log_guard_unsatisfied(unit, guard, &issue.to_string());
            diagnostics.push(GuardDiagnostic { unit, guard, issue });
        };

        if let Some(allocation) = &guards.allocation {
            args.allocation = Some(IdArgs { id: allocation.id });
        }

        match allow_list_root {
            Some(Some(merkle_root)) => args.allow_list = Some(AllowListArgs { merkle_root }),
            Some(None) => {
                self.logger.log_allowlist_missing(&self.group.label);
                omit(
                    GuardKind::AllowList,
                    GuardIssue::AllowlistMissing {
                        label: self.group.label.clone(),
                    },
                );
            }
            None => {}
        }

        if let Some(guard) = &guards.asset_burn {
            let required_collection = guard.required_collection;
            match inventory.take_core_asset(&required_collection) {
                Some(asset) => {
                    args.asset_burn = Some(AssetArgs {
                        asset: asset.address,
                        required_collection,
                    })
                }
                None => omit(
                    GuardKind::AssetBurn,
                    GuardIssue::NoMatchingAsset {
                        required_collection,
                    },
                ),
            }
        }

        if let Some(guard) = &guards.asset_burn_multi {
            let required_collection = guard.required_collection;
            let required = guard.num as usize;
            match inventory.take_core_assets(&required_collection, required) {
                Some(assets) => {
                    args.asset_burn_multi = Some(AssetMultiArgs {
                        assets: assets.into_iter().map(|asset| asset.address).collect(),
                        required_collection,
                    })
                }
                None => omit(
                    GuardKind::AssetBurnMulti,
                    GuardIssue::InsufficientAssets {
                        required_collection,
                        required,
                        available: inventory.count_core_assets(&required_collection),
                    },
                ),
            }
        }

        if let Some(guard) = &guards.asset_payment {
            let required_collection = guard.required_collection;
            match inventory.take_core_asset(&required_collection) {
                Some(asset) => {
                    args.asset_payment = Some(AssetPaymentArgs {
                        asset: asset.address,
                        required_collection,
                        destination: guard.destination,
                    })
                }
                None => omit(
                    GuardKind::AssetPayment,
                    GuardIssue::NoMatchingAsset {
                        required_collection,
                    },
                ),
            }
        }

        if let Some(guard) = &guards.asset_payment_multi {
            let required_collection = guard.required_collection;
            let required = guard.num as usize;
            match inventory.take_core_assets(&required_collection, required) {
                Some(assets) => {
                    args.asset_payment_multi = Some(AssetPaymentMultiArgs {
                        assets: assets.into_iter().map(|asset| asset.address).collect(),
                        required_collection,
                        destination: guard.destination,
                    })
                }
                None => omit(
                    GuardKind::AssetPaymentMulti,
                    GuardIssue::InsufficientAssets {
                        required_collection,
                        required,
                        available: inventory.count_core_assets(&required_collection),
                    },
                ),
            }
        }

        if let Some(guard) = &guards.asset_mint_limit {
            let required_collection = guard.required_collection;
            match inventory.claim_core_mint_limit(&required_collection) {
                Some(asset) => {
                    args.asset_mint_limit = Some(AssetMintLimitArgs {
                        id: guard.id,
                        asset: asset.address,
                    })
                }
                None => omit(
                    GuardKind::AssetMintLimit,
                    GuardIssue::MintLimitExhausted {
                        required_collection,
                    },
                ),
            }
        }

        if let Some(guard) = &guards.asset_gate {
            let required_collection = guard.required_collection;
            match inventory.find_core_asset(&required_collection) {
                Some(asset) => {
                    args.asset_gate = Some(AssetArgs {
                        asset: asset.address,
                        required_collection,
                    })
                }
                None => omit(
                    GuardKind::AssetGate,
                    GuardIssue::NoMatchingAsset {
                        required_collection,
                    },
                ),
            }
        }

        if let Some(guard) = &guards.freeze_sol_payment {
            args.freeze_sol_payment = Some(DestinationArgs {
                destination: guard.destination,
            });
        }

        if let Some(guard) = &guards.freeze_token_payment {
            args.freeze_token_payment = Some(TokenPaymentArgs {
                mint: guard.mint,
                destination_ata: guard.destination_ata,
            });
        }

        if let Some(guard) = &guards.gatekeeper {
            args.gatekeeper = Some(GatekeeperArgs {
                gatekeeper_network: guard.gatekeeper_network,
                expire_on_use: guard.expire_on_use,
            });
        }

        if let Some(guard) = &guards.mint_limit {
            args.mint_limit = Some(IdArgs { id: guard.id });
        }

        if let Some(guard) = &guards.nft_burn {
            let required_collection = guard.required_collection;
            match inventory.take_token(&required_collection) {
                Some(token) => args.nft_burn = Some(NftArgs::from_token(&token, required_collection)),
                None => omit(
                    GuardKind::NftBurn,
                    GuardIssue::NoMatchingAsset {
                        required_collection,
                    },
                ),
            }
        }

        if let Some(guard) = &guards.nft_gate {
            let required_collection = guard.required_collection;
            match inventory.find_token(&required_collection) {
                Some(token) => args.nft_gate = Some(NftArgs::from_token(token, required_collection)),
                None => omit(
                    GuardKind::NftGate,
                    GuardIssue::NoMatchingAsset {
                        required_collection,
                    },
                ),
            }
        }

        if let Some(guard) = &guards.nft_mint_limit {
            let required_collection = guard.required_collection;
            match inventory.claim_token_mint_limit(&required_collection) {
                Some(token) => {
                    args.nft_mint_limit = Some(NftMintLimitArgs {
                        id: guard.id,
                        nft: NftArgs::from_token(&token, required_collection),
                    })
                }
                None => omit(
                    GuardKind::NftMintLimit,
                    GuardIssue::MintLimitExhausted {
                        required_collection,
                    },
                ),
            }
        }

        if let Some(guard) = &guards.nft_payment {
            let required_collection = guard.required_collection;
            match inventory.take_token(&required_collection) {
                Some(token) => {
                    args.nft_payment = Some(NftPaymentArgs {
                        nft: NftArgs::from_token(&token, required_collection),
                        destination: guard.destination,
                    })
                }
                None => omit(
                    GuardKind::NftPayment,
                    GuardIssue::NoMatchingAsset {
                        required_collection,
                    },
                ),
            }
        }

        if let Some(guard) = &guards.sol_fixed_fee {
            args.sol_fixed_fee = Some(DestinationArgs {
                destination: guard.destination,
            });
        }

        if let Some(guard) = &guards.sol_payment {
            args.sol_payment = Some(DestinationArgs {
                destination: guard.destination,
            });
        }

        if guards.third_party_signer.is_some() {
            omit(GuardKind::ThirdPartySigner, GuardIssue::Unsupported);
        }

        if let Some(guard) = &guards.token2022_payment {
            args.token2022_payment = Some(TokenPaymentArgs {
                mint: guard.mint,
                destination_ata: guard.destination_ata,
            });
        }

        if let Some(guard) = &guards.token_burn {
            args.token_burn = Some(TokenMintArgs { mint: guard.mint });
        }

        if let Some(guard) = &guards.token_gate {
            args.token_gate = Some(TokenMintArgs { mint: guard.mint });
        }

        if let Some(guard) = &guards.token_payment {
            args.token_payment = Some(TokenPaymentArgs {
                mint: guard.mint,
                destination_ata: guard.destination_ata,
            });
        }

        args
    }
}

/// Build the arguments for `quantity` mint units of `group`
pub fn build_mint_args(
    group: &GuardGroup,
    allowlists: &AllowlistStore,
    inventory: OwnedAssetInventory,
    quantity: usize,
    logger: &MintLogger,
) -> MintArgsBatch {
    MintArgsBuilder::new(group, allowlists, logger).build(inventory, quantity)
}
