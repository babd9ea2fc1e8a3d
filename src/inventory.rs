//! Snapshot of the assets a minting wallet owns
//!
//! Burn, payment and mint-limit guards each need a concrete owned asset as
//! argument. The snapshot is owned by one mint-argument build: selections
//! that consume an asset remove it, mint-limit selections decrement the
//! asset's remaining counter.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::path::Path;

use crate::types::pubkey_str;

/// Token metadata standard of an owned NFT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStandard {
    NonFungible,
    FungibleAsset,
    Fungible,
    NonFungibleEdition,
    ProgrammableNonFungible,
    ProgrammableNonFungibleEdition,
}

/// Token-metadata NFT held by the wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedToken {
    #[serde(with = "pubkey_str")]
    pub mint: Pubkey,

    /// Collection key from the token's metadata
    #[serde(default, with = "pubkey_str::opt")]
    pub collection: Option<Pubkey>,

    #[serde(default)]
    pub token_standard: Option<TokenStandard>,

    /// Authorization rule set of a programmable NFT
    #[serde(default, with = "pubkey_str::opt")]
    pub rule_set: Option<Pubkey>,

    /// Mints this token can still back under nftMintLimit; unknown counts as none
    #[serde(default)]
    pub mint_limit_remaining: Option<u16>,
}

impl OwnedToken {
    pub fn new(mint: Pubkey, collection: Option<Pubkey>) -> Self {
        Self {
            mint,
            collection,
            token_standard: None,
            rule_set: None,
            mint_limit_remaining: None,
        }
    }

    /// Standard and rule set to pass to the candy guard.
    ///
    /// Only programmable NFTs carry a rule set; every other standard is
    /// treated as a plain `NonFungible`.
    pub fn resolved_standard(&self) -> (TokenStandard, Option<Pubkey>) {
        match self.token_standard {
            Some(TokenStandard::ProgrammableNonFungible) => {
                (TokenStandard::ProgrammableNonFungible, self.rule_set)
            }
            _ => (TokenStandard::NonFungible, None),
        }
    }

    fn in_collection(&self, collection: &Pubkey) -> bool {
        self.collection.as_ref() == Some(collection)
    }

    fn has_mint_limit_left(&self) -> bool {
        self.mint_limit_remaining.is_some_and(|remaining| remaining > 0)
    }
}

/// Core asset held by the wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedCoreAsset {
    #[serde(with = "pubkey_str")]
    pub address: Pubkey,

    /// Collection the asset belongs to (its update authority)
    #[serde(default, with = "pubkey_str::opt")]
    pub collection: Option<Pubkey>,

    /// Mints this asset can still back under assetMintLimit; unknown counts as none
    #[serde(default)]
    pub mint_limit_remaining: Option<u16>,
}

impl OwnedCoreAsset {
    pub fn new(address: Pubkey, collection: Option<Pubkey>) -> Self {
        Self {
            address,
            collection,
            mint_limit_remaining: None,
        }
    }

    fn in_collection(&self, collection: &Pubkey) -> bool {
        self.collection.as_ref() == Some(collection)
    }

    fn has_mint_limit_left(&self) -> bool {
        self.mint_limit_remaining.is_some_and(|remaining| remaining > 0)
    }
}

/// Everything the wallet owns that guards may select from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OwnedAssetInventory {
    pub tokens: Vec<OwnedToken>,
    pub core_assets: Vec<OwnedCoreAsset>,
}

impl OwnedAssetInventory {
    pub fn new(tokens: Vec<OwnedToken>, core_assets: Vec<OwnedCoreAsset>) -> Self {
        Self {
            tokens,
            core_assets,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read inventory file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse inventory file {}", path.display()))
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.core_assets.is_empty()
    }

    /// First token of `collection`, left in place
    pub fn find_token(&self, collection: &Pubkey) -> Option<&OwnedToken> {
        self.tokens.iter().find(|token| token.in_collection(collection))
    }

    /// Remove and return the first token of `collection`
    pub fn take_token(&mut self, collection: &Pubkey) -> Option<OwnedToken> {
        let index = self
            .tokens
            .iter()
            .position(|token| token.in_collection(collection))?;
        Some(self.tokens.remove(index))
    }

    /// First token of `collection` with mint-limit capacity left; its counter
    /// is decremented
    pub fn claim_token_mint_limit(&mut self, collection: &Pubkey) -> Option<OwnedToken> {
        let token = self
            .tokens
            .iter_mut()
            .find(|token| token.in_collection(collection) && token.has_mint_limit_left())?;
        token.mint_limit_remaining = token.mint_limit_remaining.map(|n| n - 1);
        Some(token.clone())
    }

    /// First Core asset of `collection`, left in place
    pub fn find_core_asset(&self, collection: &Pubkey) -> Option<&OwnedCoreAsset> {
        self.core_assets
            .iter()
            .find(|asset| asset.in_collection(collection))
    }

    pub fn count_core_assets(&self, collection: &Pubkey) -> usize {
        self.core_assets
            .iter()
            .filter(|asset| asset.in_collection(collection))
            .count()
    }

    /// Remove and return the first `count` Core assets of `collection`.
    ///
    /// Nothing is removed unless all `count` are available. A count of zero
    /// always succeeds with no assets.
    pub fn take_core_assets(
        &mut self,
        collection: &Pubkey,
        count: usize,
    ) -> Option<Vec<OwnedCoreAsset>> {
        if count == 0 {
            return Some(Vec::new());
        }
        if self.count_core_assets(collection) < count {
            return None;
        }

        let mut taken = Vec::with_capacity(count);
        let mut kept = Vec::with_capacity(self.core_assets.len() - count);
        for asset in self.core_assets.drain(..) {
            if taken.len() < count && asset.in_collection(collection) {
                taken.push(asset);
            } else {
                kept.push(asset);
            }
        }
        self.core_assets = kept;
        Some(taken)
    }

    pub fn take_core_asset(&mut self, collection: &Pubkey) -> Option<OwnedCoreAsset> {
        self.take_core_assets(collection, 1)
            .and_then(|mut assets| assets.pop())
    }

    /// First Core asset of `collection` with mint-limit capacity left; its
    /// counter is decremented
    pub fn claim_core_mint_limit(&mut self, collection: &Pubkey) -> Option<OwnedCoreAsset> {
        let asset = self
            .core_assets
            .iter_mut()
            .find(|asset| asset.in_collection(collection) && asset.has_mint_limit_left())?;
        asset.mint_limit_remaining = asset.mint_limit_remaining.map(|n| n - 1);
        Some(asset.clone())
    }
}
