//! Batch-level behaviour of mint argument building across several guards

use proptest::prelude::*;
use solana_sdk::pubkey::Pubkey;

use crate::allowlist::AllowlistStore;
use crate::guards::*;
use crate::inventory::{OwnedAssetInventory, OwnedCoreAsset, OwnedToken};
use crate::mint_args::{build_mint_args, GuardIssue};
use crate::structured_logging::MintLogger;

fn core_assets(collection: Pubkey, n: usize) -> Vec<OwnedCoreAsset> {
    (0..n)
        .map(|_| OwnedCoreAsset::new(Pubkey::new_unique(), Some(collection)))
        .collect()
}

fn limited_token(collection: Pubkey, remaining: u16) -> OwnedToken {
    let mut token = OwnedToken::new(Pubkey::new_unique(), Some(collection));
    token.mint_limit_remaining = Some(remaining);
    token
}

#[test]
fn test_mixed_guards_consume_inventory_across_units() {
    let burn_collection = Pubkey::new_unique();
    let pay_collection = Pubkey::new_unique();
    let destination = Pubkey::new_unique();

    let guards = GuardSet {
        mint_limit: Some(MintLimit { id: 4, limit: 10 }),
        nft_burn: Some(NftBurn {
            required_collection: burn_collection,
        }),
        asset_payment_multi: Some(AssetPaymentMulti {
            required_collection: pay_collection,
            destination,
            num: 2,
        }),
        sol_payment: Some(SolPayment {
            lamports: 5,
            destination,
        }),
        ..Default::default()
    };
    let group = GuardGroup::new("mixed", guards);

    let inventory = OwnedAssetInventory::new(
        vec![
            OwnedToken::new(Pubkey::new_unique(), Some(burn_collection)),
            OwnedToken::new(Pubkey::new_unique(), Some(burn_collection)),
        ],
        core_assets(pay_collection, 5),
    );

    let batch = build_mint_args(
        &group,
        &AllowlistStore::new(),
        inventory,
        3,
        &MintLogger::for_new_session(),
    );

    assert_eq!(batch.records.len(), 3);
    for record in &batch.records {
        assert_eq!(record.mint_limit.as_ref().map(|args| args.id), Some(4));
        assert!(record.sol_payment.is_some());
    }

    // Two burnable tokens for three units
    assert!(batch.records[0].nft_burn.is_some());
    assert!(batch.records[1].nft_burn.is_some());
    assert!(batch.records[2].nft_burn.is_none());
    assert_ne!(
        batch.records[0].nft_burn.as_ref().map(|nft| nft.mint),
        batch.records[1].nft_burn.as_ref().map(|nft| nft.mint)
    );

    // Five Core assets cover two units of two
    assert!(batch.records[1].asset_payment_multi.is_some());
    assert!(batch.records[2].asset_payment_multi.is_none());

    assert_eq!(batch.diagnostics.len(), 2);
    assert!(batch.diagnostics.iter().all(|d| d.unit == 2));
    assert!(batch.diagnostics.iter().any(|d| d.issue
        == GuardIssue::InsufficientAssets {
            required_collection: pay_collection,
            required: 2,
            available: 1,
        }));

    assert!(batch.inventory.tokens.is_empty());
    assert_eq!(batch.inventory.core_assets.len(), 1);
}

#[test]
fn test_no_owned_asset_is_selected_twice() {
    let collection = Pubkey::new_unique();
    let guards = GuardSet {
        asset_burn: Some(AssetBurn {
            required_collection: collection,
        }),
        asset_payment: Some(AssetPayment {
            required_collection: collection,
            destination: Pubkey::new_unique(),
        }),
        ..Default::default()
    };
    let group = GuardGroup::new("default", guards);
    let inventory = OwnedAssetInventory::new(Vec::new(), core_assets(collection, 6));

    let batch = build_mint_args(
        &group,
        &AllowlistStore::new(),
        inventory,
        3,
        &MintLogger::for_new_session(),
    );

    let mut selected: Vec<Pubkey> = batch
        .records
        .iter()
        .flat_map(|record| {
            record
                .asset_burn
                .iter()
                .map(|args| args.asset)
                .chain(record.asset_payment.iter().map(|args| args.asset))
        })
        .collect();
    assert_eq!(selected.len(), 6);
    selected.sort();
    selected.dedup();
    assert_eq!(selected.len(), 6);
    assert!(batch.is_clean());
}

#[test]
fn test_allowlist_root_shared_by_all_units() {
    let member = Pubkey::new_unique();
    let mut allowlists = AllowlistStore::new();
    allowlists.insert("WL", vec![member.to_string(), Pubkey::new_unique().to_string()]);
    let root = allowlists.merkle_root("WL");

    let guards = GuardSet {
        allow_list: Some(AllowList {
            merkle_root: root.unwrap_or_default(),
        }),
        ..Default::default()
    };
    let batch = build_mint_args(
        &GuardGroup::new("WL", guards),
        &allowlists,
        OwnedAssetInventory::default(),
        4,
        &MintLogger::for_new_session(),
    );

    assert!(batch
        .records
        .iter()
        .all(|record| record.allow_list.as_ref().map(|args| args.merkle_root) == root));
}

#[test]
fn test_serialized_records_omit_absent_guards() {
    let guards = GuardSet {
        mint_limit: Some(MintLimit { id: 1, limit: 2 }),
        ..Default::default()
    };
    let batch = build_mint_args(
        &GuardGroup::new("default", guards),
        &AllowlistStore::new(),
        OwnedAssetInventory::default(),
        1,
        &MintLogger::for_new_session(),
    );

    let json = serde_json::to_value(&batch.records[0]).unwrap();
    assert_eq!(json, serde_json::json!({ "mintLimit": { "id": 1 } }));
}

fn guard_set_from_mask(mask: u16, collection: Pubkey) -> GuardSet {
    let destination = Pubkey::new_unique();
    let mint = Pubkey::new_unique();
    let bit = |n: u16| mask & (1 << n) != 0;

    GuardSet {
        sol_payment: bit(0).then_some(SolPayment {
            lamports: 1,
            destination,
        }),
        token_payment: bit(1).then_some(TokenPayment {
            amount: 1,
            mint,
            destination_ata: destination,
        }),
        mint_limit: bit(2).then_some(MintLimit { id: 1, limit: 3 }),
        nft_gate: bit(3).then_some(NftGate {
            required_collection: collection,
        }),
        nft_burn: bit(4).then_some(NftBurn {
            required_collection: collection,
        }),
        asset_gate: bit(5).then_some(AssetGate {
            required_collection: collection,
        }),
        asset_burn_multi: bit(6).then_some(AssetBurnMulti {
            required_collection: collection,
            num: 2,
        }),
        start_date: bit(7).then_some(StartDate { date: 0 }),
        gatekeeper: bit(8).then_some(Gatekeeper {
            gatekeeper_network: destination,
            expire_on_use: true,
        }),
        token_gate: bit(9).then_some(TokenGate { amount: 1, mint }),
        redeemed_amount: bit(10).then_some(RedeemedAmount { maximum: 100 }),
        allocation: bit(11).then_some(Allocation { id: 2, limit: 50 }),
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn prop_records_only_carry_active_guards(
        mask in any::<u16>(),
        tokens in 0usize..4,
        assets in 0usize..6,
        quantity in 0usize..5,
    ) {
        let collection = Pubkey::new_unique();
        let guards = guard_set_from_mask(mask, collection);
        let active = guards.active_kinds();
        let group = GuardGroup::new("default", guards);
        let inventory = OwnedAssetInventory::new(
            (0..tokens)
                .map(|_| OwnedToken::new(Pubkey::new_unique(), Some(collection)))
                .collect(),
            core_assets(collection, assets),
        );

        let batch = build_mint_args(
            &group,
            &AllowlistStore::new(),
            inventory,
            quantity,
            &MintLogger::for_new_session(),
        );

        prop_assert_eq!(batch.records.len(), quantity);
        for record in &batch.records {
            for kind in record.present_kinds() {
                prop_assert!(active.contains(&kind));
            }
        }
        for diagnostic in &batch.diagnostics {
            prop_assert!(active.contains(&diagnostic.guard));
            prop_assert!(diagnostic.unit < quantity);
        }
    }

    #[test]
    fn prop_mint_limit_claims_never_exceed_remaining(
        remaining in proptest::collection::vec(0u16..4, 0..5),
        quantity in 0usize..12,
    ) {
        let collection = Pubkey::new_unique();
        let guards = GuardSet {
            nft_mint_limit: Some(NftMintLimit {
                id: 9,
                limit: 3,
                required_collection: collection,
            }),
            ..Default::default()
        };
        let inventory = OwnedAssetInventory::new(
            remaining.iter().map(|n| limited_token(collection, *n)).collect(),
            Vec::new(),
        );
        let capacity: usize = remaining.iter().map(|n| *n as usize).sum();

        let batch = build_mint_args(
            &GuardGroup::new("default", guards),
            &AllowlistStore::new(),
            inventory,
            quantity,
            &MintLogger::for_new_session(),
        );

        let claimed = batch
            .records
            .iter()
            .filter(|record| record.nft_mint_limit.is_some())
            .count();
        prop_assert_eq!(claimed, quantity.min(capacity));
        prop_assert_eq!(batch.diagnostics.len(), quantity - claimed);

        let left: usize = batch
            .inventory
            .tokens
            .iter()
            .map(|token| token.mint_limit_remaining.unwrap_or_default() as usize)
            .sum();
        prop_assert_eq!(left, capacity - claimed);
    }
}
