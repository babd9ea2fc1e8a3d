//! Integration tests for the mint preparation flow
//!
//! This test validates, through the public API only:
//! - Loading a candy guard snapshot, allowlists and an inventory from JSON
//! - Group selection and per-unit guard arguments
//! - Preflight routes and packed, budgeted mint transactions

use candy_mint::config::ComputeConfig;
use candy_mint::test_utils::{
    sample_candy_machine, FakeCandyGuardProgram, ScriptedSimulator, StaticProofSource,
};
use candy_mint::{
    AllowlistStore, CandyGuardConfig, GuardKind, MintRequest, MintServices, MintSession,
    OwnedAssetInventory,
};
use solana_sdk::{hash::Hash, pubkey::Pubkey};
use std::sync::Arc;

struct Snapshot {
    candy_guard: CandyGuardConfig,
    allowlists: AllowlistStore,
    inventory: OwnedAssetInventory,
    user: Pubkey,
    burn_collection: Pubkey,
}

fn snapshot() -> Snapshot {
    let user = Pubkey::new_unique();
    let treasury = Pubkey::new_unique();
    let burn_collection = Pubkey::new_unique();

    let allowlists = AllowlistStore::from_json(&format!(
        r#"{{ "WL": ["{}", "{}", "{}"] }}"#,
        Pubkey::new_unique(),
        user,
        Pubkey::new_unique()
    ))
    .unwrap();
    let root = hex::encode(allowlists.merkle_root("WL").unwrap());

    let candy_guard = CandyGuardConfig::from_json(&format!(
        r#"{{
            "address": "{guard}",
            "guards": {{ "solPayment": {{ "lamports": 2000000000, "destination": "{treasury}" }} }},
            "groups": [
                {{
                    "label": "WL",
                    "guards": {{
                        "allowList": {{ "merkleRoot": "{root}" }},
                        "mintLimit": {{ "id": 1, "limit": 2 }},
                        "solPayment": {{ "lamports": 1000000000, "destination": "{treasury}" }}
                    }}
                }},
                {{
                    "label": "burn",
                    "guards": {{
                        "nftBurn": {{ "requiredCollection": "{burn_collection}" }}
                    }}
                }}
            ]
        }}"#,
        guard = Pubkey::new_unique(),
    ))
    .unwrap();

    let inventory: OwnedAssetInventory = serde_json::from_str(&format!(
        r#"{{
            "tokens": [
                {{ "mint": "{}", "collection": "{burn_collection}", "tokenStandard": "ProgrammableNonFungible", "ruleSet": "{}" }},
                {{ "mint": "{}", "collection": "{}" }}
            ]
        }}"#,
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        Pubkey::new_unique(),
    ))
    .unwrap();

    Snapshot {
        candy_guard,
        allowlists,
        inventory,
        user,
        burn_collection,
    }
}

fn session(snapshot: &Snapshot, program: Arc<FakeCandyGuardProgram>) -> MintSession {
    MintSession::new(
        sample_candy_machine(),
        Some(snapshot.candy_guard.clone()),
        Arc::new(snapshot.allowlists.clone()),
        MintServices {
            program,
            proofs: Arc::new(StaticProofSource::empty()),
            simulator: Arc::new(ScriptedSimulator::always_consuming(380_000)),
        },
        ComputeConfig::default(),
    )
}

fn request(snapshot: &Snapshot, label: &str, quantity: usize) -> MintRequest {
    MintRequest {
        label: label.to_string(),
        user: snapshot.user,
        assets: (0..quantity).map(|_| Pubkey::new_unique()).collect(),
        inventory: snapshot.inventory.clone(),
        lookup_tables: Vec::new(),
        blockhash: Hash::new_unique(),
    }
}

#[tokio::test]
async fn test_allow_list_group_flow() {
    let snapshot = snapshot();
    let program = Arc::new(FakeCandyGuardProgram::new());
    let session = session(&snapshot, program.clone());

    let plan = session.prepare(request(&snapshot, "WL", 2)).await.unwrap();

    assert_eq!(plan.group.label, "WL");
    assert!(plan.mint_args.is_clean());
    let mut expected = vec![GuardKind::SolPayment, GuardKind::AllowList, GuardKind::MintLimit];
    expected.sort();
    for record in &plan.mint_args.records {
        assert_eq!(record.present_kinds(), expected);
    }

    assert_eq!(plan.preflight.len(), 1);
    assert_eq!(program.recorded_routes().len(), 1);
    assert_eq!(program.recorded_routes()[0].group.as_deref(), Some("WL"));

    assert!(!plan.mint_transactions.is_empty());
    assert!(plan
        .mint_transactions
        .iter()
        .all(|output| output.needs_signature_from(&snapshot.user)));
}

#[tokio::test]
async fn test_burn_group_threads_rule_set_and_reports_shortfall() {
    let snapshot = snapshot();
    let program = Arc::new(FakeCandyGuardProgram::new());
    let session = session(&snapshot, program.clone());

    let plan = session.prepare(request(&snapshot, "burn", 2)).await.unwrap();

    let first = plan.mint_args.records[0].nft_burn.as_ref().unwrap();
    assert_eq!(first.required_collection, snapshot.burn_collection);
    assert!(first.rule_set.is_some());

    // Only one token of the burn collection is owned
    assert!(plan.mint_args.records[1].nft_burn.is_none());
    assert_eq!(plan.mint_args.diagnostics.len(), 1);
    assert_eq!(plan.mint_args.diagnostics[0].guard, GuardKind::NftBurn);

    // The unit still gets a mint instruction; the program rejects it on chain
    assert_eq!(program.recorded_mints().len(), 2);
    assert!(plan.preflight.is_empty());
}

#[tokio::test]
async fn test_unknown_label_falls_back_to_default_guards() {
    let snapshot = snapshot();
    let program = Arc::new(FakeCandyGuardProgram::new());
    let session = session(&snapshot, program.clone());

    let plan = session.prepare(request(&snapshot, "OG", 1)).await.unwrap();

    assert_eq!(plan.group.label, "default");
    assert_eq!(
        plan.mint_args.records[0].present_kinds(),
        vec![GuardKind::SolPayment]
    );
    assert!(program.recorded_mints()[0].group.is_none());
}

#[test]
fn test_mint_args_serialize_for_the_wallet() {
    let snapshot = snapshot();
    let logger = candy_mint::structured_logging::MintLogger::for_new_session();
    let group = candy_mint::select_guard("WL", Some(&snapshot.candy_guard), &logger);
    let batch = candy_mint::build_mint_args(
        &group,
        &snapshot.allowlists,
        snapshot.inventory.clone(),
        1,
        &logger,
    );

    let json = serde_json::to_value(&batch.records[0]).unwrap();
    let object = json.as_object().unwrap();
    assert!(object.contains_key("allowList"));
    assert!(object.contains_key("mintLimit"));
    assert!(object.contains_key("solPayment"));
    assert_eq!(object.len(), 3);
    assert_eq!(
        json["allowList"]["merkleRoot"],
        serde_json::json!(hex::encode(snapshot.allowlists.merkle_root("WL").unwrap()))
    );
}
