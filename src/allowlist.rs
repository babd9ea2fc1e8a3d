//! Allowlists and their keccak-256 merkle trees
//!
//! An allowlist is an ordered list of base58 addresses registered under a
//! guard group label. The allowList guard stores only the merkle root; a
//! minting wallet proves membership with the sibling hashes from its leaf up
//! to the root.
//!
//! Tree shape: leaves are `keccak256(address_string)`, every parent is the
//! hash of its two children in ascending byte order, and an unpaired last
//! node is carried up to the next level unchanged.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::path::Path;

pub type Hash32 = [u8; 32];

fn keccak(parts: &[&[u8]]) -> Hash32 {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

fn hash_pair(a: &Hash32, b: &Hash32) -> Hash32 {
    if a <= b {
        keccak(&[a, b])
    } else {
        keccak(&[b, a])
    }
}

/// Leaf hash of one allowlist entry
pub fn leaf_hash(entry: &str) -> Hash32 {
    keccak(&[entry.as_bytes()])
}

/// Merkle tree over a non-empty allowlist
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// `layers[0]` are the leaves, the last layer holds only the root
    layers: Vec<Vec<Hash32>>,
}

impl MerkleTree {
    /// Build the tree; `None` for an empty list
    pub fn new<S: AsRef<str>>(entries: &[S]) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }

        let mut layers = vec![entries
            .iter()
            .map(|entry| leaf_hash(entry.as_ref()))
            .collect::<Vec<_>>()];

        while let Some(level) = layers.last().filter(|level| level.len() > 1) {
            let next = level
                .chunks(2)
                .map(|pair| match pair.get(1) {
                    Some(right) => hash_pair(&pair[0], right),
                    None => pair[0],
                })
                .collect();
            layers.push(next);
        }

        Some(Self { layers })
    }

    pub fn root(&self) -> Hash32 {
        // Construction guarantees a final single-node layer
        self.layers.last().map(|top| top[0]).unwrap_or_default()
    }

    /// Sibling hashes from the leaf at `index` up to the root
    pub fn proof(&self, index: usize) -> Option<Vec<Hash32>> {
        if index >= self.layers[0].len() {
            return None;
        }

        let mut proof = Vec::new();
        let mut position = index;
        for level in &self.layers[..self.layers.len() - 1] {
            let sibling = position ^ 1;
            if sibling < level.len() {
                proof.push(level[sibling]);
            }
            position /= 2;
        }
        Some(proof)
    }

    /// Check that `leaf` hashes up to `root` through `proof`
    pub fn verify(proof: &[Hash32], root: &Hash32, leaf: &Hash32) -> bool {
        let mut computed = *leaf;
        for element in proof {
            computed = hash_pair(&computed, element);
        }
        computed == *root
    }
}

/// Allowlists by guard group label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowlistStore {
    lists: HashMap<String, Vec<String>>,
}

impl AllowlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `{ "<label>": ["<base58>", ...] }` from a JSON file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read allowlist file {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Failed to parse allowlist file {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn insert(&mut self, label: impl Into<String>, entries: Vec<String>) {
        self.lists.insert(label.into(), entries);
    }

    pub fn get(&self, label: &str) -> Option<&[String]> {
        self.lists.get(label).map(Vec::as_slice)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }

    /// Merkle tree for `label`; `None` when the list is missing or empty
    pub fn tree(&self, label: &str) -> Option<MerkleTree> {
        self.get(label).and_then(MerkleTree::new)
    }

    pub fn merkle_root(&self, label: &str) -> Option<Hash32> {
        self.tree(label).map(|tree| tree.root())
    }

    /// Proof for `user` under `label`.
    ///
    /// `None` when the list is missing. A user who is not on the list gets an
    /// empty proof, which the program rejects on chain.
    pub fn merkle_proof(&self, label: &str, user: &Pubkey) -> Option<Vec<Hash32>> {
        let entries = self.get(label)?;
        let tree = MerkleTree::new(entries)?;
        let user = user.to_string();
        let proof = entries
            .iter()
            .position(|entry| *entry == user)
            .and_then(|index| tree.proof(index))
            .unwrap_or_default();
        Some(proof)
    }

    pub fn contains(&self, label: &str, user: &Pubkey) -> bool {
        let user = user.to_string();
        self.get(label)
            .is_some_and(|entries| entries.iter().any(|entry| *entry == user))
    }
}
