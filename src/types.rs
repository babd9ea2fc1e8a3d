//! Common types used throughout the crate

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Label of the synthetic group built from a candy guard's top-level guards
pub const DEFAULT_GROUP_LABEL: &str = "default";

/// The candy machine a session mints from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandyMachineState {
    /// Candy machine account
    #[serde(with = "pubkey_str")]
    pub address: Pubkey,

    /// Mint authority of the candy machine, i.e. the candy guard account
    #[serde(with = "pubkey_str")]
    pub mint_authority: Pubkey,

    /// Core collection the minted assets join
    #[serde(with = "pubkey_str")]
    pub collection_mint: Pubkey,
}

/// Serde adapter writing a `Pubkey` as its base58 string
pub mod pubkey_str {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(key)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let s = String::deserialize(deserializer)?;
        Pubkey::from_str(&s).map_err(D::Error::custom)
    }

    /// `Option<Pubkey>` variant; pair with `#[serde(default)]`
    pub mod opt {
        use serde::{de::Error, Deserialize, Deserializer, Serializer};
        use solana_sdk::pubkey::Pubkey;
        use std::str::FromStr;

        pub fn serialize<S: Serializer>(
            key: &Option<Pubkey>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match key {
                Some(key) => serializer.collect_str(key),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Pubkey>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|s| Pubkey::from_str(&s).map_err(D::Error::custom))
                .transpose()
        }
    }

    /// `Vec<Pubkey>` variant
    pub mod vec {
        use serde::{de::Error, ser::SerializeSeq, Deserialize, Deserializer, Serializer};
        use solana_sdk::pubkey::Pubkey;
        use std::str::FromStr;

        pub fn serialize<S: Serializer>(keys: &[Pubkey], serializer: S) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(keys.len()))?;
            for key in keys {
                seq.serialize_element(&key.to_string())?;
            }
            seq.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<Pubkey>, D::Error> {
            Vec::<String>::deserialize(deserializer)?
                .iter()
                .map(|s| Pubkey::from_str(s).map_err(D::Error::custom))
                .collect()
        }
    }
}

/// Serde adapter writing a 32-byte hash (merkle root) as lowercase hex
pub mod hex32 {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s.trim_start_matches("0x")).map_err(D::Error::custom)?;
        <[u8; 32]>::try_from(bytes.as_slice())
            .map_err(|_| D::Error::custom(format!("expected 32 bytes, got {}", bytes.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "pubkey_str")]
        key: Pubkey,
        #[serde(default, with = "pubkey_str::opt")]
        maybe: Option<Pubkey>,
        #[serde(with = "hex32")]
        root: [u8; 32],
    }

    #[test]
    fn test_pubkey_and_hex_json_shape() {
        let sample = Sample {
            key: Pubkey::new_unique(),
            maybe: None,
            root: [0xab; 32],
        };
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["key"], sample.key.to_string());
        assert!(json["maybe"].is_null());
        assert_eq!(json["root"], "ab".repeat(32));
    }

    #[test]
    fn test_missing_optional_pubkey_defaults_to_none() {
        let key = Pubkey::new_unique();
        let json = format!(r#"{{"key":"{}","root":"0x{}"}}"#, key, "00".repeat(32));
        let sample: Sample = serde_json::from_str(&json).unwrap();
        assert_eq!(sample.key, key);
        assert_eq!(sample.maybe, None);
        assert_eq!(sample.root, [0u8; 32]);
    }

    #[test]
    fn test_bad_root_length_is_rejected() {
        let json = format!(r#"{{"key":"{}","root":"abcd"}}"#, Pubkey::new_unique());
        assert!(serde_json::from_str::<Sample>(&json).is_err());
    }
}
