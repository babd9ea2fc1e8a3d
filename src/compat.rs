//! Compatibility layer for Solana SDK message types
//!
//! Mint transactions are compiled as V0 messages so that address lookup
//! tables can be attached, while callers may still hand in legacy messages
//! (for example from a wallet adapter round trip). These helpers give one
//! API over both formats for the pieces this crate needs: signer extraction
//! and wire-size accounting.

use solana_sdk::{
    message::{MessageHeader, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};

/// Get the message header from a `VersionedMessage`.
#[inline]
#[must_use]
pub fn get_message_header(message: &VersionedMessage) -> &MessageHeader {
    match message {
        VersionedMessage::Legacy(legacy_msg) => &legacy_msg.header,
        VersionedMessage::V0(v0_msg) => &v0_msg.header,
    }
}

/// Get the static account keys from a `VersionedMessage`.
///
/// For V0 messages this excludes addresses loaded from lookup tables.
#[inline]
#[must_use]
pub fn get_static_account_keys(message: &VersionedMessage) -> &[Pubkey] {
    match message {
        VersionedMessage::Legacy(legacy_msg) => &legacy_msg.account_keys,
        VersionedMessage::V0(v0_msg) => &v0_msg.account_keys,
    }
}

/// Get the required signers from a `VersionedMessage`.
///
/// Required signers are always the first `num_required_signatures` static keys.
/// Signers can never be loaded through a lookup table.
#[inline]
#[must_use]
pub fn get_required_signers(message: &VersionedMessage) -> &[Pubkey] {
    let header = get_message_header(message);
    let account_keys = get_static_account_keys(message);
    let num_signers = header.num_required_signatures as usize;

    &account_keys[..num_signers.min(account_keys.len())]
}

/// Wrap a message into a transaction carrying one default signature per
/// required signer.
///
/// The result has exactly the wire size of the fully signed transaction,
/// which is what size accounting and `sig_verify = false` simulation need.
#[must_use]
pub fn unsigned_transaction(message: VersionedMessage) -> VersionedTransaction {
    let num_signers = get_message_header(&message).num_required_signatures as usize;
    VersionedTransaction {
        signatures: vec![Signature::default(); num_signers],
        message,
    }
}

/// Serialized (wire) size of a transaction in bytes.
pub fn transaction_size(tx: &VersionedTransaction) -> Result<usize, bincode::Error> {
    bincode::serialized_size(tx).map(|size| size as usize)
}
