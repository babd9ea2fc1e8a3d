//! Structured logging for mint sessions

use solana_sdk::pubkey::Pubkey;
use uuid::Uuid;

use crate::guards::GuardKind;

/// Structured logger for one mint session
///
/// Every event carries the session's context id so that the diagnostics of
/// one "mint N copies" request can be correlated across components.
#[derive(Debug, Clone)]
pub struct MintLogger {
    context_id: String,
}

impl MintLogger {
    pub fn new(context_id: String) -> Self {
        Self { context_id }
    }

    /// Logger with a freshly generated context id
    pub fn for_new_session() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn log_guard_selected(&self, label: &str, fallback: bool) {
        tracing::info!(
            context_id = %self.context_id,
            label = %label,
            fallback = %fallback,
            "Guard group selected"
        );
    }

    pub fn log_missing_guard_config(&self, requested_label: &str) {
        tracing::error!(
            context_id = %self.context_id,
            requested_label = %requested_label,
            "No guards defined! No minting possible"
        );
    }

    pub fn log_guard_unsatisfied(&self, unit: usize, guard: GuardKind, reason: &str) {
        tracing::warn!(
            context_id = %self.context_id,
            unit = %unit,
            guard = %guard,
            reason = %reason,
            "Guard argument omitted"
        );
    }

    pub fn log_mint_args_built(&self, label: &str, quantity: usize, diagnostics: usize) {
        tracing::debug!(
            context_id = %self.context_id,
            label = %label,
            quantity = %quantity,
            diagnostics = %diagnostics,
            "Mint arguments built"
        );
    }

    pub fn log_allowlist_missing(&self, label: &str) {
        tracing::error!(
            context_id = %self.context_id,
            label = %label,
            "Allowlist for guard group not found"
        );
    }

    pub fn log_merkle_root_mismatch(&self, label: &str, on_chain: &[u8; 32], local: &[u8; 32]) {
        tracing::warn!(
            context_id = %self.context_id,
            label = %label,
            on_chain = %hex::encode(on_chain),
            local = %hex::encode(local),
            "Allowlist merkle root differs from the guard's; mints will be rejected"
        );
    }

    pub fn log_proof_lookup_failed(&self, label: &str, proof_account: &Pubkey, error: &str) {
        tracing::warn!(
            context_id = %self.context_id,
            label = %label,
            proof_account = %proof_account,
            error = %error,
            "Allow list proof lookup failed, route skipped"
        );
    }

    pub fn log_route_emitted(&self, label: &str, user: &Pubkey) {
        tracing::info!(
            context_id = %self.context_id,
            label = %label,
            user = %user,
            "Allow list proof route added"
        );
    }

    pub fn log_route_skipped(&self, label: &str, reason: &str) {
        tracing::debug!(
            context_id = %self.context_id,
            label = %label,
            reason = %reason,
            "Allow list proof route skipped"
        );
    }

    pub fn log_simulation_fallback(&self, reason: &str, fallback_units: u32) {
        tracing::warn!(
            context_id = %self.context_id,
            reason = %reason,
            fallback_units = %fallback_units,
            "Simulation unusable, using fallback compute units"
        );
    }

    pub fn log_compute_estimate(&self, consumed: u64, limit: u32) {
        tracing::debug!(
            context_id = %self.context_id,
            consumed = %consumed,
            limit = %limit,
            "Compute units estimated from simulation"
        );
    }

    pub fn log_transaction_sealed(&self, index: usize, instructions: usize, size: usize) {
        tracing::debug!(
            context_id = %self.context_id,
            index = %index,
            instructions = %instructions,
            size = %size,
            "Transaction sealed"
        );
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(
            context_id = %self.context_id,
            message = %message,
            "Warning"
        );
    }
}

impl Default for MintLogger {
    fn default() -> Self {
        Self::for_new_session()
    }
}
