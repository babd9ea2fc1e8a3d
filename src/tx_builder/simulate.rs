//! Simulation-based compute-unit estimation
//!
//! A candidate transaction is simulated with signature verification off and
//! the blockhash replaced by the node, so unsigned transactions with a stale
//! or placeholder blockhash simulate fine. The requested limit is the
//! consumed units plus a fixed margin; any unusable simulation falls back to
//! a static limit instead of failing the mint.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_rpc_client_api::config::RpcSimulateTransactionConfig;
use solana_sdk::{commitment_config::CommitmentConfig, transaction::VersionedTransaction};
use std::sync::Arc;

use crate::structured_logging::MintLogger;
use crate::tx_builder::errors::TransactionBuilderError;
use crate::tx_builder::instructions::MAX_COMPUTE_UNIT_LIMIT;

/// Limit used when simulation gives no usable consumption figure
pub const DEFAULT_FALLBACK_UNITS: u32 = 800_000;

/// Headroom added on top of simulated consumption
pub const SIMULATION_MARGIN_UNITS: u32 = 20_000;

/// What a simulation reported
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationOutcome {
    /// Transaction error, rendered for logging
    pub err: Option<String>,
    pub units_consumed: Option<u64>,
    pub logs: Vec<String>,
}

impl SimulationOutcome {
    pub fn consumed(units: u64) -> Self {
        Self {
            units_consumed: Some(units),
            ..Default::default()
        }
    }

    pub fn failed(err: impl Into<String>) -> Self {
        Self {
            err: Some(err.into()),
            ..Default::default()
        }
    }
}

/// Anything that can simulate a transaction
#[async_trait]
pub trait TransactionSimulator: Send + Sync {
    async fn simulate(
        &self,
        tx: &VersionedTransaction,
    ) -> Result<SimulationOutcome, TransactionBuilderError>;
}

#[async_trait]
impl TransactionSimulator for RpcClient {
    async fn simulate(
        &self,
        tx: &VersionedTransaction,
    ) -> Result<SimulationOutcome, TransactionBuilderError> {
        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: true,
            commitment: Some(CommitmentConfig::finalized()),
            ..Default::default()
        };

        let response = self
            .simulate_transaction_with_config(tx, config)
            .await
            .map_err(|e| TransactionBuilderError::Simulation(e.to_string()))?;

        Ok(SimulationOutcome {
            err: response.value.err.map(|err| format!("{:?}", err)),
            units_consumed: response.value.units_consumed,
            logs: response.value.logs.unwrap_or_default(),
        })
    }
}

/// Turns simulations into compute-unit limits
#[derive(Clone)]
pub struct ComputeUnitEstimator {
    simulator: Arc<dyn TransactionSimulator>,
    fallback_units: u32,
    margin_units: u32,
    logger: MintLogger,
}

impl ComputeUnitEstimator {
    pub fn new(simulator: Arc<dyn TransactionSimulator>, logger: MintLogger) -> Self {
        Self {
            simulator,
            fallback_units: DEFAULT_FALLBACK_UNITS,
            margin_units: SIMULATION_MARGIN_UNITS,
            logger,
        }
    }

    pub fn with_fallback_units(mut self, fallback_units: u32) -> Self {
        self.fallback_units = fallback_units;
        self
    }

    pub fn with_margin_units(mut self, margin_units: u32) -> Self {
        self.margin_units = margin_units;
        self
    }

    pub fn fallback_units(&self) -> u32 {
        self.fallback_units
    }

    /// Compute-unit limit to request for `tx`. Never fails.
    pub async fn estimate(&self, tx: &VersionedTransaction) -> u32 {
        let outcome = self.simulator.simulate(tx).await;
        self.units_from_outcome(outcome)
    }

    /// Map a simulation result to a limit
    pub fn units_from_outcome(
        &self,
        outcome: Result<SimulationOutcome, TransactionBuilderError>,
    ) -> u32 {
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                self.logger
                    .log_simulation_fallback(&e.to_string(), self.fallback_units);
                return self.fallback_units;
            }
        };

        if let Some(err) = outcome.err {
            self.logger.log_simulation_fallback(&err, self.fallback_units);
            return self.fallback_units;
        }

        match outcome.units_consumed {
            Some(consumed) if consumed > 0 => {
                let limit = consumed
                    .saturating_add(u64::from(self.margin_units))
                    .min(u64::from(MAX_COMPUTE_UNIT_LIMIT)) as u32;
                self.logger.log_compute_estimate(consumed, limit);
                limit
            }
            _ => {
                self.logger
                    .log_simulation_fallback("no units consumed reported", self.fallback_units);
                self.fallback_units
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{
        hash::Hash,
        message::{v0::Message as MessageV0, VersionedMessage},
        pubkey::Pubkey,
    };
    use tokio::sync::Mutex;

    struct Scripted {
        outcome: Mutex<Option<Result<SimulationOutcome, TransactionBuilderError>>>,
    }

    #[async_trait]
    impl TransactionSimulator for Scripted {
        async fn simulate(
            &self,
            _tx: &VersionedTransaction,
        ) -> Result<SimulationOutcome, TransactionBuilderError> {
            self.outcome
                .lock()
                .await
                .take()
                .unwrap_or_else(|| Err(TransactionBuilderError::internal("script exhausted")))
        }
    }

    fn estimator(outcome: Result<SimulationOutcome, TransactionBuilderError>) -> ComputeUnitEstimator {
        ComputeUnitEstimator::new(
            Arc::new(Scripted {
                outcome: Mutex::new(Some(outcome)),
            }),
            MintLogger::default(),
        )
    }

    fn empty_tx() -> VersionedTransaction {
        let payer = Pubkey::new_unique();
        let message = MessageV0::try_compile(&payer, &[], &[], Hash::default()).unwrap();
        crate::compat::unsigned_transaction(VersionedMessage::V0(message))
    }

    #[tokio::test]
    async fn test_consumed_plus_margin() {
        let estimator = estimator(Ok(SimulationOutcome::consumed(450_000)));
        assert_eq!(estimator.estimate(&empty_tx()).await, 470_000);
    }

    #[tokio::test]
    async fn test_simulation_error_falls_back() {
        let estimator = estimator(Ok(SimulationOutcome::failed("InstructionError(2, Custom(6000))")));
        assert_eq!(estimator.estimate(&empty_tx()).await, 800_000);
    }

    #[tokio::test]
    async fn test_rpc_failure_falls_back() {
        let estimator = estimator(Err(TransactionBuilderError::Rpc("connection refused".into())));
        assert_eq!(estimator.estimate(&empty_tx()).await, DEFAULT_FALLBACK_UNITS);
    }

    #[test]
    fn test_zero_or_missing_consumption_falls_back() {
        let estimator = estimator(Ok(SimulationOutcome::default()));
        assert_eq!(
            estimator.units_from_outcome(Ok(SimulationOutcome::consumed(0))),
            800_000
        );
        assert_eq!(
            estimator.units_from_outcome(Ok(SimulationOutcome::default())),
            800_000
        );
    }

    #[test]
    fn test_estimate_is_capped() {
        let estimator = estimator(Ok(SimulationOutcome::default()));
        assert_eq!(
            estimator.units_from_outcome(Ok(SimulationOutcome::consumed(1_395_000))),
            MAX_COMPUTE_UNIT_LIMIT
        );
    }

    #[test]
    fn test_custom_fallback_and_margin() {
        let estimator = estimator(Ok(SimulationOutcome::default()))
            .with_fallback_units(600_000)
            .with_margin_units(5_000);
        assert_eq!(
            estimator.units_from_outcome(Ok(SimulationOutcome::consumed(100_000))),
            105_000
        );
        assert_eq!(
            estimator.units_from_outcome(Ok(SimulationOutcome::failed("boom"))),
            600_000
        );
        assert_eq!(estimator.fallback_units(), 600_000);
    }
}
