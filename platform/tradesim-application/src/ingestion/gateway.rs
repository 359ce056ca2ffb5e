use crate::ingestion::clock::Clock;
use rand::Rng;
use std::time::Duration;
use tradesim_domain::repositories::trades::{StoreError, TradeRepository};
use tradesim_domain::value_objects::trade::{NewTrade, PersistedTrade};

pub const SYNTHETIC_FAILURE_MESSAGE: &str = "CHAOS: Forced connection failure to exchange";
pub const DEFAULT_CONNECT_RETRY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub enum PersistError {
    /// Injected by the gateway; storage was never touched.
    Synthetic(String),
    Storage(StoreError),
}

impl PersistError {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, PersistError::Synthetic(_))
    }
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistError::Synthetic(msg) => f.write_str(msg),
            PersistError::Storage(err) => write!(f, "storage: {err}"),
        }
    }
}

/// Owns the single long-lived connection the loop writes through.
#[derive(Debug)]
pub struct PersistenceGateway<R> {
    repository: R,
}

impl<R: TradeRepository> PersistenceGateway<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Blocks until `connector` succeeds, sleeping `retry_delay` between
    /// attempts. There is no attempt cap.
    pub fn connect<F, C>(mut connector: F, retry_delay: Duration, clock: &C) -> Self
    where
        F: FnMut() -> Result<R, StoreError>,
        C: Clock + ?Sized,
    {
        let mut attempt = 0u64;
        loop {
            attempt += 1;
            match connector() {
                Ok(repository) => {
                    tracing::info!(attempt, "database connection established");
                    return Self::new(repository);
                }
                Err(err) => {
                    tracing::warn!(
                        attempt,
                        error = %err,
                        retry_in_secs = retry_delay.as_secs_f64(),
                        "database connection failed, retrying"
                    );
                    clock.sleep(retry_delay);
                }
            }
        }
    }

    /// Inserts and commits `trade`, unless the random draw falls under
    /// `failure_rate`, in which case a synthetic error is returned without
    /// touching storage. Every error path rolls back before returning.
    pub fn attempt_persist<G: Rng + ?Sized>(
        &mut self,
        trade: &NewTrade,
        failure_rate: f64,
        rng: &mut G,
    ) -> Result<PersistedTrade, PersistError> {
        let result = self.draw_and_persist(trade, failure_rate, rng);
        if let Err(err) = &result {
            if let Err(rollback_err) = self.repository.rollback() {
                tracing::warn!(
                    error = %err,
                    rollback_error = %rollback_err,
                    "rollback after failed persist attempt also failed"
                );
            }
        }
        result
    }

    fn draw_and_persist<G: Rng + ?Sized>(
        &mut self,
        trade: &NewTrade,
        failure_rate: f64,
        rng: &mut G,
    ) -> Result<PersistedTrade, PersistError> {
        let sample: f64 = rng.gen();
        if sample < failure_rate {
            return Err(PersistError::Synthetic(
                SYNTHETIC_FAILURE_MESSAGE.to_string(),
            ));
        }

        self.repository
            .persist_trade(trade)
            .map_err(PersistError::Storage)
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repository
    }
}
