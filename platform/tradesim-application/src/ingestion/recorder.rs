use crate::ingestion::clock::Clock;
use crate::ingestion::gateway::PersistError;
use metrics::{Counter, Histogram, Key, Label, Level, Metadata, Recorder};
use std::time::{Duration, Instant};
use tradesim_domain::value_objects::trade::{NewTrade, PersistedTrade};

pub const TRADES_PROCESSED_TOTAL: &str = "trades_processed_total";
pub const TRADE_PROCESSING_DURATION_SECONDS: &str = "trade_processing_duration_seconds";
pub const STATUS_LABEL: &str = "status";

/// Bucket bounds (seconds) for the processing-latency histogram.
pub const LATENCY_BUCKETS: [f64; 14] = [
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    Failed,
}

impl OutcomeStatus {
    pub fn as_label(self) -> &'static str {
        match self {
            OutcomeStatus::Success => "success",
            OutcomeStatus::Failed => "failed",
        }
    }
}

/// What one persistence attempt produced. Only feeds metrics and logs.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: OutcomeStatus,
    pub trade: NewTrade,
    pub trade_id: Option<i64>,
    pub error: Option<String>,
    /// The failure was injected rather than raised by storage.
    pub synthetic: bool,
    pub elapsed: Duration,
}

impl Outcome {
    pub fn from_attempt(
        trade: &NewTrade,
        result: &Result<PersistedTrade, PersistError>,
        elapsed: Duration,
    ) -> Self {
        match result {
            Ok(persisted) => Self {
                status: OutcomeStatus::Success,
                trade: trade.clone(),
                trade_id: Some(persisted.id),
                error: None,
                synthetic: false,
                elapsed,
            },
            Err(err) => Self {
                status: OutcomeStatus::Failed,
                trade: trade.clone(),
                trade_id: None,
                error: Some(err.to_string()),
                synthetic: err.is_synthetic(),
                elapsed,
            },
        }
    }
}

/// Counter and histogram handles registered against an explicit recorder.
///
/// Nothing here can fail: metric handles are infallible and log events are
/// fire-and-forget, so recording never interrupts the ingestion loop.
#[derive(Clone)]
pub struct OutcomeRecorder {
    success: Counter,
    failed: Counter,
    latency: Histogram,
}

impl OutcomeRecorder {
    pub fn register(recorder: &dyn Recorder) -> Self {
        recorder.describe_counter(
            TRADES_PROCESSED_TOTAL.into(),
            None,
            "Total number of trades processed".into(),
        );
        recorder.describe_histogram(
            TRADE_PROCESSING_DURATION_SECONDS.into(),
            Some(metrics::Unit::Seconds),
            "Time taken to process a trade".into(),
        );

        let metadata = Metadata::new(module_path!(), Level::INFO, Some(module_path!()));
        let status_key = |status: OutcomeStatus| {
            Key::from_parts(
                TRADES_PROCESSED_TOTAL,
                vec![Label::new(STATUS_LABEL, status.as_label())],
            )
        };

        Self {
            success: recorder.register_counter(&status_key(OutcomeStatus::Success), &metadata),
            failed: recorder.register_counter(&status_key(OutcomeStatus::Failed), &metadata),
            latency: recorder.register_histogram(
                &Key::from_name(TRADE_PROCESSING_DURATION_SECONDS),
                &metadata,
            ),
        }
    }

    pub fn start_timer<'a, C: Clock + ?Sized>(&'a self, clock: &'a C) -> LatencyTimer<'a, C> {
        LatencyTimer {
            clock,
            histogram: &self.latency,
            start: clock.now(),
            finished: false,
        }
    }

    pub fn record(&self, outcome: &Outcome) {
        let elapsed_ms = outcome.elapsed.as_secs_f64() * 1000.0;
        match outcome.status {
            OutcomeStatus::Success => {
                self.success.increment(1);
                tracing::info!(
                    id = outcome.trade_id,
                    ticker = %outcome.trade.ticker,
                    side = %outcome.trade.side,
                    quantity = outcome.trade.quantity,
                    price = outcome.trade.price,
                    elapsed_ms,
                    "successfully processed and stored trade"
                );
            }
            OutcomeStatus::Failed => {
                self.failed.increment(1);
                tracing::error!(
                    ticker = %outcome.trade.ticker,
                    side = %outcome.trade.side,
                    quantity = outcome.trade.quantity,
                    price = outcome.trade.price,
                    error = outcome.error.as_deref().unwrap_or("unknown"),
                    synthetic = outcome.synthetic,
                    elapsed_ms,
                    "failed to process trade"
                );
            }
        }
    }
}

impl std::fmt::Debug for OutcomeRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeRecorder").finish_non_exhaustive()
    }
}

/// Scoped latency measurement. The elapsed time is observed into the
/// histogram exactly once: on `finish`, or on drop if `finish` was never
/// reached.
pub struct LatencyTimer<'a, C: Clock + ?Sized> {
    clock: &'a C,
    histogram: &'a Histogram,
    start: Instant,
    finished: bool,
}

impl<C: Clock + ?Sized> LatencyTimer<'_, C> {
    pub fn finish(mut self) -> Duration {
        self.observe()
    }

    fn observe(&mut self) -> Duration {
        let elapsed = self.clock.now().saturating_duration_since(self.start);
        if !self.finished {
            self.histogram.record(elapsed.as_secs_f64());
            self.finished = true;
        }
        elapsed
    }
}

impl<C: Clock + ?Sized> Drop for LatencyTimer<'_, C> {
    fn drop(&mut self) {
        if !self.finished {
            self.observe();
        }
    }
}
