pub mod clock;
pub mod gateway;
pub mod recorder;

use crate::ingestion::clock::Clock;
use crate::ingestion::gateway::PersistenceGateway;
use crate::ingestion::recorder::{Outcome, OutcomeRecorder};
use rand::Rng;
use std::time::Duration;
use tradesim_domain::repositories::chaos::ChaosSignal;
use tradesim_domain::repositories::trades::TradeRepository;
use tradesim_domain::services::chaos::ChaosController;
use tradesim_domain::services::generator::TradeGenerator;

pub const CHAOS_WARNING: &str = "CHAOS MODE IS ACTIVE. System instability is expected.";

/// Inter-trade pacing and how often an active chaos signal is announced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cadence {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub chaos_warn_every: u64,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1500),
            chaos_warn_every: 20,
        }
    }
}

impl Cadence {
    pub fn new(
        min_delay: Duration,
        max_delay: Duration,
        chaos_warn_every: u64,
    ) -> Result<Self, String> {
        if min_delay > max_delay {
            return Err(format!(
                "min delay {}ms exceeds max delay {}ms",
                min_delay.as_millis(),
                max_delay.as_millis()
            ));
        }
        if chaos_warn_every == 0 {
            return Err("chaos warning interval must be at least 1 iteration".to_string());
        }
        Ok(Self {
            min_delay,
            max_delay,
            chaos_warn_every,
        })
    }

    pub fn jitter<G: Rng + ?Sized>(&self, rng: &mut G) -> Duration {
        let secs = rng.gen_range(self.min_delay.as_secs_f64()..=self.max_delay.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    /// Whether iteration `iteration` (0-based) is one where an active
    /// chaos signal gets announced: the first, then every
    /// `chaos_warn_every`th after it.
    pub fn announces_chaos_at(&self, iteration: u64) -> bool {
        iteration % self.chaos_warn_every.max(1) == 0
    }
}

/// Single-worker ingestion pipeline: generate, decide, persist, record,
/// sleep. One trade in flight at a time.
pub struct IngestionLoop<R, S, C, G> {
    generator: TradeGenerator,
    chaos: ChaosController<S>,
    gateway: PersistenceGateway<R>,
    recorder: OutcomeRecorder,
    clock: C,
    rng: G,
    cadence: Cadence,
    iteration: u64,
}

impl<R, S, C, G> IngestionLoop<R, S, C, G>
where
    R: TradeRepository,
    S: ChaosSignal,
    C: Clock,
    G: Rng,
{
    pub fn new(
        generator: TradeGenerator,
        chaos: ChaosController<S>,
        gateway: PersistenceGateway<R>,
        recorder: OutcomeRecorder,
        clock: C,
        rng: G,
        cadence: Cadence,
    ) -> Self {
        Self {
            generator,
            chaos,
            gateway,
            recorder,
            clock,
            rng,
            cadence,
            iteration: 0,
        }
    }

    /// Runs one iteration and returns what the attempt produced.
    pub fn step(&mut self) -> Outcome {
        let span = tracing::info_span!("ingest.iteration", iteration = self.iteration);
        let _enter = span.enter();

        let trade = self.generator.generate(&mut self.rng);
        tracing::info!(
            ticker = %trade.ticker,
            side = %trade.side,
            quantity = trade.quantity,
            price = trade.price,
            "received trade"
        );

        let failure_rate = self.chaos.current_failure_rate();
        let timer = self.recorder.start_timer(&self.clock);
        let result = self
            .gateway
            .attempt_persist(&trade, failure_rate, &mut self.rng);
        let elapsed = timer.finish();

        let outcome = Outcome::from_attempt(&trade, &result, elapsed);
        self.recorder.record(&outcome);

        let delay = self.cadence.jitter(&mut self.rng);
        self.clock.sleep(delay);

        if self.cadence.announces_chaos_at(self.iteration) && self.chaos.is_active() {
            tracing::warn!(iteration = self.iteration, "{}", CHAOS_WARNING);
        }
        self.iteration += 1;

        outcome
    }

    /// Steps forever. Mid-loop connection loss is not retried: failed
    /// attempts roll back and count as failed until the process restarts.
    pub fn run(&mut self) -> ! {
        loop {
            self.step();
        }
    }

    pub fn iterations(&self) -> u64 {
        self.iteration
    }

    pub fn gateway_mut(&mut self) -> &mut PersistenceGateway<R> {
        &mut self.gateway
    }
}

#[cfg(test)]
mod tests {
    use super::Cadence;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    #[test]
    fn chaos_is_announced_on_first_and_every_twentieth_iteration() {
        let cadence = Cadence::default();
        let announced: Vec<u64> = (0..61).filter(|i| cadence.announces_chaos_at(*i)).collect();
        assert_eq!(announced, vec![0, 20, 40, 60]);
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let cadence = Cadence::default();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let delay = cadence.jitter(&mut rng);
            assert!(delay >= Duration::from_millis(100) && delay <= Duration::from_millis(1500));
        }
    }

    #[test]
    fn fixed_delay_is_allowed() {
        let cadence = Cadence::new(Duration::from_millis(5), Duration::from_millis(5), 1)
            .expect("equal bounds");
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(cadence.jitter(&mut rng), Duration::from_millis(5));
    }

    #[test]
    fn new_rejects_inverted_bounds_and_zero_interval() {
        assert!(Cadence::new(Duration::from_secs(2), Duration::from_secs(1), 20).is_err());
        assert!(Cadence::new(Duration::ZERO, Duration::from_secs(1), 0).is_err());
    }
}
