use crate::repositories::chaos::ChaosSignal;

pub const BASELINE_FAILURE_RATE: f64 = 0.05;
pub const ELEVATED_FAILURE_RATE: f64 = 0.60;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FailureRates {
    pub baseline: f64,
    pub elevated: f64,
}

impl Default for FailureRates {
    fn default() -> Self {
        Self {
            baseline: BASELINE_FAILURE_RATE,
            elevated: ELEVATED_FAILURE_RATE,
        }
    }
}

impl FailureRates {
    pub fn new(baseline: f64, elevated: f64) -> Result<Self, String> {
        for (name, rate) in [("baseline", baseline), ("elevated", elevated)] {
            if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
                return Err(format!("{name} failure rate must be within [0, 1], got {rate}"));
            }
        }
        Ok(Self { baseline, elevated })
    }
}

/// Picks the failure probability for the next trade. Reads the signal on
/// every call and keeps no state of its own.
#[derive(Debug, Clone)]
pub struct ChaosController<S> {
    signal: S,
    rates: FailureRates,
}

impl<S: ChaosSignal> ChaosController<S> {
    pub fn new(signal: S, rates: FailureRates) -> Self {
        Self { signal, rates }
    }

    pub fn is_active(&self) -> bool {
        self.signal.is_active()
    }

    pub fn current_failure_rate(&self) -> f64 {
        if self.signal.is_active() {
            self.rates.elevated
        } else {
            self.rates.baseline
        }
    }
}
