use crate::value_objects::side::Side;
use crate::value_objects::trade::NewTrade;
use rand::seq::SliceRandom;
use rand::Rng;

pub const DEFAULT_TICKERS: [&str; 4] = ["GTSX", "AAPL", "GOOG", "MSFT"];
pub const MIN_QUANTITY: i32 = 10;
pub const MAX_QUANTITY: i32 = 1000;
pub const MIN_PRICE: f64 = 50.0;
pub const MAX_PRICE: f64 = 500.0;

/// Produces synthetic trades from whatever random source it is handed.
#[derive(Debug, Clone)]
pub struct TradeGenerator {
    tickers: Vec<String>,
}

impl Default for TradeGenerator {
    fn default() -> Self {
        Self {
            tickers: DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl TradeGenerator {
    pub fn new(tickers: Vec<String>) -> Result<Self, String> {
        if tickers.is_empty() {
            return Err("trade generator needs at least one ticker".to_string());
        }
        if let Some(blank) = tickers.iter().find(|t| t.trim().is_empty()) {
            return Err(format!("invalid ticker: {blank:?}"));
        }
        Ok(Self { tickers })
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> NewTrade {
        // `new` guarantees a non-empty symbol set.
        let ticker = self
            .tickers
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| DEFAULT_TICKERS[0].to_string());
        let side = if rng.gen_bool(0.5) {
            Side::Buy
        } else {
            Side::Sell
        };
        let quantity = rng.gen_range(MIN_QUANTITY..=MAX_QUANTITY);
        let price = round_cents(rng.gen_range(MIN_PRICE..=MAX_PRICE));

        NewTrade {
            ticker,
            side,
            quantity,
            price,
        }
    }
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{round_cents, TradeGenerator};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn same_seed_yields_same_trades() {
        let generator = TradeGenerator::default();
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            assert_eq!(generator.generate(&mut a), generator.generate(&mut b));
        }
    }

    #[test]
    fn new_rejects_empty_and_blank_symbol_sets() {
        assert!(TradeGenerator::new(Vec::new()).is_err());
        assert!(TradeGenerator::new(vec!["AAPL".to_string(), " ".to_string()]).is_err());
        let generator = TradeGenerator::new(vec!["TSLA".to_string()]).unwrap();
        let trade = generator.generate(&mut StdRng::seed_from_u64(1));
        assert_eq!(trade.ticker, "TSLA");
    }

    #[test]
    fn round_cents_keeps_two_decimals() {
        assert!((round_cents(123.456) - 123.46).abs() < 1e-9);
        assert!((round_cents(50.0) - 50.0).abs() < 1e-9);
    }
}
