use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tradesim_domain::services::generator::{
    TradeGenerator, DEFAULT_TICKERS, MAX_PRICE, MAX_QUANTITY, MIN_PRICE, MIN_QUANTITY,
};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn generated_trades_stay_within_bounds(seed in any::<u64>(), draws in 1usize..200) {
        let generator = TradeGenerator::default();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..draws {
            let trade = generator.generate(&mut rng);
            prop_assert!((MIN_QUANTITY..=MAX_QUANTITY).contains(&trade.quantity));
            prop_assert!(trade.price >= MIN_PRICE && trade.price <= MAX_PRICE);
            let cents = trade.price * 100.0;
            prop_assert!((cents - cents.round()).abs() < 1e-6);
            prop_assert!(DEFAULT_TICKERS.contains(&trade.ticker.as_str()));
        }
    }
}
