mod common;

use common::{trade, MemoryTradeRepository};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tradesim_application::ingestion::gateway::PersistenceGateway;
use tradesim_application::inspection::{find_trade_by_id, list_recent_trades, TradeLookup};
use tradesim_domain::value_objects::side::Side;

#[test]
fn find_returns_the_fields_that_were_submitted() {
    let mut gateway = PersistenceGateway::new(MemoryTradeRepository::default());
    let submitted = trade("AAPL", Side::Sell, 321, 123.45);
    let persisted = gateway
        .attempt_persist(&submitted, 0.0, &mut StdRng::seed_from_u64(5))
        .expect("persist");

    let lookup = find_trade_by_id(gateway.repository_mut(), persisted.id).expect("lookup");
    let TradeLookup::Found(found) = lookup else {
        panic!("trade {} should exist", persisted.id);
    };
    assert_eq!(found.ticker, submitted.ticker);
    assert_eq!(found.side, submitted.side);
    assert_eq!(found.quantity, submitted.quantity);
    assert!((found.price - submitted.price).abs() < 0.005);
}

#[test]
fn find_reports_missing_ids() {
    let mut repo = MemoryTradeRepository::default();
    assert_eq!(
        find_trade_by_id(&mut repo, 999).expect("lookup"),
        TradeLookup::NotFound(999)
    );
}

#[test]
fn recent_trades_are_listed_newest_first() {
    let mut gateway = PersistenceGateway::new(MemoryTradeRepository::default());
    let mut rng = StdRng::seed_from_u64(5);
    let ids: Vec<i64> = ["A", "B", "C"]
        .iter()
        .map(|ticker| {
            gateway
                .attempt_persist(&trade(ticker, Side::Buy, 10, 50.0), 0.0, &mut rng)
                .expect("persist")
                .id
        })
        .collect();

    let recent = list_recent_trades(gateway.repository_mut(), 3).expect("list");
    let listed: Vec<(i64, &str)> = recent.iter().map(|r| (r.id, r.ticker.as_str())).collect();
    assert_eq!(listed, vec![(ids[2], "C"), (ids[1], "B"), (ids[0], "A")]);

    let two = list_recent_trades(gateway.repository_mut(), 2).expect("list");
    assert_eq!(two.len(), 2);
    assert_eq!(two[0].id, ids[2]);
}

#[test]
fn recent_trades_reject_non_positive_limits() {
    let mut repo = MemoryTradeRepository::default();
    assert!(list_recent_trades(&mut repo, 0).is_err());
    assert!(list_recent_trades(&mut repo, -3).is_err());
}
