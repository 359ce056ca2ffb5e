#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tradesim_application::ingestion::clock::Clock;
use tradesim_domain::repositories::chaos::ChaosSignal;
use tradesim_domain::repositories::trades::{StoreError, TradeRepository};
use tradesim_domain::value_objects::side::Side;
use tradesim_domain::value_objects::trade::{NewTrade, PersistedTrade, TradeSummary};

/// In-memory stand-in for the trades table. A failed commit drops the
/// inserted row with its transaction, the way a dropped scope does.
#[derive(Debug, Default)]
pub struct MemoryTradeRepository {
    pub committed: Vec<PersistedTrade>,
    pub discarded: Vec<PersistedTrade>,
    pub fail_insert: bool,
    pub fail_commit: bool,
    pub inserts: usize,
    pub rollbacks: usize,
    next_id: i64,
}

impl TradeRepository for MemoryTradeRepository {
    fn persist_trade(&mut self, trade: &NewTrade) -> Result<PersistedTrade, StoreError> {
        self.inserts += 1;
        if self.fail_insert {
            return Err(StoreError::Query("insert rejected".to_string()));
        }
        self.next_id += 1;
        let created_at = Utc
            .timestamp_opt(1_700_000_000 + self.next_id, 0)
            .single()
            .expect("valid timestamp");
        let persisted = PersistedTrade::from_new(trade, self.next_id, created_at);
        if self.fail_commit {
            self.discarded.push(persisted);
            return Err(StoreError::Connectivity("commit lost".to_string()));
        }
        self.committed.push(persisted.clone());
        Ok(persisted)
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        self.rollbacks += 1;
        Ok(())
    }

    fn find_trade(&mut self, id: i64) -> Result<Option<PersistedTrade>, StoreError> {
        Ok(self.committed.iter().find(|t| t.id == id).cloned())
    }

    fn recent_trades(&mut self, limit: i64) -> Result<Vec<TradeSummary>, StoreError> {
        let mut rows: Vec<TradeSummary> = self
            .committed
            .iter()
            .map(|t| TradeSummary {
                id: t.id,
                ticker: t.ticker.clone(),
            })
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }
}

/// Virtual time: `sleep` advances `now` instantly and is remembered.
pub struct FakeClock {
    base: Instant,
    offset: Cell<Duration>,
    pub sleeps: RefCell<Vec<Duration>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Cell::new(Duration::ZERO),
            sleeps: RefCell::new(Vec::new()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        self.advance(duration);
    }
}

#[derive(Clone, Default)]
pub struct FlagSignal(pub Arc<AtomicBool>);

impl FlagSignal {
    pub fn set(&self, active: bool) {
        self.0.store(active, Ordering::SeqCst);
    }
}

impl ChaosSignal for FlagSignal {
    fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn trade(ticker: &str, side: Side, quantity: i32, price: f64) -> NewTrade {
    NewTrade {
        ticker: ticker.to_string(),
        side,
        quantity,
        price,
    }
}

/// Value of the first exposition line starting with `prefix`, or 0 when the
/// series has not been rendered.
pub fn metric_value(text: &str, prefix: &str) -> f64 {
    text.lines()
        .find(|line| line.starts_with(prefix))
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse::<f64>().ok())
        .unwrap_or(0.0)
}
