use crate::value_objects::trade::{NewTrade, PersistedTrade, TradeSummary};

#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    Connectivity(String),
    Query(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Connectivity(msg) => write!(f, "connectivity: {msg}"),
            StoreError::Query(msg) => write!(f, "query: {msg}"),
        }
    }
}

/// Transactional trade storage over a single connection.
///
/// `persist_trade` inserts and commits in one transaction. If either step
/// fails the transaction is discarded before returning, so no partial row
/// is ever visible. `rollback` is the caller's hook after any failed
/// attempt; with nothing open it only reports whether the connection is
/// still usable.
pub trait TradeRepository {
    fn persist_trade(&mut self, trade: &NewTrade) -> Result<PersistedTrade, StoreError>;
    fn rollback(&mut self) -> Result<(), StoreError>;
    fn find_trade(&mut self, id: i64) -> Result<Option<PersistedTrade>, StoreError>;
    /// Most recently assigned ids first.
    fn recent_trades(&mut self, limit: i64) -> Result<Vec<TradeSummary>, StoreError>;
}
