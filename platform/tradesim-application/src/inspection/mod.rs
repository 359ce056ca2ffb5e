use tradesim_domain::repositories::trades::TradeRepository;
use tradesim_domain::value_objects::trade::{PersistedTrade, TradeSummary};

pub const DEFAULT_RECENT_LIMIT: i64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum TradeLookup {
    Found(PersistedTrade),
    NotFound(i64),
}

pub fn find_trade_by_id<R: TradeRepository + ?Sized>(
    repository: &mut R,
    id: i64,
) -> Result<TradeLookup, String> {
    let span = tracing::debug_span!("ops.find_trade", id);
    let _enter = span.enter();

    match repository.find_trade(id) {
        Ok(Some(trade)) => Ok(TradeLookup::Found(trade)),
        Ok(None) => Ok(TradeLookup::NotFound(id)),
        Err(err) => Err(format!("failed to look up trade {id}: {err}")),
    }
}

/// Most recent rows, newest id first. This is a stand-in for failure
/// investigation: failed attempts never reach the table, so the rows only
/// mark the time window an operator should look at in the logs.
pub fn list_recent_trades<R: TradeRepository + ?Sized>(
    repository: &mut R,
    limit: i64,
) -> Result<Vec<TradeSummary>, String> {
    if limit <= 0 {
        return Err(format!("limit must be positive, got {limit}"));
    }
    repository
        .recent_trades(limit)
        .map_err(|err| format!("failed to list recent trades: {err}"))
}
