use chrono::{DateTime, Utc};
use postgres::{Client, NoTls, Row};
use tradesim_domain::repositories::trades::{StoreError, TradeRepository};
use tradesim_domain::value_objects::side::Side;
use tradesim_domain::value_objects::trade::{NewTrade, PersistedTrade, TradeSummary};

// Casts keep the queries working whether `id` is SERIAL or BIGSERIAL and
// `created_at` is TIMESTAMP or TIMESTAMPTZ.
const INSERT_TRADE: &str = "INSERT INTO trades (ticker, side, quantity, price) \
     VALUES ($1, $2, $3, $4::FLOAT8) \
     RETURNING id::BIGINT, created_at::TIMESTAMPTZ";
const SELECT_TRADE: &str = "SELECT id::BIGINT, ticker, side, quantity, price::FLOAT8, \
     created_at::TIMESTAMPTZ FROM trades WHERE id = $1::BIGINT";
const SELECT_RECENT: &str = "SELECT id::BIGINT, ticker FROM trades ORDER BY id DESC LIMIT $1";

/// Trade storage over one long-lived Postgres connection. Each write runs
/// in its own `Transaction`, which rolls back when dropped uncommitted.
pub struct PostgresTradeRepository {
    client: Client,
}

impl PostgresTradeRepository {
    pub fn connect(connection_string: &str) -> Result<Self, StoreError> {
        let config = connection_string
            .parse::<postgres::Config>()
            .map_err(|err| {
                StoreError::Connectivity(format!("invalid postgres connection settings: {err}"))
            })?;
        let client = config.connect(NoTls).map_err(|err| {
            StoreError::Connectivity(format!("failed to connect to postgres: {err}"))
        })?;
        Ok(Self { client })
    }

    pub fn apply_schema(&mut self, sql: &str) -> Result<(), StoreError> {
        self.client
            .batch_execute(sql)
            .map_err(|err| map_pg_error("apply schema", err))
    }
}

impl std::fmt::Debug for PostgresTradeRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresTradeRepository")
            .field("closed", &self.client.is_closed())
            .finish()
    }
}

impl TradeRepository for PostgresTradeRepository {
    fn persist_trade(&mut self, trade: &NewTrade) -> Result<PersistedTrade, StoreError> {
        let mut transaction = self
            .client
            .transaction()
            .map_err(|err| map_pg_error("begin", err))?;

        let row = transaction
            .query_one(
                INSERT_TRADE,
                &[
                    &trade.ticker,
                    &trade.side.as_str(),
                    &trade.quantity,
                    &trade.price,
                ],
            )
            .map_err(|err| map_pg_error("insert trade", err))?;

        let id: i64 = row
            .try_get(0)
            .map_err(|err| StoreError::Query(format!("insert returned no id: {err}")))?;
        let created_at: DateTime<Utc> = row
            .try_get(1)
            .map_err(|err| StoreError::Query(format!("insert returned no created_at: {err}")))?;

        transaction
            .commit()
            .map_err(|err| map_pg_error("commit", err))?;
        Ok(PersistedTrade::from_new(trade, id, created_at))
    }

    /// Transactions never outlive `persist_trade`, so nothing is left to
    /// undo; a dead connection is still reported.
    fn rollback(&mut self) -> Result<(), StoreError> {
        if self.client.is_closed() {
            return Err(StoreError::Connectivity(
                "rollback: connection closed".to_string(),
            ));
        }
        Ok(())
    }

    fn find_trade(&mut self, id: i64) -> Result<Option<PersistedTrade>, StoreError> {
        let row = self
            .client
            .query_opt(SELECT_TRADE, &[&id])
            .map_err(|err| map_pg_error("find trade", err))?;
        row.map(|row| parse_trade_row(&row)).transpose()
    }

    fn recent_trades(&mut self, limit: i64) -> Result<Vec<TradeSummary>, StoreError> {
        let rows = self
            .client
            .query(SELECT_RECENT, &[&limit])
            .map_err(|err| map_pg_error("list recent trades", err))?;
        rows.iter()
            .map(|row| -> Result<TradeSummary, StoreError> {
                Ok(TradeSummary {
                    id: row.try_get(0).map_err(decode_error)?,
                    ticker: row.try_get(1).map_err(decode_error)?,
                })
            })
            .collect()
    }
}

fn parse_trade_row(row: &Row) -> Result<PersistedTrade, StoreError> {
    let side: String = row.try_get(2).map_err(decode_error)?;
    Ok(PersistedTrade {
        id: row.try_get(0).map_err(decode_error)?,
        ticker: row.try_get(1).map_err(decode_error)?,
        side: Side::parse(&side).map_err(StoreError::Query)?,
        quantity: row.try_get(3).map_err(decode_error)?,
        price: row.try_get(4).map_err(decode_error)?,
        created_at: row.try_get(5).map_err(decode_error)?,
    })
}

fn decode_error(err: postgres::Error) -> StoreError {
    StoreError::Query(format!("failed to decode trade row: {err}"))
}

fn map_pg_error(stage: &str, err: postgres::Error) -> StoreError {
    if err.is_closed() {
        StoreError::Connectivity(format!("{stage}: connection closed: {err}"))
    } else {
        StoreError::Query(format!("{stage}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::PostgresTradeRepository;
    use tradesim_domain::repositories::trades::StoreError;

    #[test]
    fn connect_rejects_malformed_settings_before_dialing() {
        let err = PostgresTradeRepository::connect("host='unterminated")
            .err()
            .expect("malformed settings should fail fast");
        match err {
            StoreError::Connectivity(msg) => {
                assert!(msg.contains("invalid postgres connection settings"), "{msg}")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
