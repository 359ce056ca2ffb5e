use crate::value_objects::side::Side;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A generated trade that has not been written yet; the store assigns
/// `id` and `created_at` on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrade {
    pub ticker: String,
    pub side: Side,
    pub quantity: i32,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedTrade {
    pub id: i64,
    pub ticker: String,
    pub side: Side,
    pub quantity: i32,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

impl PersistedTrade {
    pub fn from_new(trade: &NewTrade, id: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            ticker: trade.ticker.clone(),
            side: trade.side,
            quantity: trade.quantity,
            price: trade.price,
            created_at,
        }
    }
}

/// Row shape returned by the recent-trades listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSummary {
    pub id: i64,
    pub ticker: String,
}
