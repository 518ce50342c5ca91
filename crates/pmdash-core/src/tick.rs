//! PnL tick sample type.

use crate::market::MarketId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One push-channel message reporting a market's instantaneous PnL.
///
/// `received_at` is the client arrival timestamp, not a server timestamp:
/// the engine only relies on arrival order and arrival-time recency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PnlTick {
    pub market_id: MarketId,
    pub pnl: Decimal,
    /// Inventory reported alongside PnL; zero when the backend omits it.
    pub inventory: Decimal,
    pub received_at: DateTime<Utc>,
}

impl PnlTick {
    /// Build a tick observed now.
    pub fn observed(market_id: MarketId, pnl: Decimal, inventory: Decimal) -> Self {
        Self {
            market_id,
            pnl,
            inventory,
            received_at: Utc::now(),
        }
    }
}
