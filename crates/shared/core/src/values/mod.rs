use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Price value - `Decimal` so entry/exit math is exact
pub type Price = Decimal;

/// Share quantity - `Decimal`, always positive for held positions
pub type Quantity = Decimal;

/// Timestamp in UTC; all round and expiry arithmetic happens in UTC
pub type Timestamp = DateTime<Utc>;

/// Ticker symbol of the underlying instrument
pub type Symbol = String;
